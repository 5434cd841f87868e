//! Request extractors

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

/// Opaque subject identifier taken from the `Authorization: Bearer` header.
///
/// Token issuance and validation belong to the auth collaborator; this
/// service only threads the bearer value through as `owner_ref`. Absent or
/// malformed headers yield `None` (anonymous sell-in flows are legal).
#[derive(Debug, Clone, Default)]
pub struct OwnerRef(pub Option<String>);

impl<S> FromRequestParts<S> for OwnerRef
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let owner = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());
        Ok(OwnerRef(owner))
    }
}
