//! Pickup slot listing
//!
//! Bookable windows for doorstep pickup over the next few days. Slot
//! booking itself happens through `schedule_pickup` on the order.

use axum::{Json, Router, routing::get};
use chrono::{Duration, Utc};

use shared::response::PickupSlot;

use crate::core::ServerState;

/// Morning, afternoon and evening windows, as (start hour, end hour) UTC.
const WINDOWS: [(u32, u32); 3] = [(10, 12), (13, 15), (16, 18)];
const DAYS_AHEAD: i64 = 3;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/pickup/slots", get(slots))
}

async fn slots() -> Json<Vec<PickupSlot>> {
    let now = Utc::now();
    let mut slots = Vec::new();

    for day in 1..=DAYS_AHEAD {
        let date = (now + Duration::days(day)).date_naive();
        for (start_hour, end_hour) in WINDOWS {
            if let (Some(start), Some(end)) = (
                date.and_hms_opt(start_hour, 0, 0),
                date.and_hms_opt(end_hour, 0, 0),
            ) {
                slots.push(PickupSlot {
                    start: start.and_utc(),
                    end: end.and_utc(),
                });
            }
        }
    }

    Json(slots)
}
