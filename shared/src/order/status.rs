//! Order status lifecycle and order kind discriminant

use serde::{Deserialize, Serialize};

/// 订单状态 - 生命周期状态机的节点
///
/// 主路径: `created → scheduled → picked_up → inspected → paid → delivered`，
/// 任何非终态都可以转入 `cancelled`。
///
/// `delivered` 和 `cancelled` 是终态：到达后不再接受任何生命周期事件，
/// 订单记录永久保留用于审计。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// 已创建，等待安排取件
    Created,
    /// 已预约上门取件
    Scheduled,
    /// 设备已取件
    PickedUp,
    /// 已完成质检（价格可能下调）
    Inspected,
    /// 款项已确认
    Paid,
    /// 已交付/打款完成（终态）
    Delivered,
    /// 已取消（终态）
    Cancelled,
}

impl OrderStatus {
    /// Terminal states accept no further lifecycle events.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Persisted string form (`snake_case`, matches the wire format).
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Scheduled => "scheduled",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::Inspected => "inspected",
            OrderStatus::Paid => "paid",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order kind: device trade-in (`sell`) or accessory purchase (`purchase`).
///
/// Fixed at creation; selects which payload the order carries and which
/// states allow `confirm_payment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Sell,
    Purchase,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Sell => f.write_str("sell"),
            OrderType::Purchase => f.write_str("purchase"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Created.is_terminal());
        assert!(!OrderStatus::Paid.is_terminal());
    }

    #[test]
    fn test_status_serializes_as_snake_case() {
        let json = serde_json::to_string(&OrderStatus::PickedUp).unwrap();
        assert_eq!(json, "\"picked_up\"");

        let back: OrderStatus = serde_json::from_str("\"picked_up\"").unwrap();
        assert_eq!(back, OrderStatus::PickedUp);
    }
}
