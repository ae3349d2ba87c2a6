use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Label shown for a status value that is not part of the vocabulary.
pub const UNKNOWN_STATUS_LABEL: &str = "Unknown";

/// Position of an order in its fulfillment lifecycle.
///
/// Variants are declared in canonical order; [`OrderStatus::ALL`] preserves it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    PaymentVerified,
    Confirmed,
    Processing,
    Packing,
    ReadyToShip,
    PickedUp,
    InTransit,
    OutForDelivery,
    Delivered,
    Completed,
    ReturnRequested,
    Returning,
    Returned,
    RefundPending,
    Refunded,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 17] = [
        OrderStatus::Pending,
        OrderStatus::PaymentVerified,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Packing,
        OrderStatus::ReadyToShip,
        OrderStatus::PickedUp,
        OrderStatus::InTransit,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Completed,
        OrderStatus::ReturnRequested,
        OrderStatus::Returning,
        OrderStatus::Returned,
        OrderStatus::RefundPending,
        OrderStatus::Refunded,
        OrderStatus::Cancelled,
    ];

    /// Wire value, e.g. `ready_to_ship`.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Fixed operator-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Awaiting confirmation",
            OrderStatus::PaymentVerified => "Payment verified",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Packing => "Packing",
            OrderStatus::ReadyToShip => "Ready to ship",
            OrderStatus::PickedUp => "Picked up",
            OrderStatus::InTransit => "In transit",
            OrderStatus::OutForDelivery => "Out for delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Completed => "Completed",
            OrderStatus::ReturnRequested => "Return requested",
            OrderStatus::Returning => "Returning",
            OrderStatus::Returned => "Returned",
            OrderStatus::RefundPending => "Refund pending",
            OrderStatus::Refunded => "Refunded",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Parses a raw wire value. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Option<OrderStatus> {
        raw.trim().parse().ok()
    }
}

/// Label for any raw status string; unrecognized values get [`UNKNOWN_STATUS_LABEL`].
pub fn status_label(raw: &str) -> &'static str {
    OrderStatus::parse(raw)
        .map(|status| status.label())
        .unwrap_or(UNKNOWN_STATUS_LABEL)
}
