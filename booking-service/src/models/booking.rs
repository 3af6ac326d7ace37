//! Booking records and the status state machine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Platform commission: 10% of the booking price, rounded to cents.
pub fn commission_for(price: Decimal) -> Decimal {
    (price * Decimal::new(10, 2)).round_dp(2)
}

/// Price applied when a booking request does not specify one.
pub fn default_price() -> Decimal {
    Decimal::from(50)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    #[default]
    Transport,
    Errands,
    Lodging,
    Trades,
    CustomsClearing,
}

impl ServiceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Transport => "transport",
            ServiceCategory::Errands => "errands",
            ServiceCategory::Lodging => "lodging",
            ServiceCategory::Trades => "trades",
            ServiceCategory::CustomsClearing => "customs_clearing",
        }
    }
}

impl std::fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Accepted,
    RoomAssigned,
    OnTrip,
    Shopping,
    GoodsInTransit,
    AtCustoms,
    CustomsCleared,
    Delivered,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::RoomAssigned => "room_assigned",
            BookingStatus::OnTrip => "on_trip",
            BookingStatus::Shopping => "shopping",
            BookingStatus::GoodsInTransit => "goods_in_transit",
            BookingStatus::AtCustoms => "at_customs",
            BookingStatus::CustomsCleared => "customs_cleared",
            BookingStatus::Delivered => "delivered",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Central transition table. The prototype accepted any caller-supplied
    /// status; here every non-admin transition must be listed.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (*self, next),
            (Pending, Accepted | Cancelled)
                | (Accepted, OnTrip | RoomAssigned | Shopping | Cancelled)
                | (OnTrip, GoodsInTransit | Delivered | Cancelled)
                | (Shopping, GoodsInTransit | Cancelled)
                | (GoodsInTransit, AtCustoms | Delivered)
                | (AtCustoms, CustomsCleared)
                | (CustomsCleared, Delivered)
                | (RoomAssigned, Completed | Cancelled)
                | (Delivered, Completed)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_phone: String,
    pub provider_id: Option<Uuid>,
    pub lodge_id: Option<Uuid>,
    pub category: ServiceCategory,
    pub description: String,
    pub location: Option<String>,
    /// Fixed at creation; no update path exists.
    pub price: Decimal,
    /// Precomputed at creation from the same price the customer was charged.
    pub commission: Decimal,
    /// Settlement flag. Once true the booking has paid out and stays paid.
    pub is_paid: bool,
    /// Classifies the booking as a hospitality transaction even outside the
    /// lodging category.
    pub trusted_transport_only: bool,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_hospitality(&self) -> bool {
        self.trusted_transport_only || self.category == ServiceCategory::Lodging
    }

    /// What the provider receives at settlement.
    pub fn provider_pay(&self) -> Decimal {
        self.price - self.commission
    }
}
