use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Booking, BookingStatus, Direction, Role, ServiceCategory, User, WalletEntry};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 7, message = "Phone number must be at least 7 digits"))]
    pub phone: String,
    #[validate(length(min = 4, message = "Confirmation code is required"))]
    pub code: String,
    /// Explicit role for first-time registration; ignored for known phones.
    pub role: Option<Role>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub phone: String,
    pub name: Option<String>,
    pub role: Role,
    pub balance: Decimal,
    pub earnings: Decimal,
    pub hospitality_cashflow: Decimal,
    pub trust_score: u8,
    pub cancellation_rate: f64,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            phone: user.phone,
            name: user.name,
            role: user.role,
            balance: user.balance,
            earnings: user.earnings,
            hospitality_cashflow: user.hospitality_cashflow,
            trust_score: user.trust_score,
            cancellation_rate: user.cancellation_rate,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 80, message = "Name must be 1-80 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub amount: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub category: Option<ServiceCategory>,
    #[validate(length(min = 1, max = 500, message = "Description is required"))]
    pub description: String,
    pub location: Option<String>,
    /// Defaults to the platform's standard price when omitted.
    pub price: Option<Decimal>,
    pub lodge_id: Option<Uuid>,
    #[serde(default)]
    pub trusted_transport_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_phone: String,
    pub provider_id: Option<Uuid>,
    pub lodge_id: Option<Uuid>,
    pub category: ServiceCategory,
    pub description: String,
    pub location: Option<String>,
    pub price: Decimal,
    pub commission: Decimal,
    pub is_paid: bool,
    pub trusted_transport_only: bool,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            customer_id: booking.customer_id,
            customer_phone: booking.customer_phone,
            provider_id: booking.provider_id,
            lodge_id: booking.lodge_id,
            category: booking.category,
            description: booking.description,
            location: booking.location,
            price: booking.price,
            commission: booking.commission,
            is_paid: booking.is_paid,
            trusted_transport_only: booking.trusted_transport_only,
            status: booking.status,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WalletEntryResponse {
    pub id: Uuid,
    pub direction: Direction,
    pub amount: Decimal,
    pub description: String,
    pub balance_after: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<WalletEntry> for WalletEntryResponse {
    fn from(entry: WalletEntry) -> Self {
        Self {
            id: entry.id,
            direction: entry.direction,
            amount: entry.amount,
            description: entry.description,
            balance_after: entry.balance_after,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminReport {
    pub total_users: usize,
    pub total_bookings: usize,
    pub completed_bookings: usize,
    pub cancelled_bookings: usize,
    pub open_bookings: usize,
    /// Sum of price over settled bookings.
    pub gross_volume: Decimal,
    /// Sum of commission over settled bookings that had a provider.
    pub commission_collected: Decimal,
    /// Sum of hospitality cashflow across all accounts.
    pub hospitality_cashflow: Decimal,
}
