//! User accounts: customers, providers, lodges, and the platform admin.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Provider,
    Lodge,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Provider => "provider",
            Role::Lodge => "lodge",
            Role::Admin => "admin",
        }
    }

    /// Onboarding heuristic carried over from the prototype: provider and
    /// lodge accounts register with recognizable phone suffixes. An explicit
    /// role at registration always wins over this.
    pub fn infer_from_phone(phone: &str) -> Self {
        if phone.ends_with("77") {
            Role::Provider
        } else if phone.ends_with("88") {
            Role::Lodge
        } else {
            Role::Customer
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Unique login key. Never changes after creation.
    pub phone: String,
    pub name: Option<String>,
    pub role: Role,
    /// Wallet funds. Non-negative is enforced only at spend time.
    pub balance: Decimal,
    /// Cumulative provider payout across settled bookings.
    pub earnings: Decimal,
    /// Cumulative lodging-category revenue, tracked separately for reporting.
    pub hospitality_cashflow: Decimal,
    /// 0-100, informs fee/visibility decisions elsewhere.
    pub trust_score: u8,
    /// Cancelled / total bookings for this customer.
    pub cancellation_rate: f64,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(phone: impl Into<String>, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            phone: phone.into(),
            name: None,
            role,
            balance: Decimal::ZERO,
            earnings: Decimal::ZERO,
            hospitality_cashflow: Decimal::ZERO,
            trust_score: 100,
            cancellation_rate: 0.0,
            is_verified: false,
            created_at: now,
            updated_at: now,
        }
    }
}
