//! Wallet audit entries.
//!
//! The audit log is in-memory only: the persisted snapshot stays exactly two
//! arrays (users, bookings). Each user's log keeps the most recent entries,
//! newest first.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Most recent entries kept per user.
pub const WALLET_LOG_CAP: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Debit => "debit",
            Direction::Credit => "credit",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletEntry {
    pub id: Uuid,
    pub direction: Direction,
    pub amount: Decimal,
    pub description: String,
    pub balance_after: Decimal,
    pub created_at: DateTime<Utc>,
}

impl WalletEntry {
    pub fn debit(amount: Decimal, description: impl Into<String>, balance_after: Decimal) -> Self {
        Self::new(Direction::Debit, amount, description, balance_after)
    }

    pub fn credit(
        amount: Decimal,
        description: impl Into<String>,
        balance_after: Decimal,
    ) -> Self {
        Self::new(Direction::Credit, amount, description, balance_after)
    }

    fn new(
        direction: Direction,
        amount: Decimal,
        description: impl Into<String>,
        balance_after: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            direction,
            amount,
            description: description.into(),
            balance_after,
            created_at: Utc::now(),
        }
    }
}
