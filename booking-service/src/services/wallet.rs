//! Wallet operations.
//!
//! The balance check lives in `debit_wallet` and nowhere else; a failed
//! check returns before anything is touched, so the caller's mutation
//! aborts with no state change and nothing persisted.

use anyhow::anyhow;
use chrono::Utc;
use rust_decimal::Decimal;
use service_core::error::AppError;
use uuid::Uuid;

use crate::models::{User, WalletEntry};

use super::repository::{MarketplaceRepository, MarketplaceState};

/// Debit a wallet inside an open mutation.
pub(crate) fn debit_wallet(
    state: &mut MarketplaceState,
    user_id: Uuid,
    amount: Decimal,
    description: &str,
) -> Result<User, AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::BadRequest(anyhow!("amount must be positive")));
    }

    let user = state
        .user_mut(user_id)
        .ok_or_else(|| AppError::NotFound(anyhow!("user not found")))?;

    if user.balance - amount < Decimal::ZERO {
        return Err(AppError::InsufficientFunds(format!(
            "balance {} cannot cover {}",
            user.balance, amount
        )));
    }

    user.balance -= amount;
    user.updated_at = Utc::now();
    let entry = WalletEntry::debit(amount, description, user.balance);
    let updated = user.clone();
    state.push_wallet_entry(user_id, entry);

    Ok(updated)
}

/// Credit a wallet inside an open mutation.
pub(crate) fn credit_wallet(
    state: &mut MarketplaceState,
    user_id: Uuid,
    amount: Decimal,
    description: &str,
) -> Result<User, AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::BadRequest(anyhow!("amount must be positive")));
    }

    let user = state
        .user_mut(user_id)
        .ok_or_else(|| AppError::NotFound(anyhow!("user not found")))?;

    user.balance += amount;
    user.updated_at = Utc::now();
    let entry = WalletEntry::credit(amount, description, user.balance);
    let updated = user.clone();
    state.push_wallet_entry(user_id, entry);

    Ok(updated)
}

#[derive(Clone)]
pub struct WalletService {
    repository: MarketplaceRepository,
}

impl WalletService {
    pub fn new(repository: MarketplaceRepository) -> Self {
        Self { repository }
    }

    /// Confirm-and-debit: charge the actor's wallet for `amount`. Fails with
    /// Insufficient Balance when the wallet cannot cover it, mutating
    /// nothing.
    pub async fn authorize_payment(
        &self,
        user_id: Uuid,
        amount: Decimal,
        description: &str,
    ) -> Result<User, AppError> {
        let user = self
            .repository
            .mutate(|state| debit_wallet(state, user_id, amount, description))
            .await?;
        tracing::info!(%user_id, %amount, "payment authorized");
        Ok(user)
    }

    /// Escrow top-up.
    pub async fn deposit(
        &self,
        user_id: Uuid,
        amount: Decimal,
        description: &str,
    ) -> Result<User, AppError> {
        let user = self
            .repository
            .mutate(|state| credit_wallet(state, user_id, amount, description))
            .await?;
        tracing::info!(%user_id, %amount, "wallet deposit");
        Ok(user)
    }

    /// Audit entries for a wallet, newest first.
    pub async fn entries(&self, user_id: Uuid) -> Vec<WalletEntry> {
        self.repository
            .read(|state| state.wallet_log(user_id).to_vec())
            .await
    }
}
