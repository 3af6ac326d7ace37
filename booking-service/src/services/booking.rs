//! Booking lifecycle and payment settlement.
//!
//! Creation charges the customer's wallet and inserts the booking in one
//! mutation, so a failed authorization never leaves a booking behind.
//! Status changes go through the central transition table; completion
//! triggers settlement exactly once, guarded by the booking's `is_paid`
//! flag. Settlement is also independently callable.

use anyhow::anyhow;
use chrono::Utc;
use rust_decimal::Decimal;
use service_core::error::AppError;
use uuid::Uuid;

use crate::models::{
    commission_for, default_price, Booking, BookingStatus, Role, ServiceCategory, User,
    WalletEntry,
};

use super::repository::{MarketplaceRepository, MarketplaceState};
use super::wallet::debit_wallet;

/// Fields accepted at booking creation. Everything financial is derived.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub category: Option<ServiceCategory>,
    pub description: String,
    pub location: Option<String>,
    pub price: Option<Decimal>,
    pub lodge_id: Option<Uuid>,
    pub trusted_transport_only: bool,
}

#[derive(Clone)]
pub struct BookingService {
    repository: MarketplaceRepository,
    operator_phone: String,
}

impl BookingService {
    pub fn new(repository: MarketplaceRepository, operator_phone: impl Into<String>) -> Self {
        Self {
            repository,
            operator_phone: operator_phone.into(),
        }
    }

    /// Create a paid booking for the acting customer.
    pub async fn create(&self, customer: &User, input: NewBooking) -> Result<Booking, AppError> {
        let price = input.price.unwrap_or_else(default_price);
        if price <= Decimal::ZERO {
            return Err(AppError::BadRequest(anyhow!("price must be positive")));
        }

        let customer_id = customer.id;
        let customer_phone = customer.phone.clone();

        let booking = self
            .repository
            .mutate(move |state| {
                debit_wallet(
                    state,
                    customer_id,
                    price,
                    &format!("Booking payment: {}", input.description),
                )?;

                let now = Utc::now();
                let booking = Booking {
                    id: Uuid::new_v4(),
                    customer_id,
                    customer_phone,
                    provider_id: None,
                    lodge_id: input.lodge_id,
                    category: input.category.unwrap_or_default(),
                    description: input.description,
                    location: input.location,
                    price,
                    commission: commission_for(price),
                    is_paid: false,
                    trusted_transport_only: input.trusted_transport_only,
                    status: BookingStatus::Pending,
                    created_at: now,
                    updated_at: now,
                };
                state.insert_booking(booking.clone());
                Ok(booking)
            })
            .await?;

        tracing::info!(
            booking_id = %booking.id,
            customer_id = %booking.customer_id,
            category = %booking.category,
            price = %booking.price,
            "booking created"
        );
        Ok(booking)
    }

    /// Transition a booking to `next`.
    ///
    /// Legality comes from the status table. Actors may only touch bookings
    /// they own or are assigned to; taking `Pending -> Accepted` on an
    /// unassigned booking claims it. Admins may act on any booking and may
    /// force transitions the table does not allow, as long as the current
    /// status is not terminal.
    pub async fn update_status(
        &self,
        actor: &User,
        booking_id: Uuid,
        next: BookingStatus,
    ) -> Result<Booking, AppError> {
        let actor = actor.clone();
        let operator_phone = self.operator_phone.clone();

        self.repository
            .mutate(move |state| {
                let current = state
                    .booking(booking_id)
                    .cloned()
                    .ok_or_else(|| AppError::NotFound(anyhow!("booking not found")))?;

                authorize_transition(&actor, &current, next)?;

                if !current.status.can_transition_to(next) {
                    if actor.role == Role::Admin && !current.status.is_terminal() {
                        tracing::warn!(
                            %booking_id,
                            from = %current.status,
                            to = %next,
                            "admin forced a status transition"
                        );
                    } else {
                        return Err(AppError::Conflict(anyhow!(
                            "illegal transition from {} to {}",
                            current.status,
                            next
                        )));
                    }
                }

                {
                    let booking = state
                        .booking_mut(booking_id)
                        .ok_or_else(|| AppError::NotFound(anyhow!("booking not found")))?;
                    booking.status = next;
                    booking.updated_at = Utc::now();

                    if next == BookingStatus::Accepted && booking.provider_id.is_none() {
                        match actor.role {
                            Role::Provider => booking.provider_id = Some(actor.id),
                            Role::Lodge => {
                                booking.provider_id = Some(actor.id);
                                booking.lodge_id = Some(actor.id);
                            }
                            _ => {}
                        }
                    }
                }

                if next == BookingStatus::Cancelled {
                    refresh_cancellation_rate(state, current.customer_id);
                }

                if next == BookingStatus::Completed {
                    settle_in_state(state, booking_id, &operator_phone)?;
                }

                state
                    .booking(booking_id)
                    .cloned()
                    .ok_or_else(|| AppError::NotFound(anyhow!("booking not found")))
            })
            .await
    }

    /// Settle a booking's payment directly. Idempotent: an already-paid
    /// booking is returned unchanged. Admin only.
    pub async fn settle(&self, actor: &User, booking_id: Uuid) -> Result<Booking, AppError> {
        if actor.role != Role::Admin {
            return Err(AppError::Forbidden(anyhow!("admin role required")));
        }

        let operator_phone = self.operator_phone.clone();
        self.repository
            .mutate(move |state| settle_in_state(state, booking_id, &operator_phone))
            .await
    }

    /// Bookings visible to the actor, most recent first.
    pub async fn list_for(&self, actor: &User) -> Vec<Booking> {
        let actor = actor.clone();
        self.repository
            .read(move |state| {
                state
                    .bookings_newest_first()
                    .filter(|booking| visible_to(&actor, booking))
                    .cloned()
                    .collect()
            })
            .await
    }

    pub async fn get(&self, actor: &User, booking_id: Uuid) -> Result<Booking, AppError> {
        let actor = actor.clone();
        self.repository
            .read(move |state| {
                state
                    .booking(booking_id)
                    .filter(|booking| visible_to(&actor, booking))
                    .cloned()
                    .ok_or_else(|| AppError::NotFound(anyhow!("booking not found")))
            })
            .await
    }
}

/// Apply the one-time financial effect of completion.
///
/// No-op when the booking already settled. With a provider assigned, the
/// provider receives `price - commission` and the platform operator receives
/// the commission; without one, the booking is marked paid with no money
/// movement at all (the operator collects nothing on unassigned
/// completions).
pub(crate) fn settle_in_state(
    state: &mut MarketplaceState,
    booking_id: Uuid,
    operator_phone: &str,
) -> Result<Booking, AppError> {
    let booking = state
        .booking(booking_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(anyhow!("booking not found")))?;

    if booking.is_paid {
        return Ok(booking);
    }

    let provider_pay = booking.provider_pay();

    if let Some(provider_id) = booking.provider_id {
        let balance_after;
        {
            let provider = state.user_mut(provider_id).ok_or_else(|| {
                AppError::Conflict(anyhow!("assigned provider no longer exists"))
            })?;
            provider.balance += provider_pay;
            provider.earnings += provider_pay;
            if booking.is_hospitality() {
                provider.hospitality_cashflow += booking.price;
            }
            provider.updated_at = Utc::now();
            balance_after = provider.balance;
        }
        state.push_wallet_entry(
            provider_id,
            WalletEntry::credit(
                provider_pay,
                format!("Payout for booking {}", booking.id),
                balance_after,
            ),
        );

        match state.user_by_phone(operator_phone).map(|u| u.id) {
            Some(operator_id) => {
                let balance_after;
                {
                    // Lookup just succeeded, the id is live.
                    let operator = state.user_mut(operator_id).ok_or_else(|| {
                        AppError::Conflict(anyhow!("operator account no longer exists"))
                    })?;
                    operator.balance += booking.commission;
                    operator.updated_at = Utc::now();
                    balance_after = operator.balance;
                }
                state.push_wallet_entry(
                    operator_id,
                    WalletEntry::credit(
                        booking.commission,
                        format!("Commission for booking {}", booking.id),
                        balance_after,
                    ),
                );
            }
            None => {
                tracing::warn!(
                    booking_id = %booking.id,
                    "operator account missing, commission not collected"
                );
            }
        }

        tracing::info!(
            booking_id = %booking.id,
            %provider_id,
            %provider_pay,
            commission = %booking.commission,
            "booking settled"
        );
    } else {
        tracing::info!(
            booking_id = %booking.id,
            "booking completed without a provider, no payout"
        );
    }

    let booking = state
        .booking_mut(booking_id)
        .ok_or_else(|| AppError::NotFound(anyhow!("booking not found")))?;
    booking.is_paid = true;
    booking.status = BookingStatus::Completed;
    booking.updated_at = Utc::now();

    Ok(booking.clone())
}

fn authorize_transition(
    actor: &User,
    booking: &Booking,
    next: BookingStatus,
) -> Result<(), AppError> {
    let allowed = match actor.role {
        Role::Admin => true,
        Role::Customer => booking.customer_id == actor.id,
        Role::Provider | Role::Lodge => {
            booking.provider_id == Some(actor.id)
                || booking.lodge_id == Some(actor.id)
                || (booking.provider_id.is_none()
                    && booking.status == BookingStatus::Pending
                    && next == BookingStatus::Accepted)
        }
    };

    if allowed {
        Ok(())
    } else {
        Err(AppError::Forbidden(anyhow!(
            "actor may not modify this booking"
        )))
    }
}

fn visible_to(actor: &User, booking: &Booking) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Customer => booking.customer_id == actor.id,
        Role::Provider => {
            booking.provider_id == Some(actor.id)
                || (booking.provider_id.is_none() && booking.status == BookingStatus::Pending)
        }
        Role::Lodge => {
            booking.lodge_id == Some(actor.id)
                || booking.provider_id == Some(actor.id)
                || (booking.category == ServiceCategory::Lodging
                    && booking.provider_id.is_none()
                    && booking.status == BookingStatus::Pending)
        }
    }
}

fn refresh_cancellation_rate(state: &mut MarketplaceState, customer_id: Uuid) {
    let (total, cancelled) = state
        .bookings_newest_first()
        .filter(|b| b.customer_id == customer_id)
        .fold((0u32, 0u32), |(total, cancelled), b| {
            (
                total + 1,
                cancelled + u32::from(b.status == BookingStatus::Cancelled),
            )
        });

    if let Some(user) = state.user_mut(customer_id) {
        user.cancellation_rate = if total == 0 {
            0.0
        } else {
            f64::from(cancelled) / f64::from(total)
        };
        user.updated_at = Utc::now();
    }
}
