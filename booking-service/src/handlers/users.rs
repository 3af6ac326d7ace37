//! User profile, wallet, and role-elevation handlers.

use anyhow::anyhow;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{DepositRequest, UpdateProfileRequest, UserResponse, WalletEntryResponse},
    middleware::ActorContext,
    models::Role,
    startup::AppState,
};

pub async fn get_user(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    if !actor.can_access_user(user_id) {
        return Err(AppError::Forbidden(anyhow!("not your account")));
    }

    let user = state
        .repository
        .read(|s| s.user(user_id).cloned())
        .await
        .ok_or_else(|| AppError::NotFound(anyhow!("user not found")))?;

    Ok(Json(user.into()))
}

pub async fn update_profile(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;
    if !actor.can_access_user(user_id) {
        return Err(AppError::Forbidden(anyhow!("not your account")));
    }

    let user = state
        .repository
        .mutate(move |s| {
            let user = s
                .user_mut(user_id)
                .ok_or_else(|| AppError::NotFound(anyhow!("user not found")))?;
            user.name = Some(payload.name);
            user.updated_at = Utc::now();
            Ok(user.clone())
        })
        .await?;

    Ok(Json(user.into()))
}

/// Escrow top-up for the actor's own wallet.
pub async fn deposit(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<DepositRequest>,
) -> Result<Json<UserResponse>, AppError> {
    if !actor.can_access_user(user_id) {
        return Err(AppError::Forbidden(anyhow!("not your account")));
    }

    let description = payload
        .description
        .unwrap_or_else(|| "Wallet top-up".to_string());
    let user = state
        .wallet
        .deposit(user_id, payload.amount, &description)
        .await?;

    Ok(Json(user.into()))
}

/// Role elevation: a customer becomes a provider.
pub async fn become_provider(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    if actor.user.id != user_id {
        return Err(AppError::Forbidden(anyhow!("not your account")));
    }

    let user = state
        .repository
        .mutate(move |s| {
            let user = s
                .user_mut(user_id)
                .ok_or_else(|| AppError::NotFound(anyhow!("user not found")))?;
            if user.role != Role::Customer {
                return Err(AppError::Conflict(anyhow!(
                    "only customers can become providers"
                )));
            }
            user.role = Role::Provider;
            user.updated_at = Utc::now();
            Ok(user.clone())
        })
        .await?;

    tracing::info!(%user_id, "customer elevated to provider");
    Ok(Json(user.into()))
}

/// Admin-only verification flag.
pub async fn verify_user(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    actor.require_admin()?;

    let user = state
        .repository
        .mutate(move |s| {
            let user = s
                .user_mut(user_id)
                .ok_or_else(|| AppError::NotFound(anyhow!("user not found")))?;
            user.is_verified = true;
            user.updated_at = Utc::now();
            Ok(user.clone())
        })
        .await?;

    Ok(Json(user.into()))
}

/// Wallet audit entries, newest first.
pub async fn wallet_entries(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<WalletEntryResponse>>, AppError> {
    if !actor.can_access_user(user_id) {
        return Err(AppError::Forbidden(anyhow!("not your account")));
    }

    let entries = state.wallet.entries(user_id).await;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}
