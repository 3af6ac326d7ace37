//! Login with a phone number and the simulated confirmation code.
//!
//! An unseen phone number creates an account on the spot: the role comes
//! from the explicit registration signal when given, otherwise from the
//! phone-suffix heuristic. The operator phone always maps to admin. There is
//! no lockout or rate limiting on bad codes.

use anyhow::anyhow;
use axum::{extract::State, Json};
use service_core::error::AppError;
use validator::Validate;

use crate::{
    dtos::{LoginRequest, UserResponse},
    models::{Role, User},
    startup::AppState,
};

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    if payload.code != state.config.platform.confirmation_code {
        tracing::warn!(phone = %payload.phone, "login rejected: bad confirmation code");
        return Err(AppError::AuthError(anyhow!("invalid confirmation code")));
    }

    if let Some(existing) = state
        .repository
        .read(|s| s.user_by_phone(&payload.phone).cloned())
        .await
    {
        return Ok(Json(existing.into()));
    }

    let phone = payload.phone.clone();
    let role_hint = payload.role;
    let operator_phone = state.config.platform.operator_phone.clone();

    let user = state
        .repository
        .mutate(move |s| {
            // Re-check under the write lock.
            if let Some(existing) = s.user_by_phone(&phone) {
                return Ok(existing.clone());
            }

            let role = if phone == operator_phone {
                Role::Admin
            } else {
                // Admin accounts only exist through the operator phone and
                // seeding; a caller-supplied admin hint is ignored.
                match role_hint {
                    Some(Role::Admin) | None => {
                        if role_hint.is_some() {
                            tracing::warn!(%phone, "ignoring admin role hint at registration");
                        }
                        Role::infer_from_phone(&phone)
                    }
                    Some(role) => role,
                }
            };

            tracing::info!(%phone, %role, "creating user on first login");
            let user = User::new(phone, role);
            s.insert_user(user.clone())?;
            Ok(user)
        })
        .await?;

    Ok(Json(user.into()))
}
