//! Actor context extraction.
//!
//! The client shell renders one authenticated actor at a time and sends the
//! actor's phone number on every request after login. The extractor resolves
//! it to a full user record so handlers can authorize against role and
//! ownership.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;
use uuid::Uuid;

use crate::models::{Role, User};
use crate::startup::AppState;

pub const ACTOR_PHONE_HEADER: &str = "x-actor-phone";

/// The authenticated actor behind the current request.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub user: User,
}

impl ActorContext {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.user.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden(anyhow::anyhow!("admin role required")))
        }
    }

    /// Actors see their own account; admins see everyone's.
    pub fn can_access_user(&self, target: Uuid) -> bool {
        self.user.id == target || self.user.role == Role::Admin
    }
}

#[async_trait]
impl FromRequestParts<AppState> for ActorContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let phone = parts
            .headers
            .get(ACTOR_PHONE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::AuthError(anyhow::anyhow!("missing {} header", ACTOR_PHONE_HEADER))
            })?;

        let user = state
            .repository
            .read(|s| s.user_by_phone(phone).cloned())
            .await
            .ok_or_else(|| AppError::AuthError(anyhow::anyhow!("unknown actor")))?;

        let span = tracing::Span::current();
        span.record("actor_id", user.id.to_string().as_str());
        span.record("actor_role", user.role.as_str());

        Ok(ActorContext { user })
    }
}
