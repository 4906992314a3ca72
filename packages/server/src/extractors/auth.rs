use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use common::{Action, Actor, Role, authorize};
use sea_orm::EntityTrait;

use crate::entity::user;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// The token only identifies the user; username and role are read from the
/// `user` row on every request, so role changes and account deletion apply to
/// tokens already issued.
///
/// Add this as a handler parameter to require authentication, or take
/// `Option<AuthUser>` on endpoints anonymous visitors may also call.
/// Authorization happens via `require()` in the handler body.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role)
    }

    /// Returns `Ok(())` if the policy allows `action`, `Err(PermissionDenied)` otherwise.
    pub fn require(&self, action: Action) -> Result<(), AppError> {
        authorize(Some(&self.actor()), action).map_err(AppError::from)
    }
}

/// The acting user, if any, as seen by the policy layer.
pub fn actor_of(auth_user: &Option<AuthUser>) -> Option<Actor> {
    auth_user.as_ref().map(AuthUser::actor)
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(header) = parts.headers.get("Authorization") else {
        return Ok(None);
    };
    let value = header.to_str().map_err(|_| AppError::TokenInvalid)?;
    value
        .strip_prefix("Bearer ")
        .map(Some)
        .ok_or(AppError::TokenInvalid)
}

async fn decode_user(token: &str, state: &AppState) -> Result<AuthUser, AppError> {
    let claims =
        jwt::verify(token, &state.config.auth.jwt_secret).map_err(|_| AppError::TokenInvalid)?;

    let account = user::Entity::find_by_id(claims.uid)
        .one(&state.db)
        .await?
        .ok_or(AppError::TokenInvalid)?;

    Ok(AuthUser {
        user_id: account.id,
        username: account.username,
        role: account.role,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.ok_or(AppError::TokenMissing)?;
        decode_user(token, state).await
    }
}

/// A missing header means an anonymous visitor. A malformed or expired token,
/// or one whose user no longer exists, is still rejected.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => decode_user(token, state).await.map(Some),
            None => Ok(None),
        }
    }
}
