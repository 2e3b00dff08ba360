use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use sea_orm::EntityTrait;

use crate::auth::jwt;
use crate::auth::owner::OwnerId;
use crate::entities::user;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Use as an extractor in handler parameters to require authentication:
/// ```ignore
/// async fn handler(AuthUser(user): AuthUser) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl AuthUser {
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        OwnerId::from_user(&self.0)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = match bearer_token(parts)? {
            Some(token) => {
                let claims = jwt::validate_access_token(token, &state.config.jwt_secret)
                    .map_err(|_| AppError::Unauthorized("Invalid or expired token.".to_string()))?;
                let user_id = claims
                    .user_id()
                    .ok_or_else(|| AppError::Unauthorized("Invalid token subject.".to_string()))?;
                Some(user_id)
            }
            None => None,
        };
        let owner = OwnerId::require(identity)?;

        let user_model = user::Entity::find_by_id(owner.get())
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found.".to_string()))?;

        Ok(Self(user_model))
    }
}

/// The bearer token, or `None` if no `Authorization` header was sent.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let header = header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid authorization header format.".to_string()))?;
    header
        .strip_prefix("Bearer ")
        .map(Some)
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format.".to_string()))
}
