use axum::{extract::FromRequestParts, http::header};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, Validation, decode};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    entity::Sessions,
    error::AppError,
    models::UserType,
    state::AppState,
};

/// The signed-in caller, resolved from the bearer token and its live session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub role: UserType,
    /// Raw bearer token, forwarded to upstream services.
    pub token: String,
}

pub fn ensure_role(user: &AuthUser, role: UserType) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_seller(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, UserType::Seller)
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;
    Ok(decoded.claims)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;

        let claims = decode_token(token, &state.config.jwt_secret)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;
        let session_id = Uuid::parse_str(&claims.sid)
            .map_err(|_| AppError::Unauthorized("Invalid session id in token".into()))?;
        let role = claims
            .role
            .parse::<UserType>()
            .map_err(|_| AppError::Unauthorized("Invalid role in token".into()))?;

        let session = Sessions::find_by_id(session_id)
            .one(&state.orm)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Session not found".into()))?;

        if session.user_id != user_id
            || session.revoked_at.is_some()
            || session.expires_at.with_timezone(&Utc) <= Utc::now()
        {
            return Err(AppError::Unauthorized("Session has ended".into()));
        }

        Ok(AuthUser {
            user_id,
            session_id,
            role,
            token: token.to_string(),
        })
    }
}
