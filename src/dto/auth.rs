use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Profile, User, UserType};

#[derive(Deserialize, Debug, ToSchema)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub user_type: UserType,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignUpResponse {
    pub user: User,
    pub profile: Profile,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub session_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub user: User,
    pub profile: Profile,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentSession {
    pub session_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub user: User,
    pub profile: Profile,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    /// Session row backing this token.
    pub sid: String,
    pub role: String,
    pub exp: usize,
}
