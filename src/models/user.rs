use super::otp::SendOtpResponse;
use crate::entities::user_entity as users;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub mobile: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub verified: bool,
    pub device_id: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            mobile: model.mobile,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            verified: model.verified,
            device_id: model.device_id,
            created_at: model.created_at,
        }
    }
}

/// Row data for a fresh, unverified registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub mobile: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub device_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "9990001111")]
    pub mobile: String,
    #[serde(default)]
    #[schema(example = "Asha")]
    pub first_name: String,
    #[serde(default)]
    #[schema(example = "Rao")]
    pub last_name: String,
    #[serde(default)]
    #[schema(example = "asha@example.com")]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "9990001111")]
    pub mobile: String,
    /// Leave empty to request a code.
    #[serde(default)]
    #[schema(example = "482913")]
    pub otp: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    #[schema(example = "9990001111")]
    pub mobile: String,
    #[serde(default)]
    #[schema(example = "482913")]
    pub otp: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResendOtpRequest {
    #[schema(example = "9990001111")]
    pub mobile: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[schema(example = "2025-03-01 10:15:00")]
    pub login_at: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyOtpResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub user: User,
}

/// A login either sends a fresh code or, given a valid one, issues a session.
#[derive(Debug)]
pub enum LoginOutcome {
    OtpSent(SendOtpResponse),
    Authenticated(LoginResponse),
}
