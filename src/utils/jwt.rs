use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub mobile: String,
    pub exp: i64,
    pub iat: i64,
}

/// Mints and verifies HS256 session tokens bound to a mobile number.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in: i64,
}

impl JwtService {
    /// Fails when the secret is empty; callers treat this as a startup error.
    pub fn new(secret: &str, expires_in: i64) -> AppResult<Self> {
        if secret.is_empty() {
            return Err(AppError::ConfigError("JWT secret is not set".to_string()));
        }
        if expires_in <= 0 {
            return Err(AppError::ConfigError(format!(
                "JWT expiry must be positive, got {expires_in}"
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expires_in,
        })
    }

    pub fn mint(&self, mobile: &str) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expires_in);

        let claims = Claims {
            mobile: mobile.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AppError::JwtError)
    }

    /// Accepts either a bare token or an `Authorization` value with the
    /// `Bearer ` prefix (case-sensitive).
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let token = token.strip_prefix("Bearer ").unwrap_or(token);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::AuthError(format!("Invalid token: {e}")))?;

        if claims.mobile.is_empty() {
            return Err(AppError::AuthError("Invalid token claims".to_string()));
        }

        Ok(claims)
    }
}
