use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::OtpService;
use crate::stores::CredentialStore;
use crate::utils::JwtService;
use chrono::Local;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    otp_service: OtpService,
    jwt_service: JwtService,
}

fn require_mobile(mobile: &str) -> AppResult<&str> {
    let mobile = mobile.trim();
    if mobile.is_empty() {
        return Err(AppError::ValidationError("Invalid input: mobile is required".to_string()));
    }
    Ok(mobile)
}

impl AuthService {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        otp_service: OtpService,
        jwt_service: JwtService,
    ) -> Self {
        Self {
            users,
            otp_service,
            jwt_service,
        }
    }

    async fn find_user(&self, mobile: &str, missing: &str) -> AppResult<User> {
        self.users
            .find_by_mobile(mobile)
            .await?
            .ok_or_else(|| AppError::NotFound(missing.to_string()))
    }

    /// Creates an unverified account and sends its first OTP.
    pub async fn register(
        &self,
        request: RegisterRequest,
        device_id: String,
    ) -> AppResult<SendOtpResponse> {
        let mobile = require_mobile(&request.mobile)?.to_string();

        if self.users.find_by_mobile(&mobile).await?.is_some() {
            return Err(AppError::Conflict(
                "User already registered. Please login.".to_string(),
            ));
        }

        log::info!("Registering {mobile} with device {device_id}");
        self.users
            .create(NewUser {
                mobile: mobile.clone(),
                first_name: request.first_name,
                last_name: request.last_name,
                email: request.email,
                device_id,
            })
            .await?;

        self.otp_service.issue(&mobile).await
    }

    /// Without an OTP this sends one; with an OTP it exchanges it for a session token.
    /// Unverified accounts are refused either way.
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginOutcome> {
        let mobile = require_mobile(&request.mobile)?;
        let user = self
            .find_user(mobile, "User not registered. Please register first!")
            .await?;

        if !user.verified {
            return Err(AppError::AuthError(
                "Account is not verified. Please verify first!".to_string(),
            ));
        }

        if request.otp.is_empty() {
            let sent = self.otp_service.issue(mobile).await?;
            return Ok(LoginOutcome::OtpSent(sent));
        }

        if !self.otp_service.validate(mobile, &request.otp).await? {
            return Err(AppError::AuthError("Invalid or expired OTP".to_string()));
        }

        let token = self.jwt_service.mint(mobile)?;
        log::info!("User {mobile} logged in");

        Ok(LoginOutcome::Authenticated(LoginResponse {
            token,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            login_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }))
    }

    /// Consumes the OTP, marks the account verified and issues a session token.
    pub async fn verify_otp(&self, request: VerifyOtpRequest) -> AppResult<VerifyOtpResponse> {
        let mobile = require_mobile(&request.mobile)?;

        if !self.otp_service.validate(mobile, &request.otp).await? {
            return Err(AppError::AuthError("Invalid or expired OTP".to_string()));
        }

        self.users.update_verified(mobile, true).await?;
        log::info!("User {mobile} verified");

        let token = self.jwt_service.mint(mobile)?;
        Ok(VerifyOtpResponse { token })
    }

    pub async fn resend_otp(&self, request: ResendOtpRequest) -> AppResult<SendOtpResponse> {
        let mobile = require_mobile(&request.mobile)?;
        self.find_user(mobile, "User not registered. Please sign up.")
            .await?;
        self.otp_service.issue(mobile).await
    }

    pub async fn get_user(&self, mobile: &str) -> AppResult<User> {
        self.find_user(mobile, "User not found").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OtpConfig;
    use crate::testing::{MemoryCredentialStore, MemoryStore, RecordingGateway};
    use chrono::Utc;
    use std::time::Duration;

    struct Harness {
        auth: AuthService,
        jwt: JwtService,
        users: Arc<MemoryCredentialStore>,
        gateway: Arc<RecordingGateway>,
    }

    fn harness() -> Harness {
        let users = Arc::new(MemoryCredentialStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        let otp = OtpService::new(
            Arc::new(MemoryStore::new()),
            gateway.clone(),
            OtpConfig::default(),
            "+91".to_string(),
        );
        let jwt = JwtService::new("test-secret", 86_400).unwrap();
        Harness {
            auth: AuthService::new(users.clone(), otp, jwt.clone()),
            jwt,
            users,
            gateway,
        }
    }

    fn register_request(mobile: &str) -> RegisterRequest {
        RegisterRequest {
            mobile: mobile.to_string(),
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            email: "asha@example.com".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_verify_and_token_round_trip() {
        let h = harness();

        h.auth
            .register(register_request("9990001111"), "device-1".to_string())
            .await
            .unwrap();

        let user = h.users.find_by_mobile("9990001111").await.unwrap().unwrap();
        assert!(!user.verified);
        assert_eq!(user.device_id, "device-1");

        let code = h.gateway.last_code_for("+919990001111").unwrap();
        let verified = h
            .auth
            .verify_otp(VerifyOtpRequest {
                mobile: "9990001111".to_string(),
                otp: code,
            })
            .await
            .unwrap();

        let user = h.users.find_by_mobile("9990001111").await.unwrap().unwrap();
        assert!(user.verified);

        let claims = h.jwt.verify(&verified.token).unwrap();
        assert_eq!(claims.mobile, "9990001111");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_twice_conflicts() {
        let h = harness();
        h.auth
            .register(register_request("9990001111"), "d".to_string())
            .await
            .unwrap();

        let again = h
            .auth
            .register(register_request("9990001111"), "d".to_string())
            .await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_requires_mobile() {
        let h = harness();
        let result = h
            .auth
            .register(register_request("  "), "d".to_string())
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert!(h.gateway.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resend_immediately_is_rate_limited() {
        let h = harness();
        h.auth
            .register(register_request("9990001111"), "d".to_string())
            .await
            .unwrap();

        let resend = h
            .auth
            .resend_otp(ResendOtpRequest {
                mobile: "9990001111".to_string(),
            })
            .await;
        match resend {
            Err(AppError::RateLimited { retry_after_secs }) => {
                assert!(retry_after_secs > 0 && retry_after_secs <= 30);
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resend_for_unknown_user_is_not_found() {
        let h = harness();
        let result = h
            .auth
            .resend_otp(ResendOtpRequest {
                mobile: "9990001111".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_refused_for_unverified_account() {
        let h = harness();
        h.auth
            .register(register_request("9990001111"), "d".to_string())
            .await
            .unwrap();
        let code = h.gateway.last_code_for("+919990001111").unwrap();

        let result = h
            .auth
            .login(LoginRequest {
                mobile: "9990001111".to_string(),
                otp: code.clone(),
            })
            .await;
        assert!(matches!(result, Err(AppError::AuthError(_))));

        // the refused login did not consume the code
        h.auth
            .verify_otp(VerifyOtpRequest {
                mobile: "9990001111".to_string(),
                otp: code,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_login_unknown_user_is_not_found() {
        let h = harness();
        let result = h
            .auth
            .login(LoginRequest {
                mobile: "9990001111".to_string(),
                otp: String::new(),
            })
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_sends_otp_then_exchanges_it() {
        let h = harness();
        h.auth
            .register(register_request("9990001111"), "d".to_string())
            .await
            .unwrap();
        let code = h.gateway.last_code_for("+919990001111").unwrap();
        h.auth
            .verify_otp(VerifyOtpRequest {
                mobile: "9990001111".to_string(),
                otp: code,
            })
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(31)).await;
        let outcome = h
            .auth
            .login(LoginRequest {
                mobile: "9990001111".to_string(),
                otp: String::new(),
            })
            .await
            .unwrap();
        assert!(matches!(outcome, LoginOutcome::OtpSent(_)));

        let login_code = h.gateway.last_code_for("+919990001111").unwrap();
        let wrong = h
            .auth
            .login(LoginRequest {
                mobile: "9990001111".to_string(),
                otp: "not-it".to_string(),
            })
            .await;
        assert!(matches!(wrong, Err(AppError::AuthError(_))));

        let outcome = h
            .auth
            .login(LoginRequest {
                mobile: "9990001111".to_string(),
                otp: login_code.clone(),
            })
            .await
            .unwrap();
        let LoginOutcome::Authenticated(session) = outcome else {
            panic!("expected a session");
        };
        assert_eq!(session.first_name, "Asha");
        assert_eq!(session.email, "asha@example.com");
        assert_eq!(h.jwt.verify(&session.token).unwrap().mobile, "9990001111");

        // single use
        let replay = h
            .auth
            .login(LoginRequest {
                mobile: "9990001111".to_string(),
                otp: login_code,
            })
            .await;
        assert!(matches!(replay, Err(AppError::AuthError(_))));
    }

    #[tokio::test]
    async fn test_verify_with_wrong_code_is_unauthorized() {
        let h = harness();
        let result = h
            .auth
            .verify_otp(VerifyOtpRequest {
                mobile: "9990001111".to_string(),
                otp: "123456".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AppError::AuthError(_))));
    }

    #[tokio::test]
    async fn test_get_user_missing() {
        let h = harness();
        assert!(matches!(
            h.auth.get_user("9990001111").await,
            Err(AppError::NotFound(_))
        ));
    }
}
