use crate::config::OtpConfig;
use crate::error::{AppError, AppResult};
use crate::external::SmsGateway;
use crate::models::{IssueStage, SendOtpResponse};
use crate::stores::EphemeralStore;
use crate::utils::{codes_match, generate_numeric_code, is_e164, normalize_recipient};
use std::sync::Arc;
use std::time::Duration;

const COOLDOWN_SUFFIX: &str = "_cooldown";
const COOLDOWN_SENTINEL: &str = "active";

/// OTP lifecycle: generation, storage with expiry, per-identity cooldown and
/// single-use validation.
///
/// The OTP lives under the bare mobile number, the cooldown marker under
/// `<mobile>_cooldown`. Only the ephemeral store holds state.
#[derive(Clone)]
pub struct OtpService {
    store: Arc<dyn EphemeralStore>,
    gateway: Arc<dyn SmsGateway>,
    config: OtpConfig,
    default_country_code: String,
}

impl OtpService {
    pub fn new(
        store: Arc<dyn EphemeralStore>,
        gateway: Arc<dyn SmsGateway>,
        config: OtpConfig,
        default_country_code: String,
    ) -> Self {
        Self {
            store,
            gateway,
            config,
            default_country_code,
        }
    }

    fn otp_key(mobile: &str) -> String {
        mobile.to_string()
    }

    fn cooldown_key(mobile: &str) -> String {
        format!("{mobile}{COOLDOWN_SUFFIX}")
    }

    /// Remaining cooldown for `mobile`. A failed lookup counts as "no cooldown".
    pub async fn is_cooldown_active(&self, mobile: &str) -> (bool, Duration) {
        match self.store.ttl_remaining(&Self::cooldown_key(mobile)).await {
            Ok(Some(remaining)) if !remaining.is_zero() => (true, remaining),
            Ok(_) => (false, Duration::ZERO),
            Err(e) => {
                log::error!("Error checking OTP cooldown for {mobile}: {e}");
                (false, Duration::ZERO)
            }
        }
    }

    pub fn generate(&self) -> String {
        generate_numeric_code(self.config.code_length)
    }

    /// Cooldown-gated issuance: claim the cooldown marker, store a fresh
    /// code (replacing any previous one), then send it by SMS.
    ///
    /// Steps are not rolled back. A failed store leaves the cooldown held with
    /// no code; a failed delivery leaves the stored code valid.
    pub async fn issue(&self, mobile: &str) -> AppResult<SendOtpResponse> {
        let cooldown_key = Self::cooldown_key(mobile);
        let cooldown = self.config.cooldown();

        let admitted = match self
            .store
            .set_if_absent(&cooldown_key, COOLDOWN_SENTINEL, cooldown)
            .await
        {
            Ok(true) => true,
            Ok(false) => {
                let (_, remaining) = self.is_cooldown_active(mobile).await;
                return Err(AppError::RateLimited {
                    retry_after_secs: retry_after_secs(remaining, cooldown),
                });
            }
            Err(e) if self.config.cooldown_fail_open => {
                log::warn!(
                    "OTP issue for {mobile}: {} failed, proceeding without cooldown: {e}",
                    IssueStage::Admission
                );
                false
            }
            Err(e) => {
                log::error!("OTP issue for {mobile}: {} failed: {e}", IssueStage::Admission);
                return Err(e);
            }
        };

        let code = self.generate();
        if let Err(e) = self
            .store
            .set(&Self::otp_key(mobile), &code, self.config.ttl())
            .await
        {
            log::error!(
                "OTP issue for {mobile}: {} failed after admission: {e}",
                IssueStage::StoreOtp
            );
            return Err(e);
        }

        let recipient = normalize_recipient(mobile, &self.default_country_code);
        if !is_e164(&recipient) {
            log::warn!("OTP recipient {recipient} does not look like an E.164 number");
        }
        let delivery = self
            .gateway
            .send(&recipient, &format!("Your OTP is: {code}"))
            .await;

        if !admitted
            && let Err(e) = self
                .store
                .set(&cooldown_key, COOLDOWN_SENTINEL, cooldown)
                .await
        {
            log::error!("OTP issue for {mobile}: {} failed: {e}", IssueStage::Cooldown);
        }

        if let Err(e) = delivery {
            log::error!(
                "OTP issue for {mobile}: {} failed, stored code remains valid: {e}",
                IssueStage::Delivery
            );
            return Err(e);
        }

        log::info!("OTP issued for {mobile}");
        Ok(SendOtpResponse {
            expires_in: self.config.ttl_secs,
            cooldown: self.config.cooldown_secs,
        })
    }

    /// Single-use check of a submitted code. On a match the stored code is
    /// consumed; only the caller that actually removed it gets `true`.
    pub async fn validate(&self, mobile: &str, submitted: &str) -> AppResult<bool> {
        if submitted.is_empty() {
            return Ok(false);
        }

        let key = Self::otp_key(mobile);
        let Some(stored) = self.store.get(&key).await? else {
            return Ok(false);
        };

        if !codes_match(&stored, submitted) {
            return Ok(false);
        }

        let consumed = self.store.delete(&key).await?;
        if !consumed {
            log::warn!("OTP for {mobile} was consumed concurrently");
        }
        Ok(consumed)
    }
}

/// Whole seconds left, rounded up and kept within `1..=cooldown`.
fn retry_after_secs(remaining: Duration, cooldown: Duration) -> u64 {
    let millis = remaining.as_millis() as u64;
    let secs = millis.div_ceil(1000);
    secs.clamp(1, cooldown.as_secs().max(1))
}
