use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Returned after an OTP has been stored and handed to the SMS gateway.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SendOtpResponse {
    /// Seconds until the issued code expires.
    pub expires_in: u64,
    /// Seconds before another code may be requested.
    pub cooldown: u64,
}

/// Steps of an OTP issuance. Nothing is rolled back, so a failure leaves
/// every earlier step in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueStage {
    /// Claiming the cooldown marker.
    Admission,
    /// Writing the code under the identity's key.
    StoreOtp,
    /// Handing the code to the SMS gateway. The stored code stays valid on failure.
    Delivery,
    /// Writing the cooldown marker after a fail-open admission.
    Cooldown,
}

impl fmt::Display for IssueStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueStage::Admission => write!(f, "admission"),
            IssueStage::StoreOtp => write!(f, "store_otp"),
            IssueStage::Delivery => write!(f, "delivery"),
            IssueStage::Cooldown => write!(f, "cooldown"),
        }
    }
}
