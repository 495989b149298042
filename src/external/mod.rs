pub mod twilio;

pub use twilio::*;

use crate::error::AppResult;
use async_trait::async_trait;

/// Out-of-band delivery of a message to a phone number.
///
/// The recipient must already be normalised (E.164) by the caller.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send(&self, recipient: &str, message: &str) -> AppResult<()>;
}
