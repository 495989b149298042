//! Storage seams for the auth flow.
//!
//! The relational side keeps identity records; the ephemeral side is a
//! key-value store with per-key expiry holding OTP codes and cooldown markers.
//! Both are injected as trait objects so the services never reach for globals.

pub mod cache;
pub mod credential;

pub use cache::RedisStore;
pub use credential::SeaOrmCredentialStore;

use crate::error::AppResult;
use crate::models::{NewUser, User};
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_mobile(&self, mobile: &str) -> AppResult<Option<User>>;

    /// Fails with `AppError::Conflict` when the mobile is already registered.
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Fails with `AppError::NotFound` when no record matches.
    async fn update_verified(&self, mobile: &str, verified: bool) -> AppResult<()>;
}

#[async_trait]
pub trait EphemeralStore: Send + Sync {
    /// Unconditional write; replaces the value and resets the expiry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Atomic write that only succeeds when the key is absent. Returns whether it wrote.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool>;

    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Returns whether a live key was removed.
    async fn delete(&self, key: &str) -> AppResult<bool>;

    /// Remaining lifetime, `None` when the key is absent or has no expiry.
    async fn ttl_remaining(&self, key: &str) -> AppResult<Option<Duration>>;
}
