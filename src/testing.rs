//! In-memory doubles for the storage and SMS seams, used by unit tests.

use crate::error::{AppError, AppResult};
use crate::external::SmsGateway;
use crate::models::{NewUser, User};
use crate::stores::{CredentialStore, EphemeralStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// TTL store on tokio's clock so tests can pause and advance time.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EphemeralStore for MemoryStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        if let Some((_, deadline)) = entries.get(key)
            && *deadline > now
        {
            return Ok(false);
        }
        entries.insert(key.to_string(), (value.to_string(), now + ttl));
        Ok(true)
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|(_, deadline)| *deadline > Instant::now())
            .map(|(value, _)| value.clone()))
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        let mut entries = self.entries.write().await;
        Ok(entries
            .remove(key)
            .is_some_and(|(_, deadline)| deadline > Instant::now()))
    }

    async fn ttl_remaining(&self, key: &str) -> AppResult<Option<Duration>> {
        let entries = self.entries.read().await;
        let now = Instant::now();
        Ok(entries
            .get(key)
            .filter(|(_, deadline)| *deadline > now)
            .map(|(_, deadline)| deadline.duration_since(now)))
    }
}

/// Every call fails, as an unreachable cache would.
pub struct FailingStore;

fn unavailable() -> AppError {
    AppError::InternalError("store unavailable".to_string())
}

#[async_trait]
impl EphemeralStore for FailingStore {
    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
        Err(unavailable())
    }

    async fn set_if_absent(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<bool> {
        Err(unavailable())
    }

    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(unavailable())
    }

    async fn delete(&self, _key: &str) -> AppResult<bool> {
        Err(unavailable())
    }

    async fn ttl_remaining(&self, _key: &str) -> AppResult<Option<Duration>> {
        Err(unavailable())
    }
}

/// Memory-backed, except that `set_if_absent` fails.
#[derive(Default)]
pub struct AdmissionFailingStore {
    inner: MemoryStore,
}

impl AdmissionFailingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EphemeralStore for AdmissionFailingStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn set_if_absent(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<bool> {
        Err(unavailable())
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        self.inner.delete(key).await
    }

    async fn ttl_remaining(&self, key: &str) -> AppResult<Option<Duration>> {
        self.inner.ttl_remaining(key).await
    }
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_mobile(&self, mobile: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(mobile).cloned())
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.mobile) {
            return Err(AppError::Conflict(format!(
                "Mobile {} is already registered",
                user.mobile
            )));
        }
        let record = User {
            mobile: user.mobile.clone(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            verified: false,
            device_id: user.device_id,
            created_at: Some(Utc::now()),
        };
        users.insert(user.mobile, record.clone());
        Ok(record)
    }

    async fn update_verified(&self, mobile: &str, verified: bool) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(mobile)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        user.verified = verified;
        Ok(())
    }
}

/// Records every message; optionally reports delivery failure after recording.
#[derive(Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Code from the latest message to `recipient`.
    pub fn last_code_for(&self, recipient: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|(to, _)| to == recipient)
            .and_then(|(_, body)| body.strip_prefix("Your OTP is: ").map(str::to_string))
    }
}

#[async_trait]
impl SmsGateway for RecordingGateway {
    async fn send(&self, recipient: &str, message: &str) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), message.to_string()));
        if self.fail {
            return Err(AppError::ExternalApiError("SMS sending failed".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_memory_store_expires_entries() {
        let store = MemoryStore::new();
        store.set("k", "v", Duration::from_secs(5)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.ttl_remaining("k").await.unwrap(), None);
        assert!(!store.delete("k").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_store_set_if_absent() {
        let store = MemoryStore::new();
        assert!(store.set_if_absent("k", "a", Duration::from_secs(5)).await.unwrap());
        assert!(!store.set_if_absent("k", "b", Duration::from_secs(5)).await.unwrap());

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(store.set_if_absent("k", "c", Duration::from_secs(5)).await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), Some("c".to_string()));
    }
}
