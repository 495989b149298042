use super::EphemeralStore;
use crate::error::AppResult;
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;

/// Redis-backed ephemeral store. `ConnectionManager` is cheap to clone and
/// reconnects on its own, so each call works on a clone.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }
}

fn ttl_millis(ttl: Duration) -> u64 {
    // PX 0 is rejected by redis
    (ttl.as_millis() as u64).max(1)
}

/// `SET .. NX` replies OK when written, nil otherwise.
fn was_written(reply: Option<String>) -> bool {
    reply.is_some()
}

/// `PTTL` replies -2 for a missing key and -1 for a key without expiry.
fn remaining_from_pttl(millis: i64) -> Option<Duration> {
    (millis > 0).then(|| Duration::from_millis(millis as u64))
}

#[async_trait]
impl EphemeralStore for RedisStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let mut con = self.manager.clone();
        let _: () = con.pset_ex(key, value, ttl_millis(ttl)).await?;
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let mut con = self.manager.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async(&mut con)
            .await?;
        Ok(was_written(reply))
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut con = self.manager.clone();
        let value: Option<String> = con.get(key).await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        let mut con = self.manager.clone();
        let removed: i64 = con.del(key).await?;
        Ok(removed > 0)
    }

    async fn ttl_remaining(&self, key: &str) -> AppResult<Option<Duration>> {
        let mut con = self.manager.clone();
        let millis: i64 = con.pttl(key).await?;
        Ok(remaining_from_pttl(millis))
    }
}
