//! One-time login codes
//!
//! A successful password check issues a 6-digit numeric code stored in the
//! ephemeral cache under `otp:{user_id}` with a 5-minute TTL. At most one
//! live code exists per user: reissuing overwrites, a successful match
//! deletes. Expiry is enforced by the cache, never polled by the service.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

use common::cache::RedisPool;

/// Lifetime of a one-time code, fixed at five minutes
pub const OTP_TTL_SECONDS: u64 = 300;

/// Ephemeral key-expiry store for one-time codes
#[async_trait]
pub trait CodeCache: Send + Sync {
    /// Store `value` under `key`, overwriting any live entry and
    /// restarting the TTL
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()>;

    /// Fetch the live value under `key`; expired entries are absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Drop `key`; absent keys are not an error
    async fn delete(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl CodeCache for RedisPool {
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        RedisPool::set_ex(self, key, value, ttl_seconds)
            .await
            .context("cache set failed")
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        RedisPool::get(self, key).await.context("cache get failed")
    }

    async fn delete(&self, key: &str) -> Result<()> {
        RedisPool::delete(self, key)
            .await
            .context("cache delete failed")
    }
}

/// Cache key for a user's live one-time code
pub fn otp_key(user_id: Uuid) -> String {
    format!("otp:{}", user_id)
}

/// Generate a 6-digit numeric code, zero-padded
pub fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", n)
}

/// Compare a submitted code against the stored one without leaking the
/// mismatch position through timing
pub fn codes_match(submitted: &str, stored: &str) -> bool {
    let a = submitted.as_bytes();
    let b = stored.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Code cache held in process memory, for tests and local development
///
/// Entries carry their own deadline; an expired entry is treated as absent
/// and evicted on the next access.
#[derive(Clone, Default)]
pub struct InMemoryCodeCache {
    entries: Arc<Mutex<HashMap<String, (String, Instant)>>>,
}

impl InMemoryCodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force-expire a key, as if its TTL had elapsed
    pub async fn expire_now(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(key) {
            entry.1 = Instant::now();
        }
    }
}

#[async_trait]
impl CodeCache for InMemoryCodeCache {
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let mut entries = self.entries.lock().await;
        let deadline = Instant::now() + Duration::from_secs(ttl_seconds);
        entries.insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((value, deadline)) if *deadline > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn codes_match_is_exact() {
        assert!(codes_match("042137", "042137"));
        assert!(!codes_match("042137", "042138"));
        assert!(!codes_match("042137", "42137"));
        assert!(!codes_match("", "042137"));
    }

    #[tokio::test]
    async fn in_memory_cache_overwrites_and_deletes() {
        let cache = InMemoryCodeCache::new();
        let key = otp_key(Uuid::new_v4());

        cache.set_ex(&key, "111111", OTP_TTL_SECONDS).await.unwrap();
        cache.set_ex(&key, "222222", OTP_TTL_SECONDS).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some("222222".to_string()));

        cache.delete(&key).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn in_memory_cache_expires_entries() {
        let cache = InMemoryCodeCache::new();
        let key = otp_key(Uuid::new_v4());

        cache.set_ex(&key, "333333", OTP_TTL_SECONDS).await.unwrap();
        cache.expire_now(&key).await;
        assert_eq!(cache.get(&key).await.unwrap(), None);
    }
}
