// One-time verification codes
// Decision: One active code per owner; saving a new code replaces the old one
// Decision: Check-compare-delete runs under a single lock so a code is consumed at most once
// Decision: Expiry uses tokio's clock so tests can pause and advance time
//
// Delivery is left behind the CodeSender trait. The default sender only logs.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::{rngs::OsRng, Rng};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Number of decimal digits in a code
pub const CODE_LENGTH: usize = 6;

/// Codes expire 10 minutes after they are saved
pub const DEFAULT_CODE_TTL: Duration = Duration::from_secs(10 * 60);

/// How often the background sweeper drops expired codes
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Generate a 6-digit code from the OS random source
pub fn generate_code() -> String {
    let mut rng = OsRng;
    (0..CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// True when `code` has the shape of a verification code
pub fn is_valid_code_format(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

fn storage_key(owner: &str) -> String {
    format!("verification_code:{}", owner)
}

/// Compare without short-circuiting on the first differing byte
fn codes_match(stored: &str, candidate: &str) -> bool {
    let (a, b) = (stored.as_bytes(), candidate.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Keyed store of short-lived one-time codes
#[async_trait]
pub trait VerificationCodeStore: Send + Sync {
    /// Store `code` for `owner`, replacing any unconsumed code
    async fn save(&self, owner: &str, code: &str) -> Result<()>;

    /// Consume the stored code if it matches `candidate`.
    ///
    /// Returns `false` without touching the store when nothing is stored, the
    /// code expired, or the candidate is wrong.
    async fn check(&self, owner: &str, candidate: &str) -> Result<bool>;

    /// Drop expired codes, returning how many were removed
    async fn purge_expired(&self) -> Result<usize>;
}

#[derive(Debug, Clone)]
struct StoredCode {
    code: String,
    expires_at: Instant,
}

/// Process-local code store
pub struct InMemoryVerificationStore {
    codes: Mutex<HashMap<String, StoredCode>>,
    ttl: Duration,
}

impl Default for InMemoryVerificationStore {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_TTL)
    }
}

impl InMemoryVerificationStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            codes: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.codes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.lock().is_empty()
    }
}

#[async_trait]
impl VerificationCodeStore for InMemoryVerificationStore {
    async fn save(&self, owner: &str, code: &str) -> Result<()> {
        let expires_at = Instant::now()
            .checked_add(self.ttl)
            .ok_or_else(|| anyhow!("verification code TTL out of range: {:?}", self.ttl))?;
        let entry = StoredCode {
            code: code.to_string(),
            expires_at,
        };
        self.codes.lock().insert(storage_key(owner), entry);
        Ok(())
    }

    async fn check(&self, owner: &str, candidate: &str) -> Result<bool> {
        let key = storage_key(owner);
        let mut codes = self.codes.lock();

        let Some(stored) = codes.get(&key) else {
            return Ok(false);
        };

        if stored.expires_at <= Instant::now() {
            codes.remove(&key);
            return Ok(false);
        }

        if codes_match(&stored.code, candidate) {
            codes.remove(&key);
            return Ok(true);
        }

        Ok(false)
    }

    async fn purge_expired(&self) -> Result<usize> {
        let now = Instant::now();
        let mut codes = self.codes.lock();
        let before = codes.len();
        codes.retain(|_, stored| stored.expires_at > now);
        Ok(before - codes.len())
    }
}

/// Delivers a freshly generated code to its owner
#[async_trait]
pub trait CodeSender: Send + Sync {
    async fn send(&self, owner: &str, code: &str) -> Result<()>;
}

/// Sender that writes the delivery to the log instead of an external channel
#[derive(Debug, Default, Clone)]
pub struct LogCodeSender;

#[async_trait]
impl CodeSender for LogCodeSender {
    async fn send(&self, owner: &str, code: &str) -> Result<()> {
        tracing::info!(owner = %owner, "Verification code issued");
        tracing::debug!(owner = %owner, code = %code, "Verification code value");
        Ok(())
    }
}

/// Periodically purge expired codes until the task is aborted
pub fn spawn_sweeper(
    store: Arc<dyn VerificationCodeStore>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "Purged expired verification codes"),
                Err(e) => tracing::warn!("Failed to purge verification codes: {}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_format() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(is_valid_code_format(&code));
        }
    }

    #[test]
    fn test_generate_code_uses_all_digits() {
        let mut seen = [false; 10];
        for _ in 0..200 {
            for b in generate_code().bytes() {
                seen[(b - b'0') as usize] = true;
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_code_format() {
        assert!(is_valid_code_format("012345"));
        assert!(!is_valid_code_format("12345"));
        assert!(!is_valid_code_format("1234567"));
        assert!(!is_valid_code_format("12a456"));
        assert!(!is_valid_code_format("１２３４５６"));
    }

    #[tokio::test]
    async fn test_check_consumes_code() {
        let store = InMemoryVerificationStore::default();
        store.save("alice", "123456").await.unwrap();

        assert!(store.check("alice", "123456").await.unwrap());
        assert!(!store.check("alice", "123456").await.unwrap());
    }

    #[tokio::test]
    async fn test_wrong_candidate_keeps_code() {
        let store = InMemoryVerificationStore::default();
        store.save("alice", "123456").await.unwrap();

        assert!(!store.check("alice", "wrong").await.unwrap());
        assert!(!store.check("alice", "654321").await.unwrap());
        assert!(store.check("alice", "123456").await.unwrap());
    }

    #[tokio::test]
    async fn test_check_without_code() {
        let store = InMemoryVerificationStore::default();
        assert!(!store.check("nobody", "123456").await.unwrap());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_code() {
        let store = InMemoryVerificationStore::default();
        store.save("alice", "111111").await.unwrap();
        store.save("alice", "222222").await.unwrap();

        assert!(!store.check("alice", "111111").await.unwrap());
        assert!(store.check("alice", "222222").await.unwrap());
    }

    #[tokio::test]
    async fn test_codes_are_per_owner() {
        let store = InMemoryVerificationStore::default();
        store.save("alice", "111111").await.unwrap();
        store.save("bob", "222222").await.unwrap();

        assert!(!store.check("alice", "222222").await.unwrap());
        assert!(store.check("bob", "222222").await.unwrap());
        assert!(store.check("alice", "111111").await.unwrap());
    }

    #[tokio::test]
    async fn test_out_of_range_ttl_is_an_error() {
        let store = InMemoryVerificationStore::new(Duration::MAX);
        assert!(store.save("alice", "123456").await.is_err());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_code_expires_after_ttl() {
        let store = InMemoryVerificationStore::default();
        store.save("alice", "123456").await.unwrap();

        tokio::time::advance(DEFAULT_CODE_TTL - Duration::from_secs(1)).await;
        assert!(!store.check("alice", "000000").await.unwrap());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!store.check("alice", "123456").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_code_valid_just_before_expiry() {
        let store = InMemoryVerificationStore::default();
        store.save("alice", "123456").await.unwrap();

        tokio::time::advance(DEFAULT_CODE_TTL - Duration::from_millis(1)).await;
        assert!(store.check("alice", "123456").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let store = InMemoryVerificationStore::new(Duration::from_secs(10));
        store.save("alice", "111111").await.unwrap();
        tokio::time::advance(Duration::from_secs(5)).await;
        store.save("bob", "222222").await.unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;

        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.check("bob", "222222").await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checks_consume_once() {
        for _ in 0..50 {
            let store = Arc::new(InMemoryVerificationStore::default());
            store.save("alice", "123456").await.unwrap();

            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let store = store.clone();
                    tokio::spawn(async move { store.check("alice", "123456").await.unwrap() })
                })
                .collect();

            let mut successes = 0;
            for handle in handles {
                if handle.await.unwrap() {
                    successes += 1;
                }
            }
            assert_eq!(successes, 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_purges_in_background() {
        let store = Arc::new(InMemoryVerificationStore::new(Duration::from_secs(30)));
        store.save("alice", "123456").await.unwrap();

        let handle = spawn_sweeper(store.clone(), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;
        // Let the sweeper run after the tick fires.
        tokio::task::yield_now().await;

        assert!(store.is_empty());
        handle.abort();
    }
}
