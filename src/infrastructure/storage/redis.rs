use crate::domain::error::StoreError;
use crate::domain::traits::{KeyValueStore, WindowHit};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};

// Increment and, on the first hit of a window, attach the expiry — one
// script invocation so concurrent requests can never both observe the
// first hit or race the expiry.
static INCR_WINDOW_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
        local count = redis.call('INCR', KEYS[1])
        if count == 1 then
            redis.call('PEXPIRE', KEYS[1], ARGV[1])
        end
        local remaining = redis.call('PTTL', KEYS[1])
        return {count, remaining}
        "#,
    )
});

/// Redis-backed key-value store.
///
/// The connection manager reconnects on its own; every operation clones a
/// cheap handle, so the store itself holds no locks.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: &[u8],
        ttl_secs: u64,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn incr_window(&self, key: &str, window_secs: u64) -> Result<WindowHit, StoreError> {
        let mut conn = self.conn.clone();
        let window_ms = window_secs.saturating_mul(1000);

        let (count, remaining): (u64, i64) = INCR_WINDOW_SCRIPT
            .key(key)
            .arg(window_ms)
            .invoke_async(&mut conn)
            .await?;

        // PTTL reports -1/-2 for keys without expiry; treat as a full window.
        let remaining_ms = if remaining > 0 {
            remaining as u64
        } else {
            window_ms
        };

        Ok(WindowHit { count, remaining_ms })
    }
}
