//! Redis-backed counter store.

use std::fmt;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::store::CounterStore;

/// Compare-and-set executed server-side so the read and the write cannot
/// interleave with another client.
///
/// A stored value counts only when it is the canonical decimal form of an
/// `i64`, the same rule `parse_counter` applies. Anything else compares as
/// absent, which `ARGV[1]` encodes as the empty string.
const COMPARE_AND_SET_SCRIPT: &str = r#"
local function canonical(raw)
  if not raw then return '' end
  local sign, digits = string.match(raw, '^(-?)(%d+)$')
  if not digits then return '' end
  if #digits > 1 and string.sub(digits, 1, 1) == '0' then return '' end
  if sign == '-' and digits == '0' then return '' end
  local limit = '9223372036854775807'
  if sign == '-' then limit = '9223372036854775808' end
  if #digits > #limit or (#digits == #limit and digits > limit) then return '' end
  return raw
end
if canonical(redis.call('GET', KEYS[1])) == ARGV[1] then
  redis.call('SET', KEYS[1], ARGV[2])
  return 1
end
return 0
"#;

/// Counter store backed by a Redis server.
#[derive(Clone)]
pub struct RedisCounterStore {
    conn: ConnectionManager,
    compare_and_set: Script,
}

impl fmt::Debug for RedisCounterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCounterStore")
            .field("conn", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisCounterStore {
    /// Connect to the Redis server at `redis_url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = Client::open(redis_url)
            .map_err(|e| StoreError::unavailable(format!("invalid redis url: {e}")))?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            StoreError::unavailable(format!("failed to connect to redis: {e}"))
        })?;

        debug!(redis_url = %redis_url, "redis counter store connected");

        Ok(Self {
            conn,
            compare_and_set: Script::new(COMPARE_AND_SET_SCRIPT),
        })
    }
}

fn unavailable(err: redis::RedisError) -> StoreError {
    StoreError::unavailable(err.to_string())
}

/// Parse a raw stored value. Only the canonical decimal form of an `i64` is
/// a counter; anything else (`"5.0"`, `"007"`, `" 7"`) reads as absent.
fn parse_counter(key: &str, raw: &str) -> Option<i64> {
    match raw.parse::<i64>() {
        Ok(value) if value.to_string() == raw => Some(value),
        _ => {
            warn!(key = %key, value = %raw, "ignoring non-canonical counter value");
            None
        }
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn get(&self, key: &str) -> Result<Option<i64>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await.map_err(unavailable)?;
        Ok(raw.and_then(|value| parse_counter(key, &value)))
    }

    async fn set(&self, key: &str, value: i64) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(key, value).await.map_err(unavailable)?;
        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<i64>,
        new: i64,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let expected = expected.map(|v| v.to_string()).unwrap_or_default();
        let swapped: i64 = self
            .compare_and_set
            .key(key)
            .arg(expected)
            .arg(new)
            .invoke_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(swapped == 1)
    }
}
