//! Redis key-value backend.
//!
//! Keys are namespaced by a prefix so one Redis database can host several
//! stores. Conditional writes run as a small Lua script that compares the
//! current value against the one the closure saw (including whether the key
//! existed at all) and only then sets the new value.

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use crate::traits::{Committed, KeyLister, KvStore, Mutation, UpdateFn};
use crate::{Error, Result};

/// Default key prefix.
pub const DEFAULT_KEY_PREFIX: &str = "aclstore:";

/// Number of keys requested per `SCAN` round trip.
const SCAN_COUNT: u32 = 256;

/// Compare-and-set: `ARGV[1]` is "1" if the key was present when read,
/// `ARGV[2]` the value read, `ARGV[3]` the value to store.
const COMPARE_AND_SET: &str = r#"
local current = redis.call('GET', KEYS[1])
if ARGV[1] == '1' then
  if current == false or current ~= ARGV[2] then
    return 0
  end
elseif current ~= false then
  return 0
end
redis.call('SET', KEYS[1], ARGV[3])
return 1
"#;

/// Redis-backed [`KvStore`] with key enumeration via `SCAN`.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisStore {
    /// Connect to the Redis server at `url`, namespacing keys with `prefix`.
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        let prefix = prefix.into();
        log::info!("Connected to Redis store (prefix '{prefix}')");
        Ok(Self { conn, prefix })
    }

    /// The key prefix in use.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn redis_key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    async fn compare_and_set(&self, key: &str, seen: Option<&[u8]>, value: &[u8]) -> Result<bool> {
        let mut conn = self.conn.clone();
        let applied: i64 = redis::cmd("EVAL")
            .arg(COMPARE_AND_SET)
            .arg(1)
            .arg(self.redis_key(key))
            .arg(if seen.is_some() { "1" } else { "0" })
            .arg(seen.unwrap_or_default())
            .arg(value)
            .query_async(&mut conn)
            .await?;
        match applied {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::UnexpectedReply(format!(
                "compare-and-set returned {other}"
            ))),
        }
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("prefix", &self.prefix)
            .finish()
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = redis::cmd("GET")
            .arg(self.redis_key(key))
            .query_async(&mut conn)
            .await?;
        Ok(value)
    }

    async fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<Committed> {
        let mut conflicts = 0u32;
        loop {
            let seen = self.get(key).await?;
            let value = match f(seen.as_deref()) {
                Mutation::Keep => return Ok(Committed::Unchanged),
                Mutation::Put(value) => value,
            };
            if self.compare_and_set(key, seen.as_deref(), &value).await? {
                return Ok(Committed::Written);
            }
            conflicts += 1;
            log::debug!("redis store: conflicting write on '{key}', retry {conflicts}");
        }
    }

    fn key_lister(&self) -> Option<&dyn KeyLister> {
        Some(self)
    }

    fn name(&self) -> &str {
        "redis"
    }
}

#[async_trait]
impl KeyLister for RedisStore {
    async fn keys(&self) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", escape_glob(&self.prefix));
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;
            keys.extend(
                batch
                    .iter()
                    .filter_map(|k| k.strip_prefix(self.prefix.as_str()))
                    .map(str::to_string),
            );
            if next == 0 {
                break;
            }
            cursor = next;
        }
        // SCAN may return a key more than once.
        keys.sort();
        keys.dedup();
        Ok(keys)
    }
}

/// Escape Redis glob metacharacters so `prefix` matches literally.
fn escape_glob(prefix: &str) -> String {
    let mut out = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
