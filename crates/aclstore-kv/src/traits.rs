//! Backend traits.
//!
//! A backend offers two primitives: a plain [`KvStore::get`] and an atomic
//! [`KvStore::update`]. Everything the ACL store does is expressed on top of
//! those two calls, one key at a time.
//!
//! # Optimistic updates
//!
//! `update` hands the current value to a caller-supplied closure and commits
//! whatever the closure returns only if the key is unchanged since it was
//! read. If another writer got there first, the backend reads again and calls
//! the closure again. The closure must therefore be free of side effects
//! beyond the value it returns (and any bookkeeping it resets on entry).

use async_trait::async_trait;

use crate::Result;

/// What an update closure wants done with the key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    /// Store these bytes. An empty vector is a present-but-empty value.
    Put(Vec<u8>),
    /// Leave the key as it is and end the update without writing.
    Keep,
}

/// Whether an update ended in a write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Committed {
    /// The closure returned [`Mutation::Put`] and the value was stored.
    Written,
    /// The closure returned [`Mutation::Keep`]; nothing was stored.
    Unchanged,
}

/// Read-modify-write closure passed to [`KvStore::update`].
///
/// Receives `None` when the key is absent.
pub type UpdateFn<'a> = dyn FnMut(Option<&[u8]>) -> Mutation + Send + 'a;

/// Single-key storage with an optimistic read-modify-write primitive.
///
/// Implementations never hold a lock across keys: updates to different keys
/// proceed independently.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Atomically apply `f` to the value stored under `key`.
    ///
    /// `f` may run more than once when concurrent writers conflict; exactly
    /// one writer commits per round and the others retry against the
    /// post-commit value.
    async fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<Committed>;

    /// Key enumeration, if this backend supports it.
    fn key_lister(&self) -> Option<&dyn KeyLister> {
        None
    }

    /// Backend name for diagnostics.
    fn name(&self) -> &str;
}

/// Optional capability: enumerate every stored key.
#[async_trait]
pub trait KeyLister: Send + Sync {
    /// Return all keys currently stored, in no particular order.
    async fn keys(&self) -> Result<Vec<String>>;
}
