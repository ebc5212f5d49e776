//! Fetch/no-fetch dispatch for proxy stand-ins.
//!
//! Every operation against a stand-in is classified as either metadata
//! (answerable from the key and fetch state — `Debug`, equality, hashing,
//! serialization) or data (needs the referent's fields — `read`). Metadata
//! operations never touch the fetch port, so logging a proxy, comparing
//! it, or serializing an entity graph cannot cause a document fetch. Data
//! operations resolve first, then delegate.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::error::ResolutionError;
use crate::reference::{LazyRef, Ref, Referent};

// ── Metadata operations — never fetch ─────────────────────────

impl<T: Referent> fmt::Debug for LazyRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyRef")
            .field("key", self.key())
            .field("fetched", &self.is_fetched())
            .finish()
    }
}

impl<T: Referent + fmt::Debug> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(entity) => f.debug_tuple("Direct").field(entity).finish(),
            Self::Lazy(proxy) => f.debug_tuple("Lazy").field(proxy).finish(),
        }
    }
}

/// Proxies compare by reference key. Two proxies for the same key are
/// equal whether or not either has been fetched.
impl<T: Referent> PartialEq for LazyRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<T: Referent> Eq for LazyRef<T> {}

impl<T: Referent> Hash for LazyRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Equality never fetches: direct values compare by value, proxies by
/// key. Across the two variants a fetched proxy compares its published
/// referent; an unfetched proxy compares unequal rather than fetching.
impl<T: Referent + PartialEq> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Direct(a), Self::Direct(b)) => a == b,
            (Self::Lazy(a), Self::Lazy(b)) => a == b,
            (Self::Direct(value), Self::Lazy(proxy))
            | (Self::Lazy(proxy), Self::Direct(value)) => proxy
                .cached()
                .map_or(false, |entity| entity.as_ref() == value.as_ref()),
        }
    }
}

/// A lazy reference serializes as its DBRef-shaped key — even once
/// fetched. Serializers wanting the referent unwrap explicitly through
/// [`crate::helper::unwrap`] first.
impl<T: Referent> Serialize for LazyRef<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.key().serialize(serializer)
    }
}

impl<T: Referent + Serialize> Serialize for Ref<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Direct(entity) => entity.serialize(serializer),
            Self::Lazy(proxy) => proxy.serialize(serializer),
        }
    }
}

// ── Data operations — resolve, then delegate ──────────────────

impl<T: Referent> Ref<T> {
    /// Access the referent, fetching on first use of a lazy reference.
    pub async fn read(&self) -> Result<Arc<T>, ResolutionError> {
        match self {
            Self::Direct(entity) => Ok(Arc::clone(entity)),
            Self::Lazy(proxy) => proxy.resolve().await,
        }
    }

    /// The referent if available without fetching: a direct value, or a
    /// proxy's published referent. `None` for an unfetched proxy.
    pub fn try_read(&self) -> Option<Arc<T>> {
        match self {
            Self::Direct(entity) => Some(Arc::clone(entity)),
            Self::Lazy(proxy) => proxy.cached(),
        }
    }
}
