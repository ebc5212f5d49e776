//! Fetch Port Abstraction
//!
//! Boundary contracts to the external collaborators: the document store
//! ("fetch entity by identifier and type") and the mapping layer ("is this
//! field declared lazy"). The store-side implementation lives outside this
//! crate; an in-memory port ships here for tests and downstream stubs.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use crate::error::FetchError;
use crate::key::{ReferenceKey, TypeDescriptor};
use crate::reference::Referent;

/// Type-erased entity as it crosses the fetch boundary. The typed
/// stand-in downcasts it back to the declared referent type.
pub type SharedEntity = Arc<dyn Any + Send + Sync>;

/// Fetches an entity by reference key from the backing document store.
///
/// One implementation (holding the session / connection pool) is shared
/// read-only across every proxy built from it.
#[async_trait]
pub trait FetchPort: Send + Sync {
    async fn fetch(&self, key: &ReferenceKey) -> Result<SharedEntity, FetchError>;
}

/// Mapping-layer declaration of which fields defer their fetch.
///
/// Consulted by [`ProxyFactory::reference_for`](crate::factory::ProxyFactory::reference_for);
/// the decision itself (annotations, schema, config) belongs to the
/// mapping layer, not this crate.
pub trait LazyFieldPolicy: Send + Sync {
    fn is_lazy(&self, owner: &TypeDescriptor, field: &str) -> bool;
}

/// In-memory fetch port keyed by [`ReferenceKey`], with per-key fetch
/// counters so tests can assert the no-spurious-fetch guarantees.
#[derive(Default)]
pub struct InMemoryFetchPort {
    entries: RwLock<HashMap<ReferenceKey, SharedEntity>>,
    fetches: Mutex<HashMap<ReferenceKey, usize>>,
}

impl InMemoryFetchPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entity under `key`. Replaces any previous entry.
    pub fn insert<T: Referent>(&self, key: ReferenceKey, entity: T) {
        self.entries
            .write()
            .expect("entries lock poisoned")
            .insert(key, Arc::new(entity));
    }

    /// Remove the entity under `key`, if any.
    pub fn remove(&self, key: &ReferenceKey) {
        self.entries
            .write()
            .expect("entries lock poisoned")
            .remove(key);
    }

    /// How many fetches have been attempted for `key` (including failed
    /// ones).
    pub fn fetch_count(&self, key: &ReferenceKey) -> usize {
        self.fetches
            .lock()
            .expect("fetches lock poisoned")
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    /// Total fetches attempted across all keys.
    pub fn total_fetches(&self) -> usize {
        self.fetches
            .lock()
            .expect("fetches lock poisoned")
            .values()
            .sum()
    }
}

#[async_trait]
impl FetchPort for InMemoryFetchPort {
    async fn fetch(&self, key: &ReferenceKey) -> Result<SharedEntity, FetchError> {
        *self
            .fetches
            .lock()
            .expect("fetches lock poisoned")
            .entry(key.clone())
            .or_insert(0) += 1;

        self.entries
            .read()
            .expect("entries lock poisoned")
            .get(key)
            .cloned()
            .ok_or(FetchError::NotFound)
    }
}
