//! Per-proxy resolution state machine.
//!
//! Two states, `Unfetched` and `Fetched`, realized as an empty/filled
//! `tokio::sync::OnceCell`. `resolve()` is the only operation that may
//! block; everything else reads immutable or already-published state.

use std::fmt;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::error::ResolutionError;
use crate::key::ReferenceKey;
use crate::port::{FetchPort, SharedEntity};

/// Mutable state owned by exactly one proxy stand-in.
///
/// The fetch port is shared across all proxies of a session; the cell is
/// private to this instance, so contention during first access is scoped
/// per reference, never across the entity graph.
pub struct ProxyState {
    key: ReferenceKey,
    port: Arc<dyn FetchPort>,
    cell: OnceCell<SharedEntity>,
}

impl ProxyState {
    pub(crate) fn new(key: ReferenceKey, port: Arc<dyn FetchPort>) -> Self {
        Self {
            key,
            port,
            cell: OnceCell::new(),
        }
    }

    pub fn key(&self) -> &ReferenceKey {
        &self.key
    }

    /// Whether the referent has been fetched and published. Lock-free;
    /// never triggers a fetch.
    pub fn is_fetched(&self) -> bool {
        self.cell.initialized()
    }

    /// The published referent, if fetched. Never triggers a fetch.
    pub fn cached(&self) -> Option<SharedEntity> {
        self.cell.get().cloned()
    }

    /// Transition `Unfetched -> Fetched`, fetching through the port.
    ///
    /// Concurrent first-callers serialize on the cell: exactly one performs
    /// the fetch, the rest observe the published entity. Once fetched, the
    /// same entity instance is returned on every call without touching the
    /// port. On failure the cell stays empty — the error is surfaced to
    /// the triggering caller and a later call may retry.
    pub async fn resolve(&self) -> Result<SharedEntity, ResolutionError> {
        let entity = self
            .cell
            .get_or_try_init(|| async {
                debug!(key = %self.key, "fetching lazy reference");
                match self.port.fetch(&self.key).await {
                    Ok(entity) => {
                        debug!(key = %self.key, "lazy reference resolved");
                        Ok(entity)
                    }
                    Err(source) => {
                        warn!(key = %self.key, error = %source, "lazy reference fetch failed");
                        Err(ResolutionError {
                            key: self.key.clone(),
                            source,
                        })
                    }
                }
            })
            .await?;
        Ok(Arc::clone(entity))
    }
}

impl fmt::Debug for ProxyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyState")
            .field("key", &self.key)
            .field("fetched", &self.is_fetched())
            .finish()
    }
}
