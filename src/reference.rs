//! Proxy stand-ins and the `ProxiedReference` capability.
//!
//! [`LazyRef`] is the concrete stand-in a lazy field holds; [`Ref`] is the
//! tagged variant (`Direct` | `Lazy`) application code sees, so unwrap and
//! introspection are exhaustive matches instead of runtime class checks.
//! [`ProxiedReference`] is the type-erased capability serializers and
//! debug utilities rely on when they cannot name the referent type.

use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ResolutionError;
use crate::key::{ReferenceKey, TypeDescriptor};
use crate::port::SharedEntity;
use crate::state::ProxyState;

// ── Referent ──────────────────────────────────────────────────

/// Implemented by entity types that can sit behind a lazy reference.
pub trait Referent: Any + Send + Sync + Sized + 'static {
    /// Stable entity-type name as the document store knows it.
    const TYPE_NAME: &'static str;

    /// Descriptor pairing the stable name with the Rust type identity.
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new(Self::TYPE_NAME, TypeId::of::<Self>())
    }
}

// ── LazyRef ───────────────────────────────────────────────────

/// Proxy stand-in for a not-yet-fetched entity of type `T`.
///
/// Clones share the same [`ProxyState`], so a clone is the *same* proxy
/// instance: the at-most-one-fetch guarantee spans all clones.
pub struct LazyRef<T: Referent> {
    state: Arc<ProxyState>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Referent> Clone for LazyRef<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            _marker: PhantomData,
        }
    }
}

impl<T: Referent> LazyRef<T> {
    pub(crate) fn from_state(state: Arc<ProxyState>) -> Self {
        Self {
            state,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &ReferenceKey {
        self.state.key()
    }

    /// Declared target type. Answered from the key — never fetches.
    pub fn referent_class(&self) -> &TypeDescriptor {
        self.state.key().target_type()
    }

    /// Whether the referent has been fetched. Never fetches.
    pub fn is_fetched(&self) -> bool {
        self.state.is_fetched()
    }

    /// The referent if already fetched, without triggering a fetch.
    pub fn cached(&self) -> Option<Arc<T>> {
        self.state
            .cached()
            .map(|entity| downcast_entity(entity, self.state.key()))
    }

    /// Unwrap: fetch on first call, return the published referent after.
    ///
    /// The same `Arc` is returned on every successful call (referential
    /// stability). On failure the proxy stays unfetched and the call may
    /// be retried.
    pub async fn resolve(&self) -> Result<Arc<T>, ResolutionError> {
        let entity = self.state.resolve().await?;
        Ok(downcast_entity(entity, self.state.key()))
    }
}

/// Cast the erased entity back to the declared referent type.
///
/// A mismatch means the fetch port returned an entity of the wrong type
/// for the key — programmer error in the port wiring, surfaced as a panic
/// rather than masked.
fn downcast_entity<T: Referent>(entity: SharedEntity, key: &ReferenceKey) -> Arc<T> {
    entity.downcast::<T>().unwrap_or_else(|_| {
        panic!(
            "fetch port returned a foreign entity for {key}: expected {}",
            T::TYPE_NAME
        )
    })
}

// ── ProxiedReference ──────────────────────────────────────────

/// Type-erased capability every proxy stand-in exposes.
#[async_trait]
pub trait ProxiedReference: Send + Sync {
    fn reference_key(&self) -> &ReferenceKey;

    /// Declared target type, answerable without resolving.
    fn referent_class(&self) -> &TypeDescriptor;

    /// Fetch status. Never triggers a fetch.
    fn is_fetched(&self) -> bool;

    /// Unwrap to the erased referent, fetching if necessary.
    async fn resolve_erased(&self) -> Result<SharedEntity, ResolutionError>;
}

#[async_trait]
impl<T: Referent> ProxiedReference for LazyRef<T> {
    fn reference_key(&self) -> &ReferenceKey {
        self.key()
    }

    fn referent_class(&self) -> &TypeDescriptor {
        LazyRef::referent_class(self)
    }

    fn is_fetched(&self) -> bool {
        LazyRef::is_fetched(self)
    }

    async fn resolve_erased(&self) -> Result<SharedEntity, ResolutionError> {
        self.state.resolve().await
    }
}

// ── Ref ───────────────────────────────────────────────────────

/// What an entity struct holds for a referenced sub-entity: either the
/// entity itself (eager field, or attached after load) or a proxy.
pub enum Ref<T: Referent> {
    Direct(Arc<T>),
    Lazy(LazyRef<T>),
}

impl<T: Referent> Clone for Ref<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Direct(entity) => Self::Direct(Arc::clone(entity)),
            Self::Lazy(proxy) => Self::Lazy(proxy.clone()),
        }
    }
}

impl<T: Referent> Ref<T> {
    /// Wrap an already-loaded entity.
    pub fn direct(entity: T) -> Self {
        Self::Direct(Arc::new(entity))
    }

    pub fn is_proxy(&self) -> bool {
        matches!(self, Self::Lazy(_))
    }

    /// Direct values are trivially fetched; proxies delegate to their
    /// state. Never fetches.
    pub fn is_fetched(&self) -> bool {
        match self {
            Self::Direct(_) => true,
            Self::Lazy(proxy) => proxy.is_fetched(),
        }
    }

    /// The value's own type for a direct entity, the declared target type
    /// for a proxy. Never fetches.
    pub fn referent_class(&self) -> TypeDescriptor {
        match self {
            Self::Direct(_) => T::descriptor(),
            Self::Lazy(proxy) => *proxy.referent_class(),
        }
    }

    pub fn as_proxy(&self) -> Option<&LazyRef<T>> {
        match self {
            Self::Direct(_) => None,
            Self::Lazy(proxy) => Some(proxy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Identifier;
    use crate::port::{FetchPort, InMemoryFetchPort};

    #[derive(Debug, PartialEq)]
    struct Customer {
        name: String,
    }
    impl Referent for Customer {
        const TYPE_NAME: &'static str = "customer";
    }

    #[derive(Debug)]
    struct Account;
    impl Referent for Account {
        const TYPE_NAME: &'static str = "account";
    }

    fn customer_key(id: i64) -> ReferenceKey {
        ReferenceKey::for_type::<Customer>(Identifier::Int(id)).unwrap()
    }

    fn lazy_customer(port: Arc<dyn FetchPort>, id: i64) -> LazyRef<Customer> {
        LazyRef::from_state(Arc::new(ProxyState::new(customer_key(id), port)))
    }

    #[tokio::test]
    async fn clone_shares_resolution_state() {
        let port = Arc::new(InMemoryFetchPort::new());
        port.insert(
            customer_key(1),
            Customer {
                name: "acme".into(),
            },
        );
        let proxy = lazy_customer(port.clone(), 1);
        let twin = proxy.clone();

        let entity = proxy.resolve().await.unwrap();
        assert!(twin.is_fetched());
        let via_twin = twin.resolve().await.unwrap();
        assert!(Arc::ptr_eq(&entity, &via_twin));
        assert_eq!(port.fetch_count(&customer_key(1)), 1);
    }

    #[tokio::test]
    async fn erased_capability_reports_without_fetching() {
        let port = Arc::new(InMemoryFetchPort::new());
        let proxy = lazy_customer(port.clone(), 2);
        let erased: &dyn ProxiedReference = &proxy;

        assert_eq!(erased.referent_class().name(), "customer");
        assert!(!erased.is_fetched());
        assert_eq!(erased.reference_key(), &customer_key(2));
        assert_eq!(port.fetch_count(&customer_key(2)), 0);
    }

    #[tokio::test]
    #[should_panic(expected = "foreign entity")]
    async fn foreign_entity_from_port_is_a_panic() {
        struct LyingPort;
        #[async_trait]
        impl FetchPort for LyingPort {
            async fn fetch(
                &self,
                _key: &ReferenceKey,
            ) -> Result<SharedEntity, crate::error::FetchError> {
                Ok(Arc::new(Account))
            }
        }

        let proxy = lazy_customer(Arc::new(LyingPort), 3);
        let _ = proxy.resolve().await;
    }

    #[test]
    fn ref_metadata_over_direct_value() {
        let reference = Ref::direct(Customer {
            name: "acme".into(),
        });
        assert!(!reference.is_proxy());
        assert!(reference.is_fetched());
        assert_eq!(reference.referent_class(), Customer::descriptor());
        assert!(reference.as_proxy().is_none());
    }
}
