//! Builds proxy stand-ins around reference keys and the shared fetch port.

use std::sync::Arc;

use crate::error::ReferenceError;
use crate::key::{ReferenceKey, TypeDescriptor};
use crate::port::{FetchPort, LazyFieldPolicy};
use crate::reference::{LazyRef, Ref, Referent};
use crate::state::ProxyState;

/// Wires fresh [`ProxyState`]s around the session's fetch port.
///
/// One factory per session / connection pool; the port is shared read-only
/// across every proxy it builds, while each proxy owns its own state.
pub struct ProxyFactory {
    port: Arc<dyn FetchPort>,
}

impl ProxyFactory {
    pub fn new(port: Arc<dyn FetchPort>) -> Self {
        Self { port }
    }

    /// Build a bare proxy stand-in for `key`.
    ///
    /// Fails fast with [`ReferenceError::UnproxyableType`] when the key's
    /// declared target type is not `T` — a mapping-configuration error,
    /// caught here rather than at first access.
    pub fn lazy<T: Referent>(&self, key: ReferenceKey) -> Result<LazyRef<T>, ReferenceError> {
        if !key.target_type().is::<T>() {
            return Err(ReferenceError::UnproxyableType {
                declared: *key.target_type(),
                requested: T::descriptor(),
            });
        }
        let state = Arc::new(ProxyState::new(key, Arc::clone(&self.port)));
        Ok(LazyRef::from_state(state))
    }

    /// Build a proxy for `key`, wrapped as [`Ref::Lazy`]. No fetch occurs.
    pub fn create_proxy<T: Referent>(&self, key: ReferenceKey) -> Result<Ref<T>, ReferenceError> {
        Ok(Ref::Lazy(self.lazy(key)?))
    }

    /// Wrap an already-loaded entity — the mapping layer's eager path.
    pub fn attach<T: Referent>(&self, entity: T) -> Ref<T> {
        Ref::direct(entity)
    }

    /// Build the reference for one field of `owner`, consulting the
    /// mapping layer's lazy-field declaration.
    ///
    /// Lazy fields get a proxy with zero fetches; eager fields are fetched
    /// immediately through the port and returned resolved.
    pub async fn reference_for<T: Referent>(
        &self,
        policy: &dyn LazyFieldPolicy,
        owner: &TypeDescriptor,
        field: &str,
        key: ReferenceKey,
    ) -> Result<Ref<T>, ReferenceError> {
        let proxy = self.lazy::<T>(key)?;
        if policy.is_lazy(owner, field) {
            Ok(Ref::Lazy(proxy))
        } else {
            let entity = proxy.resolve().await?;
            Ok(Ref::Direct(entity))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Identifier;
    use crate::port::InMemoryFetchPort;

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

    #[test]
    fn create_proxy_performs_no_fetch() {
        let port = Arc::new(InMemoryFetchPort::new());
        let factory = ProxyFactory::new(port.clone());

        let reference = factory.create_proxy::<Customer>(customer_key(1)).unwrap();
        assert!(reference.is_proxy());
        assert!(!reference.is_fetched());
        assert_eq!(port.total_fetches(), 0);
    }

    #[test]
    fn mismatched_stand_in_type_fails_fast() {
        let port = Arc::new(InMemoryFetchPort::new());
        let factory = ProxyFactory::new(port);

        let err = factory.create_proxy::<Account>(customer_key(1)).unwrap_err();
        match err {
            ReferenceError::UnproxyableType {
                declared,
                requested,
            } => {
                assert_eq!(declared.name(), "customer");
                assert_eq!(requested.name(), "account");
            }
            other => panic!("expected UnproxyableType, got {other:?}"),
        }
    }

    #[test]
    fn attach_wraps_eagerly_loaded_entity() {
        let port = Arc::new(InMemoryFetchPort::new());
        let factory = ProxyFactory::new(port.clone());

        let reference = factory.attach(Customer {
            name: "acme".into(),
        });
        assert!(!reference.is_proxy());
        assert!(reference.is_fetched());
        assert_eq!(port.total_fetches(), 0);
    }

    struct FieldSet(&'static [&'static str]);
    impl LazyFieldPolicy for FieldSet {
        fn is_lazy(&self, _owner: &TypeDescriptor, field: &str) -> bool {
            self.0.iter().any(|lazy| *lazy == field)
        }
    }

    #[tokio::test]
    async fn reference_for_honors_lazy_declaration() {
        let port = Arc::new(InMemoryFetchPort::new());
        port.insert(
            customer_key(1),
            Customer {
                name: "acme".into(),
            },
        );
        let factory = ProxyFactory::new(port.clone());
        let policy = FieldSet(&["owner"]);
        let order = TypeDescriptor::new("order", std::any::TypeId::of::<()>());

        let lazy = factory
            .reference_for::<Customer>(&policy, &order, "owner", customer_key(1))
            .await
            .unwrap();
        assert!(lazy.is_proxy());
        assert_eq!(port.total_fetches(), 0);

        let eager = factory
            .reference_for::<Customer>(&policy, &order, "billing", customer_key(1))
            .await
            .unwrap();
        assert!(!eager.is_proxy());
        assert!(eager.is_fetched());
        assert_eq!(port.total_fetches(), 1);
    }

    #[tokio::test]
    async fn eager_path_surfaces_resolution_failure() {
        let port = Arc::new(InMemoryFetchPort::new());
        let factory = ProxyFactory::new(port);
        let policy = FieldSet(&[]);
        let order = TypeDescriptor::new("order", std::any::TypeId::of::<()>());

        let err = factory
            .reference_for::<Customer>(&policy, &order, "billing", customer_key(9))
            .await
            .unwrap_err();
        assert!(matches!(err, ReferenceError::Resolution(_)));
    }
}
