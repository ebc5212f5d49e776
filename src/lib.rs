//! Lazy reference resolution for document-mapped entity graphs.
//!
//! When an entity graph is loaded, referenced sub-entities declared lazy
//! are not fetched eagerly. The mapping layer substitutes a proxy
//! stand-in ([`LazyRef`], held as [`Ref::Lazy`]) that defers the document
//! fetch until first real use, while structural operations — equality,
//! hashing, logging, serialization, type introspection — are answered
//! from the reference key alone and never touch the store.
//!
//! Guarantees:
//! - at most one underlying fetch per proxy instance, even under
//!   concurrent first access;
//! - a failed fetch leaves the proxy unfetched so a later access may
//!   retry;
//! - the declared target type is reported without resolving;
//! - after resolution the same entity instance is returned on every call.
//!
//! The document store itself is an external collaborator behind the
//! [`FetchPort`] trait; which fields are lazy is the mapping layer's call,
//! consumed through [`LazyFieldPolicy`].
//!
//! ```
//! use std::sync::Arc;
//! use entity_refs::{
//!     helper, InMemoryFetchPort, ProxyFactory, Ref, Referent, ReferenceKey,
//! };
//!
//! #[derive(Debug, PartialEq)]
//! struct Customer {
//!     name: String,
//! }
//! impl Referent for Customer {
//!     const TYPE_NAME: &'static str = "customer";
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let port = Arc::new(InMemoryFetchPort::new());
//! let key = ReferenceKey::for_type::<Customer>(42i64)?;
//! port.insert(key.clone(), Customer { name: "acme".into() });
//!
//! let factory = ProxyFactory::new(port);
//! let reference: Ref<Customer> = factory.create_proxy(key)?;
//!
//! // Introspection without a fetch.
//! assert!(helper::is_proxy(&reference));
//! assert!(helper::is_unfetched(&reference));
//! assert_eq!(helper::referent_class(&reference).name(), "customer");
//!
//! // First real use fetches exactly once.
//! let customer = helper::unwrap(&reference).await?;
//! assert_eq!(customer.name, "acme");
//! assert!(helper::is_fetched(&reference));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod factory;
pub mod helper;
pub mod key;
pub mod port;
pub mod reference;
pub mod state;

mod dispatch;

pub use error::{FetchError, ReferenceError, ResolutionError};
pub use factory::ProxyFactory;
pub use key::{Identifier, ReferenceKey, TypeDescriptor};
pub use port::{FetchPort, InMemoryFetchPort, LazyFieldPolicy, SharedEntity};
pub use reference::{LazyRef, ProxiedReference, Ref, Referent};
pub use state::ProxyState;
