//! Fetch-safe inspection façade.
//!
//! Stateless pure functions over [`Ref`], for callers that must inspect an
//! entity without knowing whether it is proxied — serializers, equality
//! checks, debug utilities. Only [`unwrap`]/[`unwrap_opt`] may fetch;
//! everything else reads metadata. The `*_opt` variants cover optional
//! (nullable) fields: an absent reference is never a proxy and trivially
//! fetched.

use std::sync::Arc;

use crate::error::ResolutionError;
use crate::key::TypeDescriptor;
use crate::reference::{Ref, Referent};

/// Return the bare entity, never a stand-in: a direct value passes
/// through, a proxy is resolved (fetching on first use).
pub async fn unwrap<T: Referent>(reference: &Ref<T>) -> Result<Arc<T>, ResolutionError> {
    reference.read().await
}

/// Whether the reference is a proxy stand-in. No side effects.
pub fn is_proxy<T: Referent>(reference: &Ref<T>) -> bool {
    reference.is_proxy()
}

/// The declared target type for a proxy (without resolving), the value's
/// own type otherwise.
pub fn referent_class<T: Referent>(reference: &Ref<T>) -> TypeDescriptor {
    reference.referent_class()
}

/// Direct values are trivially fetched; proxies report their state.
pub fn is_fetched<T: Referent>(reference: &Ref<T>) -> bool {
    reference.is_fetched()
}

pub fn is_unfetched<T: Referent>(reference: &Ref<T>) -> bool {
    !is_fetched(reference)
}

// ── Optional-field variants ───────────────────────────────────

/// [`unwrap`] over an optional field: `None` stays `None`.
pub async fn unwrap_opt<T: Referent>(
    reference: Option<&Ref<T>>,
) -> Result<Option<Arc<T>>, ResolutionError> {
    match reference {
        Some(reference) => Ok(Some(unwrap(reference).await?)),
        None => Ok(None),
    }
}

/// An absent reference is not a proxy.
pub fn is_proxy_opt<T: Referent>(reference: Option<&Ref<T>>) -> bool {
    reference.map_or(false, is_proxy)
}

/// `None` has no type; otherwise as [`referent_class`].
pub fn referent_class_opt<T: Referent>(reference: Option<&Ref<T>>) -> Option<TypeDescriptor> {
    reference.map(referent_class)
}

/// An absent reference is trivially fetched — there is nothing to fetch.
pub fn is_fetched_opt<T: Referent>(reference: Option<&Ref<T>>) -> bool {
    reference.map_or(true, is_fetched)
}

pub fn is_unfetched_opt<T: Referent>(reference: Option<&Ref<T>>) -> bool {
    !is_fetched_opt(reference)
}
