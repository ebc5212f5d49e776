//! Error taxonomy for the reference protocol.
//!
//! Construction-time failures (`InvalidReference`, `UnproxyableType`) are
//! fatal to the field being mapped and surface immediately. Resolution
//! failures are recoverable: the owning proxy stays unfetched and a later
//! access may retry.

use thiserror::Error;

use crate::key::{ReferenceKey, TypeDescriptor};

pub type Result<T> = std::result::Result<T, ReferenceError>;

/// Failure reported by a [`FetchPort`](crate::port::FetchPort).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("entity not found")]
    NotFound,

    #[error("transport: {0}")]
    Transport(#[from] anyhow::Error),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// A fetch triggered by a data operation on a proxy failed.
///
/// The proxy remains unfetched — callers may retry. Metadata operations
/// never raise this.
#[derive(Debug, Error)]
#[error("failed to resolve {key}: {source}")]
pub struct ResolutionError {
    pub key: ReferenceKey,
    #[source]
    pub source: FetchError,
}

#[derive(Debug, Error)]
pub enum ReferenceError {
    /// Malformed reference key at construction time.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// The requested stand-in type does not match the key's declared
    /// target type. Raised at mapping-configuration time, never at first
    /// access.
    #[error("unproxyable type: key declares {declared}, stand-in requested for {requested}")]
    UnproxyableType {
        declared: TypeDescriptor,
        requested: TypeDescriptor,
    },

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}
