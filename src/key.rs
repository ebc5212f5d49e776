//! Reference keys — immutable (target type, identifier) pairs naming a
//! not-yet-fetched entity.
//!
//! A key is created once, when the mapping layer discovers a lazy field,
//! and never mutated. Equality and hashing are by value over both fields.

use std::any::TypeId;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::error::ReferenceError;
use crate::reference::Referent;

// ── Identifier ────────────────────────────────────────────────

/// Document-store identifier of a referenced entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Uuid(Uuid),
    Text(String),
    Int(i64),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(id) => write!(f, "{id}"),
            Self::Text(id) => write!(f, "{id}"),
            Self::Int(id) => write!(f, "{id}"),
        }
    }
}

impl From<Uuid> for Identifier {
    fn from(id: Uuid) -> Self {
        Self::Uuid(id)
    }
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for Identifier {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl From<i64> for Identifier {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

// ── TypeDescriptor ────────────────────────────────────────────

/// Descriptor of an entity type: the stable name the document store knows
/// it by, paired with the Rust type identity used for cast checks.
///
/// Obtained from [`Referent::descriptor`]; equality requires both the name
/// and the `TypeId` to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    name: &'static str,
    type_id: TypeId,
}

impl TypeDescriptor {
    pub fn new(name: &'static str, type_id: TypeId) -> Self {
        Self { name, type_id }
    }

    /// The stable entity-type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this descriptor names the Rust type `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ── ReferenceKey ──────────────────────────────────────────────

/// Immutable name of an unresolved entity: target type + identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceKey {
    target_type: TypeDescriptor,
    identifier: Identifier,
}

impl ReferenceKey {
    /// Build a key, validating the identifier.
    ///
    /// Empty text identifiers and nil UUIDs are rejected with
    /// [`ReferenceError::InvalidReference`].
    pub fn new(
        target_type: TypeDescriptor,
        identifier: impl Into<Identifier>,
    ) -> Result<Self, ReferenceError> {
        let identifier = identifier.into();
        match &identifier {
            Identifier::Text(id) if id.is_empty() => {
                return Err(ReferenceError::InvalidReference(format!(
                    "empty identifier for target type {target_type}"
                )));
            }
            Identifier::Uuid(id) if id.is_nil() => {
                return Err(ReferenceError::InvalidReference(format!(
                    "nil uuid identifier for target type {target_type}"
                )));
            }
            _ => {}
        }
        Ok(Self {
            target_type,
            identifier,
        })
    }

    /// Convenience constructor taking the target type from a [`Referent`].
    pub fn for_type<T: Referent>(
        identifier: impl Into<Identifier>,
    ) -> Result<Self, ReferenceError> {
        Self::new(T::descriptor(), identifier)
    }

    pub fn target_type(&self) -> &TypeDescriptor {
        &self.target_type
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }
}

impl fmt::Display for ReferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.target_type, self.identifier)
    }
}

/// DBRef-shaped encoding: `{"$ref": <type name>, "$id": <identifier>}`.
///
/// Outbound only — a `TypeId` cannot be reconstituted from a wire name, so
/// keys deliberately have no `Deserialize`.
impl Serialize for ReferenceKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("$ref", self.target_type.name())?;
        map.serialize_entry("$id", &self.identifier)?;
        map.end()
    }
}
