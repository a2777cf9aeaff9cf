//! Structural mapping between persisted entities and business objects.
//!
//! Every entity and business object declares its properties as a schema
//! (`Entity::fields`, `BusinessObject::properties`). `BusinessService`
//! pairs them by name, `name + "Id"` or `name + "Ids"`, and converts each
//! pair according to a fixed decision table:
//!
//! | business object side        | entity side             | rule                         |
//! |-----------------------------|-------------------------|------------------------------|
//! | reference to a BO           | text                    | copy the referenced id       |
//! | set of references to BOs    | set of text             | copy the referenced ids      |
//! | plain value                 | assignment-compatible   | copy the value               |
//! | anything else               |                         | `MappingError::Unmappable`   |
//!
//! On the way back, references are hydrated through the `MapperRegistry`.

mod registry;
mod schema;
mod service;
mod value;

use std::fmt;

use thiserror::Error;

use crate::error::short_type_name;

pub use registry::{Mapper, MapperFn, MapperRegistry};
pub use schema::{
    Access, AnyBusinessObject, BusinessObject, ErasedBo, Hydrated, Property, PropertyType, Slot,
    TypeKey,
};
pub use service::BusinessService;
pub use value::{FieldType, FromValue, Value, ValueKind};

/// A property on a concrete type, used to name the culprit in errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub owner: &'static str,
    pub property: String,
}

impl Site {
    pub fn of<T: ?Sized>(property: &str) -> Self {
        Site {
            owner: short_type_name::<T>(),
            property: property.to_string(),
        }
    }

    pub fn mismatch(&self) -> MappingError {
        MappingError::TypeMismatch(self.clone())
    }

    pub fn unknown(&self) -> MappingError {
        MappingError::UnknownProperty(self.clone())
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.property)
    }
}

/// Mapping configuration errors. These point at a schema that does not
/// line up, never at bad user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("no property matching {site} found on {target}")]
    NoMatchingProperty { site: Site, target: &'static str },

    #[error("{0} is not writable")]
    NotWritable(Site),

    #[error("no mapper registered for {target} (needed by {site})")]
    NoMapper { site: Site, target: &'static str },

    #[error("{from} is not mappable to {to}")]
    Unmappable { from: Site, to: Site },

    #[error("{0} received a value of the wrong type")]
    TypeMismatch(Site),

    #[error("{0} does not exist")]
    UnknownProperty(Site),
}

pub type MappingResult<T> = Result<T, MappingError>;
