//! Property schemas and the type-erased plumbing used to hydrate references.

use std::any::{Any, TypeId};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::hash::Hash;

use crate::error::short_type_name;
use crate::mapping::{FieldType, FromValue, MappingResult, Site, Value, ValueKind};

/// Runtime tag of a business object type, used to look up its mapper.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: 'static>() -> Self {
        TypeKey {
            id: TypeId::of::<T>(),
            name: short_type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Value(FieldType),
    /// A single business object, persisted as its id.
    Reference { target: TypeKey, nullable: bool },
    /// A set of business objects, persisted as a set of ids.
    ReferenceSet { target: TypeKey, nullable: bool },
    /// Declared through an unresolved type parameter. Skipped by the mapper;
    /// a concretely typed property of the same name is expected next to it.
    TypeParameter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadWrite,
    ReadOnly,
    /// Never read from or written to the other side.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: &'static str,
    pub ty: PropertyType,
    pub access: Access,
}

impl Property {
    pub fn value(name: &'static str, ty: FieldType) -> Self {
        Property {
            name,
            ty: PropertyType::Value(ty),
            access: Access::ReadWrite,
        }
    }

    pub fn required(name: &'static str, kind: ValueKind) -> Self {
        Self::value(name, FieldType::required(kind))
    }

    pub fn optional(name: &'static str, kind: ValueKind) -> Self {
        Self::value(name, FieldType::optional(kind))
    }

    pub fn reference<T: BusinessObject>(name: &'static str, nullable: bool) -> Self {
        Property {
            name,
            ty: PropertyType::Reference {
                target: TypeKey::of::<T>(),
                nullable,
            },
            access: Access::ReadWrite,
        }
    }

    pub fn reference_set<T: BusinessObject>(name: &'static str, nullable: bool) -> Self {
        Property {
            name,
            ty: PropertyType::ReferenceSet {
                target: TypeKey::of::<T>(),
                nullable,
            },
            access: Access::ReadWrite,
        }
    }

    pub fn type_parameter(name: &'static str) -> Self {
        Property {
            name,
            ty: PropertyType::TypeParameter,
            access: Access::ReadWrite,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.access = Access::ReadOnly;
        self
    }

    pub fn ignored(mut self) -> Self {
        self.access = Access::Ignored;
        self
    }

    pub fn is_mapped(&self) -> bool {
        self.access != Access::Ignored && self.ty != PropertyType::TypeParameter
    }

    pub fn is_writable(&self) -> bool {
        self.access == Access::ReadWrite
    }
}

/// What a business object hands out for one of its properties.
/// References are reported by id only.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Value(Value),
    Reference(Option<String>),
    References(Option<BTreeSet<String>>),
}

impl Slot {
    pub fn value(value: impl Into<Value>) -> Self {
        Slot::Value(value.into())
    }

    pub fn reference<T: BusinessObject>(target: Option<&T>) -> Self {
        Slot::Reference(target.map(|bo| bo.id().to_string()))
    }

    pub fn references<'a, T, I>(targets: Option<I>) -> Self
    where
        T: BusinessObject + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        Slot::References(
            targets.map(|bos| bos.into_iter().map(|bo| bo.id().to_string()).collect()),
        )
    }
}

pub type ErasedBo = Box<dyn AnyBusinessObject>;

/// What the mapper hands to a business object for one of its properties.
/// References arrive already resolved.
#[derive(Debug)]
pub enum Hydrated {
    Value(Value),
    Reference(Option<ErasedBo>),
    References(Option<Vec<ErasedBo>>),
}

impl Hydrated {
    pub fn value<T: FromValue>(self, site: &Site) -> MappingResult<T> {
        match self {
            Hydrated::Value(value) => value.cast(site),
            _ => Err(site.mismatch()),
        }
    }

    pub fn reference<T: BusinessObject>(self, site: &Site) -> MappingResult<Option<T>> {
        match self {
            Hydrated::Reference(None) => Ok(None),
            Hydrated::Reference(Some(bo)) => downcast(bo, site).map(Some),
            _ => Err(site.mismatch()),
        }
    }

    pub fn references<T>(self, site: &Site) -> MappingResult<Option<HashSet<T>>>
    where
        T: BusinessObject + Eq + Hash,
    {
        match self {
            Hydrated::References(None) => Ok(None),
            Hydrated::References(Some(bos)) => bos
                .into_iter()
                .map(|bo| downcast(bo, site))
                .collect::<MappingResult<HashSet<T>>>()
                .map(Some),
            _ => Err(site.mismatch()),
        }
    }
}

fn downcast<T: BusinessObject>(bo: ErasedBo, site: &Site) -> MappingResult<T> {
    bo.into_any()
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| site.mismatch())
}

/// In-memory domain object mirroring an entity.
///
/// `properties` lists everything the object exposes, including what it
/// inherits from shared event state. `read` and `write` are only called
/// with names from that list.
pub trait BusinessObject: Clone + fmt::Debug + Default + Send + 'static {
    fn id(&self) -> &str;

    fn properties() -> Vec<Property>;

    fn read(&self, property: &str) -> Option<Slot>;

    fn write(&mut self, property: &str, value: Hydrated) -> MappingResult<()>;
}

/// Object-safe view of any business object, used to move resolved
/// references through the mapper registry.
pub trait AnyBusinessObject: fmt::Debug + Send {
    fn bo_id(&self) -> &str;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: BusinessObject> AnyBusinessObject for T {
    fn bo_id(&self) -> &str {
        self.id()
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
