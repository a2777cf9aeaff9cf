//! Persisted records.
//!
//! Entities carry no behavior beyond identity. Their property names are
//! the camelCase names they serialize under, which are also the names the
//! mapper pairs with business object properties.

mod event;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::mapping::{MappingResult, Property, Site, Value, ValueKind};

pub use event::{Dated, RepeatConfig, RepeatedEvent, RepeatedEventMaster, SingleEvent};

/// Fresh random identifier for new records and business objects.
pub fn random_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A persisted record, identified by `id`.
///
/// `Default` creates an empty record with a fresh id.
pub trait Entity:
    Clone + fmt::Debug + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
    fn id(&self) -> &str;

    fn fields() -> Vec<Property>;

    fn get(&self, field: &str) -> Option<Value>;

    fn set(&mut self, field: &str, value: Value) -> MappingResult<()>;
}

/// Equality and hashing by id alone.
macro_rules! identified_by_id {
    ($($ty:ty),* $(,)?) => {
        $(
            impl PartialEq for $ty {
                fn eq(&self, other: &Self) -> bool {
                    self.id == other.id
                }
            }

            impl Eq for $ty {}

            impl std::hash::Hash for $ty {
                fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                    self.id.hash(state);
                }
            }
        )*
    };
}

pub(crate) use identified_by_id;

identified_by_id!(Tag, Language, User, EventType);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub display_name: String,
    pub tag: String,
}

impl Default for Tag {
    fn default() -> Self {
        Tag {
            id: random_id(),
            display_name: String::new(),
            tag: String::new(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

impl Entity for Tag {
    fn id(&self) -> &str {
        &self.id
    }

    fn fields() -> Vec<Property> {
        vec![
            Property::required("id", ValueKind::Text),
            Property::required("displayName", ValueKind::Text),
            Property::required("tag", ValueKind::Text),
        ]
    }

    fn get(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.clone().into()),
            "displayName" => Some(self.display_name.clone().into()),
            "tag" => Some(self.tag.clone().into()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> MappingResult<()> {
        let site = Site::of::<Self>(field);
        match field {
            "id" => self.id = value.cast(&site)?,
            "displayName" => self.display_name = value.cast(&site)?,
            "tag" => self.tag = value.cast(&site)?,
            _ => return Err(site.unknown()),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub id: String,
    pub name: String,
    pub iso_code: String,
}

impl Default for Language {
    fn default() -> Self {
        Language {
            id: random_id(),
            name: String::new(),
            iso_code: String::new(),
        }
    }
}

impl Entity for Language {
    fn id(&self) -> &str {
        &self.id
    }

    fn fields() -> Vec<Property> {
        vec![
            Property::required("id", ValueKind::Text),
            Property::required("name", ValueKind::Text),
            Property::required("isoCode", ValueKind::Text),
        ]
    }

    fn get(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.clone().into()),
            "name" => Some(self.name.clone().into()),
            "isoCode" => Some(self.iso_code.clone().into()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> MappingResult<()> {
        let site = Site::of::<Self>(field);
        match field {
            "id" => self.id = value.cast(&site)?,
            "name" => self.name = value.cast(&site)?,
            "isoCode" => self.iso_code = value.cast(&site)?,
            _ => return Err(site.unknown()),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: String,
    pub hashed_password: String,
}

impl Default for User {
    fn default() -> Self {
        User {
            id: random_id(),
            username: String::new(),
            name: String::new(),
            hashed_password: String::new(),
        }
    }
}

impl Entity for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn fields() -> Vec<Property> {
        vec![
            Property::required("id", ValueKind::Text),
            Property::required("username", ValueKind::Text),
            Property::required("name", ValueKind::Text),
            Property::required("hashedPassword", ValueKind::Text),
        ]
    }

    fn get(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.clone().into()),
            "username" => Some(self.username.clone().into()),
            "name" => Some(self.name.clone().into()),
            "hashedPassword" => Some(self.hashed_password.clone().into()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> MappingResult<()> {
        let site = Site::of::<Self>(field);
        match field {
            "id" => self.id = value.cast(&site)?,
            "username" => self.username = value.cast(&site)?,
            "name" => self.name = value.cast(&site)?,
            "hashedPassword" => self.hashed_password = value.cast(&site)?,
            _ => return Err(site.unknown()),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventType {
    pub id: String,
    pub title: String,
    pub comment: String,
    pub tags: BTreeSet<String>,
    pub public_event: bool,
}

impl Default for EventType {
    fn default() -> Self {
        EventType {
            id: random_id(),
            title: String::new(),
            comment: String::new(),
            tags: BTreeSet::new(),
            public_event: true,
        }
    }
}

impl Entity for EventType {
    fn id(&self) -> &str {
        &self.id
    }

    fn fields() -> Vec<Property> {
        vec![
            Property::required("id", ValueKind::Text),
            Property::required("title", ValueKind::Text),
            Property::required("comment", ValueKind::Text),
            Property::required("tags", ValueKind::TextSet),
            Property::required("publicEvent", ValueKind::Bool),
        ]
    }

    fn get(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.clone().into()),
            "title" => Some(self.title.clone().into()),
            "comment" => Some(self.comment.clone().into()),
            "tags" => Some(self.tags.clone().into()),
            "publicEvent" => Some(self.public_event.into()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> MappingResult<()> {
        let site = Site::of::<Self>(field);
        match field {
            "id" => self.id = value.cast(&site)?,
            "title" => self.title = value.cast(&site)?,
            "comment" => self.comment = value.cast(&site)?,
            "tags" => self.tags = value.cast(&site)?,
            "publicEvent" => self.public_event = value.cast(&site)?,
            _ => return Err(site.unknown()),
        }
        Ok(())
    }
}
