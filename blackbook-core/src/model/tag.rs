use std::fmt;

use crate::entity::{identified_by_id, random_id};
use crate::mapping::{BusinessObject, Hydrated, MappingResult, Property, Site, Slot, ValueKind};

#[derive(Debug, Clone)]
pub struct TagBo {
    pub id: String,
    pub display_name: String,
    pub tag: String,
}

identified_by_id!(TagBo);

impl Default for TagBo {
    fn default() -> Self {
        TagBo {
            id: random_id(),
            display_name: String::new(),
            tag: String::new(),
        }
    }
}

/// Build a tag in place, mostly for tests.
pub fn tag_bo(init: impl FnOnce(&mut TagBo)) -> TagBo {
    let mut bo = TagBo::default();
    init(&mut bo);
    bo
}

impl fmt::Display for TagBo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

impl BusinessObject for TagBo {
    fn id(&self) -> &str {
        &self.id
    }

    fn properties() -> Vec<Property> {
        vec![
            Property::required("id", ValueKind::Text),
            Property::required("displayName", ValueKind::Text),
            Property::required("tag", ValueKind::Text),
        ]
    }

    fn read(&self, property: &str) -> Option<Slot> {
        match property {
            "id" => Some(Slot::value(self.id.clone())),
            "displayName" => Some(Slot::value(self.display_name.clone())),
            "tag" => Some(Slot::value(self.tag.clone())),
            _ => None,
        }
    }

    fn write(&mut self, property: &str, value: Hydrated) -> MappingResult<()> {
        let site = Site::of::<Self>(property);
        match property {
            "id" => self.id = value.value(&site)?,
            "displayName" => self.display_name = value.value(&site)?,
            "tag" => self.tag = value.value(&site)?,
            _ => return Err(site.unknown()),
        }
        Ok(())
    }
}
