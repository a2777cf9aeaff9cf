use std::fmt;

use crate::entity::{identified_by_id, random_id};
use crate::mapping::{BusinessObject, Hydrated, MappingResult, Property, Site, Slot, ValueKind};

#[derive(Debug, Clone)]
pub struct LanguageBo {
    pub id: String,
    pub name: String,
    pub iso_code: String,
}

identified_by_id!(LanguageBo);

impl Default for LanguageBo {
    fn default() -> Self {
        LanguageBo {
            id: random_id(),
            name: String::new(),
            iso_code: String::new(),
        }
    }
}

pub fn language_bo(init: impl FnOnce(&mut LanguageBo)) -> LanguageBo {
    let mut bo = LanguageBo::default();
    init(&mut bo);
    bo
}

impl fmt::Display for LanguageBo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.iso_code)
    }
}

impl BusinessObject for LanguageBo {
    fn id(&self) -> &str {
        &self.id
    }

    fn properties() -> Vec<Property> {
        vec![
            Property::required("id", ValueKind::Text),
            Property::required("name", ValueKind::Text),
            Property::required("isoCode", ValueKind::Text),
        ]
    }

    fn read(&self, property: &str) -> Option<Slot> {
        match property {
            "id" => Some(Slot::value(self.id.clone())),
            "name" => Some(Slot::value(self.name.clone())),
            "isoCode" => Some(Slot::value(self.iso_code.clone())),
            _ => None,
        }
    }

    fn write(&mut self, property: &str, value: Hydrated) -> MappingResult<()> {
        let site = Site::of::<Self>(property);
        match property {
            "id" => self.id = value.value(&site)?,
            "name" => self.name = value.value(&site)?,
            "isoCode" => self.iso_code = value.value(&site)?,
            _ => return Err(site.unknown()),
        }
        Ok(())
    }
}
