use std::collections::HashSet;
use std::fmt;

use crate::entity::{identified_by_id, random_id};
use crate::mapping::{BusinessObject, Hydrated, MappingResult, Property, Site, Slot, ValueKind};
use crate::model::TagBo;
use crate::model::event::EventParent;

/// The fields an event may inherit. `None` means "not known at this level
/// and not known further up either".
pub trait EventLike {
    fn title(&self) -> Option<&str>;

    fn comment(&self) -> Option<&str>;

    fn tags(&self) -> Option<&HashSet<TagBo>>;

    fn public_event(&self) -> Option<bool>;
}

/// Template for events. Root of every inheritance chain: all its values are
/// concrete.
#[derive(Debug, Clone)]
pub struct EventTypeBo {
    pub id: String,
    pub title: String,
    pub comment: String,
    pub tags: HashSet<TagBo>,
    pub public_event: bool,
}

identified_by_id!(EventTypeBo);

impl Default for EventTypeBo {
    fn default() -> Self {
        EventTypeBo {
            id: random_id(),
            title: String::new(),
            comment: String::new(),
            tags: HashSet::new(),
            public_event: false,
        }
    }
}

pub fn event_type_bo(init: impl FnOnce(&mut EventTypeBo)) -> EventTypeBo {
    let mut bo = EventTypeBo::default();
    init(&mut bo);
    bo
}

impl fmt::Display for EventTypeBo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

impl EventLike for EventTypeBo {
    fn title(&self) -> Option<&str> {
        Some(&self.title)
    }

    fn comment(&self) -> Option<&str> {
        Some(&self.comment)
    }

    fn tags(&self) -> Option<&HashSet<TagBo>> {
        Some(&self.tags)
    }

    fn public_event(&self) -> Option<bool> {
        Some(self.public_event)
    }
}

impl EventParent for EventTypeBo {}

impl BusinessObject for EventTypeBo {
    fn id(&self) -> &str {
        &self.id
    }

    fn properties() -> Vec<Property> {
        vec![
            Property::required("id", ValueKind::Text),
            Property::required("title", ValueKind::Text),
            Property::required("comment", ValueKind::Text),
            Property::reference_set::<TagBo>("tags", false),
            Property::required("publicEvent", ValueKind::Bool),
        ]
    }

    fn read(&self, property: &str) -> Option<Slot> {
        match property {
            "id" => Some(Slot::value(self.id.clone())),
            "title" => Some(Slot::value(self.title.clone())),
            "comment" => Some(Slot::value(self.comment.clone())),
            "tags" => Some(Slot::references(Some(&self.tags))),
            "publicEvent" => Some(Slot::value(self.public_event)),
            _ => None,
        }
    }

    fn write(&mut self, property: &str, value: Hydrated) -> MappingResult<()> {
        let site = Site::of::<Self>(property);
        match property {
            "id" => self.id = value.value(&site)?,
            "title" => self.title = value.value(&site)?,
            "comment" => self.comment = value.value(&site)?,
            "tags" => self.tags = value.references(&site)?.ok_or_else(|| site.mismatch())?,
            "publicEvent" => self.public_event = value.value(&site)?,
            _ => return Err(site.unknown()),
        }
        Ok(())
    }
}
