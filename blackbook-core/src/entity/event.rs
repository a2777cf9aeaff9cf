//! Event records: one-off events, recurrence masters and their instances.

use std::collections::BTreeSet;
use std::num::NonZeroU32;

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, identified_by_id, random_id};
use crate::mapping::{MappingResult, Property, Site, Value, ValueKind};

/// How a recurring event repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RepeatConfig {
    #[default]
    None,
    Daily { every: NonZeroU32 },
}

impl RepeatConfig {
    /// `None` when `every` is zero.
    pub fn daily(every: u32) -> Option<Self> {
        NonZeroU32::new(every).map(|every| RepeatConfig::Daily { every })
    }
}

/// Records that can be queried by date.
pub trait Dated {
    fn date(&self) -> Option<NaiveDate>;
}

/// The columns every event record shares. Override columns are null when
/// the event inherits the value from its parent.
macro_rules! event_record {
    ($(#[$meta:meta])* $name:ident { $($extra:ident : $extra_ty:ty = $extra_default:expr),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            pub id: String,
            pub parent_id: Option<String>,
            pub date: Option<NaiveDate>,
            pub start_time: Option<NaiveTime>,
            #[serde(default, with = "duration_secs")]
            pub length: Option<Duration>,
            pub title: Option<String>,
            pub comment: Option<String>,
            pub tags: Option<BTreeSet<String>>,
            pub public_event: Option<bool>,
            $(pub $extra: $extra_ty,)*
        }

        impl Default for $name {
            fn default() -> Self {
                $name {
                    id: random_id(),
                    parent_id: None,
                    date: None,
                    start_time: None,
                    length: None,
                    title: None,
                    comment: None,
                    tags: None,
                    public_event: None,
                    $($extra: $extra_default,)*
                }
            }
        }

        impl Dated for $name {
            fn date(&self) -> Option<NaiveDate> {
                self.date
            }
        }

        identified_by_id!($name);
    };
}

event_record!(
    /// A one-off event.
    SingleEvent {}
);

event_record!(
    /// The template of a recurring event.
    RepeatedEventMaster {
        repeat_config: RepeatConfig = RepeatConfig::None,
        end_date: Option<NaiveDate> = None,
    }
);

event_record!(
    /// One materialized occurrence of a recurring event; `parent_id` is the master.
    RepeatedEvent {}
);

fn event_fields() -> Vec<Property> {
    vec![
        Property::required("id", ValueKind::Text),
        Property::optional("parentId", ValueKind::Text),
        Property::optional("date", ValueKind::Date),
        Property::optional("startTime", ValueKind::Time),
        Property::optional("length", ValueKind::Duration),
        Property::optional("title", ValueKind::Text),
        Property::optional("comment", ValueKind::Text),
        Property::optional("tags", ValueKind::TextSet),
        Property::optional("publicEvent", ValueKind::Bool),
    ]
}

macro_rules! event_columns {
    ($record:expr, $field:expr) => {
        match $field {
            "id" => Some($record.id.clone().into()),
            "parentId" => Some($record.parent_id.clone().into()),
            "date" => Some($record.date.into()),
            "startTime" => Some($record.start_time.into()),
            "length" => Some($record.length.into()),
            "title" => Some($record.title.clone().into()),
            "comment" => Some($record.comment.clone().into()),
            "tags" => Some($record.tags.clone().into()),
            "publicEvent" => Some($record.public_event.into()),
            _ => None,
        }
    };
}

macro_rules! assign_event_column {
    ($record:expr, $field:expr, $value:expr, $site:expr) => {
        match $field {
            "id" => $record.id = $value.cast($site)?,
            "parentId" => $record.parent_id = $value.cast($site)?,
            "date" => $record.date = $value.cast($site)?,
            "startTime" => $record.start_time = $value.cast($site)?,
            "length" => $record.length = $value.cast($site)?,
            "title" => $record.title = $value.cast($site)?,
            "comment" => $record.comment = $value.cast($site)?,
            "tags" => $record.tags = $value.cast($site)?,
            "publicEvent" => $record.public_event = $value.cast($site)?,
            _ => return Err($site.unknown()),
        }
    };
}

impl Entity for SingleEvent {
    fn id(&self) -> &str {
        &self.id
    }

    fn fields() -> Vec<Property> {
        event_fields()
    }

    fn get(&self, field: &str) -> Option<Value> {
        event_columns!(self, field)
    }

    fn set(&mut self, field: &str, value: Value) -> MappingResult<()> {
        let site = Site::of::<Self>(field);
        assign_event_column!(self, field, value, &site);
        Ok(())
    }
}

impl Entity for RepeatedEvent {
    fn id(&self) -> &str {
        &self.id
    }

    fn fields() -> Vec<Property> {
        event_fields()
    }

    fn get(&self, field: &str) -> Option<Value> {
        event_columns!(self, field)
    }

    fn set(&mut self, field: &str, value: Value) -> MappingResult<()> {
        let site = Site::of::<Self>(field);
        assign_event_column!(self, field, value, &site);
        Ok(())
    }
}

impl Entity for RepeatedEventMaster {
    fn id(&self) -> &str {
        &self.id
    }

    fn fields() -> Vec<Property> {
        let mut fields = event_fields();
        fields.push(Property::required("repeatConfig", ValueKind::Repeat));
        fields.push(Property::optional("endDate", ValueKind::Date));
        fields
    }

    fn get(&self, field: &str) -> Option<Value> {
        match field {
            "repeatConfig" => Some(self.repeat_config.clone().into()),
            "endDate" => Some(self.end_date.into()),
            _ => event_columns!(self, field),
        }
    }

    fn set(&mut self, field: &str, value: Value) -> MappingResult<()> {
        let site = Site::of::<Self>(field);
        match field {
            "repeatConfig" => self.repeat_config = value.cast(&site)?,
            "endDate" => self.end_date = value.cast(&site)?,
            _ => assign_event_column!(self, field, value, &site),
        }
        Ok(())
    }
}

/// Event lengths are stored as whole seconds.
mod duration_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(length: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match length {
            Some(length) => serializer.serialize_some(&length.num_seconds()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        let seconds = Option::<i64>::deserialize(deserializer)?;
        Ok(seconds.map(Duration::seconds))
    }
}
