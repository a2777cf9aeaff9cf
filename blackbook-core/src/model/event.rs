//! Events and their inheritance chain.
//!
//! Every event has a parent it inherits title, comment, tags and
//! visibility from: a one-off event or a recurrence master inherits from
//! its event type, a recurrence instance inherits from its master (and so,
//! transitively, from the master's event type). A field that is
//! `Override::Inherited` locally resolves through the parent; setting a
//! field only ever touches the local slot.

use std::collections::HashSet;
use std::fmt;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::entity::{RepeatConfig, random_id};
use crate::error::{BlackbookError, BlackbookResult};
use crate::mapping::{BusinessObject, Hydrated, MappingResult, Property, Site, Slot, ValueKind};
use crate::model::{EventLike, EventTypeBo, Override, TagBo};

/// Something an event can inherit from. Only recurrence masters have
/// timing of their own to hand down.
pub trait EventParent: EventLike + BusinessObject {
    fn start_time(&self) -> Option<NaiveTime> {
        None
    }

    fn length(&self) -> Option<Duration> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct EventBo<P> {
    pub id: String,
    pub parent: Option<P>,
    pub title: Override<String>,
    pub comment: Override<String>,
    pub tags: Override<HashSet<TagBo>>,
    pub public_event: Override<bool>,
    pub date: Option<NaiveDate>,
    pub start_time: Override<NaiveTime>,
    pub length: Override<Duration>,
}

/// A one-off event.
pub type SingleEventBo = EventBo<EventTypeBo>;

/// One concrete occurrence of a recurring event.
pub type RepeatedEventInstanceBo = EventBo<RepeatedEventMasterBo>;

impl<P> PartialEq for EventBo<P> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<P> Eq for EventBo<P> {}

impl<P> std::hash::Hash for EventBo<P> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

fn now_to_the_minute() -> NaiveTime {
    let now = Local::now().time();
    NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(now)
}

impl<P> EventBo<P> {
    /// Starts today, now, with no length.
    fn with_own_timing() -> Self {
        EventBo {
            id: random_id(),
            parent: None,
            title: Override::Inherited,
            comment: Override::Inherited,
            tags: Override::Inherited,
            public_event: Override::Inherited,
            date: Some(Local::now().date_naive()),
            start_time: Override::Overridden(now_to_the_minute()),
            length: Override::Overridden(Duration::zero()),
        }
    }

    /// Starts today; time of day and length come from the parent.
    fn with_inherited_timing() -> Self {
        EventBo {
            start_time: Override::Inherited,
            length: Override::Inherited,
            ..Self::with_own_timing()
        }
    }
}

impl Default for SingleEventBo {
    fn default() -> Self {
        Self::with_own_timing()
    }
}

impl Default for RepeatedEventInstanceBo {
    fn default() -> Self {
        Self::with_inherited_timing()
    }
}

pub fn single_event_bo(init: impl FnOnce(&mut SingleEventBo)) -> SingleEventBo {
    let mut bo = SingleEventBo::default();
    init(&mut bo);
    bo
}

pub fn repeated_event_instance_bo(
    init: impl FnOnce(&mut RepeatedEventInstanceBo),
) -> RepeatedEventInstanceBo {
    let mut bo = RepeatedEventInstanceBo::default();
    init(&mut bo);
    bo
}

impl<P: EventParent> EventLike for EventBo<P> {
    fn title(&self) -> Option<&str> {
        self.title
            .or_parent(|| self.parent.as_ref().and_then(|p| p.title()))
    }

    fn comment(&self) -> Option<&str> {
        self.comment
            .or_parent(|| self.parent.as_ref().and_then(|p| p.comment()))
    }

    fn tags(&self) -> Option<&HashSet<TagBo>> {
        self.tags
            .or_parent(|| self.parent.as_ref().and_then(|p| p.tags()))
    }

    fn public_event(&self) -> Option<bool> {
        self.public_event
            .copied_or_parent(|| self.parent.as_ref().and_then(|p| p.public_event()))
    }
}

impl<P: EventParent> EventParent for EventBo<P>
where
    EventBo<P>: Default,
{
    fn start_time(&self) -> Option<NaiveTime> {
        self.start_time
            .copied_or_parent(|| self.parent.as_ref().and_then(|p| p.start_time()))
    }

    fn length(&self) -> Option<Duration> {
        self.length
            .copied_or_parent(|| self.parent.as_ref().and_then(|p| p.length()))
    }
}

impl<P: EventParent> EventBo<P>
where
    EventBo<P>: Default,
{
    /// `date` at the effective start time.
    pub fn start(&self) -> Option<NaiveDateTime> {
        Some(self.date?.and_time(EventParent::start_time(self)?))
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        Some(self.start()? + EventParent::length(self)?)
    }

    /// Splits `start` into date and a local start time.
    pub fn set_start(&mut self, start: NaiveDateTime) {
        self.date = Some(start.date());
        self.start_time.set(start.time());
    }

    /// Keeps the start and stores the distance to `end` as the local length.
    pub fn set_end(&mut self, end: NaiveDateTime) -> BlackbookResult<()> {
        let start = self.start().ok_or_else(|| {
            BlackbookError::InvalidEvent(format!("event {} has no start to end from", self.id))
        })?;
        self.length.set(end - start);
        Ok(())
    }
}

fn event_properties<P: BusinessObject>() -> Vec<Property> {
    vec![
        Property::required("id", ValueKind::Text),
        Property::reference::<P>("parent", true),
        Property::optional("title", ValueKind::Text),
        Property::optional("comment", ValueKind::Text),
        Property::reference_set::<TagBo>("tags", true),
        Property::optional("publicEvent", ValueKind::Bool),
        Property::optional("date", ValueKind::Date),
        Property::optional("startTime", ValueKind::Time),
        Property::optional("length", ValueKind::Duration),
        Property::optional("start", ValueKind::DateTime).ignored(),
        Property::optional("end", ValueKind::DateTime).ignored(),
    ]
}

impl<P: EventParent> BusinessObject for EventBo<P>
where
    EventBo<P>: Default,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn properties() -> Vec<Property> {
        event_properties::<P>()
    }

    /// Override slots are read locally: an inherited field stays null on
    /// the record instead of freezing the parent's current value.
    fn read(&self, property: &str) -> Option<Slot> {
        match property {
            "id" => Some(Slot::value(self.id.clone())),
            "parent" => Some(Slot::reference(self.parent.as_ref())),
            "title" => Some(Slot::value(self.title.local().cloned())),
            "comment" => Some(Slot::value(self.comment.local().cloned())),
            "tags" => Some(Slot::references(self.tags.local())),
            "publicEvent" => Some(Slot::value(self.public_event.local().copied())),
            "date" => Some(Slot::value(self.date)),
            "startTime" => Some(Slot::value(self.start_time.local().copied())),
            "length" => Some(Slot::value(self.length.local().copied())),
            _ => None,
        }
    }

    fn write(&mut self, property: &str, value: Hydrated) -> MappingResult<()> {
        let site = Site::of::<Self>(property);
        match property {
            "id" => self.id = value.value(&site)?,
            "parent" => self.parent = value.reference(&site)?,
            "title" => self.title = value.value::<Option<String>>(&site)?.into(),
            "comment" => self.comment = value.value::<Option<String>>(&site)?.into(),
            "tags" => self.tags = value.references(&site)?.into(),
            "publicEvent" => self.public_event = value.value::<Option<bool>>(&site)?.into(),
            "date" => self.date = value.value(&site)?,
            "startTime" => self.start_time = value.value::<Option<NaiveTime>>(&site)?.into(),
            "length" => self.length = value.value::<Option<Duration>>(&site)?.into(),
            _ => return Err(site.unknown()),
        }
        Ok(())
    }
}

/// The template of a recurring event. Saving it materializes its instances.
#[derive(Debug, Clone, Default)]
pub struct RepeatedEventMasterBo {
    pub event: SingleEventBo,
    pub repeat_config: RepeatConfig,
    /// Last day an instance may fall on.
    pub end_date: Option<NaiveDate>,
}

impl PartialEq for RepeatedEventMasterBo {
    fn eq(&self, other: &Self) -> bool {
        self.event.id == other.event.id
    }
}

impl Eq for RepeatedEventMasterBo {}

impl std::hash::Hash for RepeatedEventMasterBo {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.event.id.hash(state);
    }
}

pub fn repeated_event_master_bo(
    init: impl FnOnce(&mut RepeatedEventMasterBo),
) -> RepeatedEventMasterBo {
    let mut bo = RepeatedEventMasterBo::default();
    init(&mut bo);
    bo
}

impl RepeatedEventMasterBo {
    /// Repeat every `every` days. Zero is rejected.
    pub fn daily(&mut self, every: u32) -> BlackbookResult<()> {
        self.repeat_config = RepeatConfig::daily(every).ok_or_else(|| {
            BlackbookError::InvalidEvent("daily repetition needs a positive interval".into())
        })?;
        Ok(())
    }
}

impl fmt::Display for RepeatedEventMasterBo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title().unwrap_or_default())
    }
}

impl EventLike for RepeatedEventMasterBo {
    fn title(&self) -> Option<&str> {
        self.event.title()
    }

    fn comment(&self) -> Option<&str> {
        self.event.comment()
    }

    fn tags(&self) -> Option<&HashSet<TagBo>> {
        self.event.tags()
    }

    fn public_event(&self) -> Option<bool> {
        self.event.public_event()
    }
}

impl EventParent for RepeatedEventMasterBo {
    fn start_time(&self) -> Option<NaiveTime> {
        EventParent::start_time(&self.event)
    }

    fn length(&self) -> Option<Duration> {
        EventParent::length(&self.event)
    }
}

impl BusinessObject for RepeatedEventMasterBo {
    fn id(&self) -> &str {
        &self.event.id
    }

    fn properties() -> Vec<Property> {
        let mut properties = event_properties::<EventTypeBo>();
        properties.push(Property::required("repeatConfig", ValueKind::Repeat));
        properties.push(Property::optional("endDate", ValueKind::Date));
        properties
    }

    fn read(&self, property: &str) -> Option<Slot> {
        match property {
            "repeatConfig" => Some(Slot::value(self.repeat_config.clone())),
            "endDate" => Some(Slot::value(self.end_date)),
            _ => self.event.read(property),
        }
    }

    fn write(&mut self, property: &str, value: Hydrated) -> MappingResult<()> {
        let site = Site::of::<Self>(property);
        match property {
            "repeatConfig" => self.repeat_config = value.value(&site)?,
            "endDate" => self.end_date = value.value(&site)?,
            _ => self.event.write(property, value)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{event_type_bo, tag_bo};

    fn event_type() -> EventTypeBo {
        event_type_bo(|t| {
            t.title = "eventTypeTitle".into();
            t.comment = "eventTypeComment".into();
            t.tags = HashSet::from([tag_bo(|tag| tag.display_name = "eventTypeTag".into())]);
            t.public_event = true;
        })
    }

    #[test]
    fn test_single_event_inherits_from_event_type() {
        let event = single_event_bo(|e| e.parent = Some(event_type()));

        assert_eq!(event.title(), Some("eventTypeTitle"));
        assert_eq!(event.comment(), Some("eventTypeComment"));
        assert_eq!(event.public_event(), Some(true));
        assert_eq!(event.tags(), event.parent.as_ref().map(|p| &p.tags));
    }

    #[test]
    fn test_single_event_overrides_win() {
        let tags = HashSet::from([tag_bo(|t| t.display_name = "own".into())]);
        let mut event = single_event_bo(|e| e.parent = Some(event_type()));
        event.title.set("own title");
        event.comment.set("own comment");
        event.tags.set(tags.clone());
        event.public_event.set(false);

        assert_eq!(event.title(), Some("own title"));
        assert_eq!(event.comment(), Some("own comment"));
        assert_eq!(event.tags(), Some(&tags));
        assert_eq!(event.public_event(), Some(false));
        assert_eq!(event.parent.as_ref().unwrap().title, "eventTypeTitle");
    }

    #[test]
    fn test_event_without_parent_has_no_inherited_values() {
        let event = SingleEventBo::default();
        assert_eq!(event.title(), None);
        assert_eq!(event.public_event(), None);
    }

    #[test]
    fn test_instance_takes_everything_from_event_type_through_master() {
        let instance = repeated_event_instance_bo(|i| {
            i.parent = Some(repeated_event_master_bo(|m| m.event.parent = Some(event_type())));
        });

        assert_eq!(instance.title(), Some("eventTypeTitle"));
        assert_eq!(instance.comment(), Some("eventTypeComment"));
        assert_eq!(instance.public_event(), Some(true));
        assert_eq!(instance.tags().map(|t| t.len()), Some(1));
    }

    #[test]
    fn test_master_override_shadows_event_type_for_instance() {
        let mut instance = repeated_event_instance_bo(|i| {
            i.parent = Some(repeated_event_master_bo(|m| m.event.parent = Some(event_type())));
        });

        let master = instance.parent.as_mut().unwrap();
        master.event.title.set("masterTitle");
        master.event.public_event.set(false);

        assert_eq!(instance.title(), Some("masterTitle"));
        assert_eq!(instance.public_event(), Some(false));
        assert_eq!(instance.comment(), Some("eventTypeComment"));

        let event_type = instance.parent.as_ref().unwrap().event.parent.as_ref().unwrap();
        assert_eq!(event_type.title, "eventTypeTitle");
    }

    #[test]
    fn test_instance_override_beats_master_and_event_type() {
        let instance = repeated_event_instance_bo(|i| {
            i.parent = Some(repeated_event_master_bo(|m| {
                m.event.parent = Some(event_type());
                m.event.title.set("masterTitle");
            }));
            i.title.set("eventTitle");
        });

        assert_eq!(instance.title(), Some("eventTitle"));
    }

    #[test]
    fn test_instance_timing_comes_from_master_unless_set() {
        let master_start = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        let mut instance = repeated_event_instance_bo(|i| {
            i.parent = Some(repeated_event_master_bo(|m| {
                m.event.start_time.set(master_start);
                m.event.length.set(Duration::hours(3));
            }));
        });

        assert_eq!(EventParent::start_time(&instance), Some(master_start));
        assert_eq!(EventParent::length(&instance), Some(Duration::hours(3)));

        let own_start = NaiveTime::from_hms_opt(12, 30, 0).unwrap();
        instance.start_time.set(own_start);
        instance.length.set(Duration::hours(1));

        assert_eq!(EventParent::start_time(&instance), Some(own_start));
        assert_eq!(EventParent::length(&instance), Some(Duration::hours(1)));
    }

    #[test]
    fn test_start_and_end_are_derived() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let mut event = single_event_bo(|e| {
            e.date = Some(date);
            e.start_time.set(NaiveTime::from_hms_opt(15, 0, 0).unwrap());
            e.length.set(Duration::minutes(90));
        });

        assert_eq!(event.start(), Some(date.and_hms_opt(15, 0, 0).unwrap()));
        assert_eq!(event.end(), Some(date.and_hms_opt(16, 30, 0).unwrap()));

        event.set_start(date.succ_opt().unwrap().and_hms_opt(8, 0, 0).unwrap());
        event.set_end(date.succ_opt().unwrap().and_hms_opt(10, 0, 0).unwrap()).unwrap();

        assert_eq!(event.date, date.succ_opt());
        assert_eq!(event.length.local(), Some(&Duration::hours(2)));
    }

    #[test]
    fn test_daily_rejects_zero_interval() {
        let mut master = RepeatedEventMasterBo::default();
        assert!(master.daily(0).is_err());
        assert_eq!(master.repeat_config, RepeatConfig::None);
    }
}
