//! Domain services, one per entity/business object pair, and their wiring.

mod event;

use std::sync::Arc;

use crate::entity::{
    Entity, EventType, Language, RepeatedEvent, RepeatedEventMaster, SingleEvent, Tag, User,
};
use crate::error::BlackbookResult;
use crate::mapping::{BusinessService, MapperRegistry};
use crate::model::{
    EventTypeBo, LanguageBo, RepeatedEventInstanceBo, RepeatedEventMasterBo, TagBo, UserBo,
};
use crate::repository::{FieldReferrer, InMemoryRepository, Referrer, Repository};

pub use event::{RepeatedEventMasterService, SingleEventService};

pub type TagService = BusinessService<Tag, TagBo>;
pub type LanguageService = BusinessService<Language, LanguageBo>;
pub type UserService = BusinessService<User, UserBo>;
pub type EventTypeService = BusinessService<EventType, EventTypeBo>;
pub type RepeatedEventService = BusinessService<RepeatedEvent, RepeatedEventInstanceBo>;

impl UserService {
    pub fn find_by_username(&self, username: &str) -> BlackbookResult<Option<UserBo>> {
        Ok(self
            .find_all()?
            .into_iter()
            .find(|user| user.username == username))
    }
}

/// Every service, wired to its repositories and reference mappers.
#[derive(Clone)]
pub struct Services {
    pub tags: Arc<TagService>,
    pub languages: Arc<LanguageService>,
    pub users: Arc<UserService>,
    pub event_types: Arc<EventTypeService>,
    pub single_events: Arc<SingleEventService>,
    pub repeated_events: Arc<RepeatedEventService>,
    pub repeated_event_masters: Arc<RepeatedEventMasterService>,
}

/// `field` of the records in `rows`, as a guard against deleting what it names.
fn referrer<E: Entity>(rows: &Arc<InMemoryRepository<E>>, field: &'static str) -> Arc<dyn Referrer> {
    let rows: Arc<dyn Repository<E>> = rows.clone();
    Arc::new(FieldReferrer::new(rows, field))
}

impl Services {
    /// All services over fresh in-memory repositories.
    ///
    /// Tags, event types and recurring masters cannot be deleted while
    /// something still refers to them.
    pub fn in_memory() -> Self {
        let no_references = MapperRegistry::new;

        let tag_rows = Arc::new(InMemoryRepository::<Tag>::new());
        let event_type_rows = Arc::new(InMemoryRepository::<EventType>::new());
        let single_event_rows = Arc::new(InMemoryRepository::<SingleEvent>::new());
        let master_rows = Arc::new(InMemoryRepository::<RepeatedEventMaster>::new());
        let instance_rows = Arc::new(InMemoryRepository::<RepeatedEvent>::new());

        let tags = Arc::new(
            TagService::new(tag_rows, no_references())
                .referenced_by(referrer(&event_type_rows, "tags"))
                .referenced_by(referrer(&single_event_rows, "tags"))
                .referenced_by(referrer(&master_rows, "tags"))
                .referenced_by(referrer(&instance_rows, "tags")),
        );
        let languages = Arc::new(LanguageService::new(
            Arc::new(InMemoryRepository::<Language>::new()),
            no_references(),
        ));
        let users = Arc::new(UserService::new(
            Arc::new(InMemoryRepository::<User>::new()),
            no_references(),
        ));
        let event_types = Arc::new(
            EventTypeService::new(
                event_type_rows,
                no_references().with::<TagBo, _>(Arc::clone(&tags)),
            )
            .referenced_by(referrer(&single_event_rows, "parentId"))
            .referenced_by(referrer(&master_rows, "parentId")),
        );

        let event_references = no_references()
            .with::<TagBo, _>(Arc::clone(&tags))
            .with::<EventTypeBo, _>(Arc::clone(&event_types));

        let single_events = Arc::new(SingleEventService::new(
            single_event_rows,
            event_references.clone(),
        ));

        let masters = Arc::new(
            BusinessService::<RepeatedEventMaster, RepeatedEventMasterBo>::new(
                master_rows,
                event_references,
            )
            .referenced_by(referrer(&instance_rows, "parentId")),
        );
        let repeated_events = Arc::new(RepeatedEventService::new(
            instance_rows,
            no_references()
                .with::<TagBo, _>(Arc::clone(&tags))
                .with::<RepeatedEventMasterBo, _>(Arc::clone(&masters)),
        ));
        let repeated_event_masters = Arc::new(RepeatedEventMasterService::new(
            masters,
            Arc::clone(&repeated_events),
        ));

        Services {
            tags,
            languages,
            users,
            event_types,
            single_events,
            repeated_events,
            repeated_event_masters,
        }
    }
}
