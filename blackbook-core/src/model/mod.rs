//! Business objects: the in-memory shapes views and services work with.

mod event;
mod event_type;
mod language;
mod overrides;
mod tag;
mod user;

pub use event::{
    EventBo, EventParent, RepeatedEventInstanceBo, RepeatedEventMasterBo, SingleEventBo,
    repeated_event_instance_bo, repeated_event_master_bo, single_event_bo,
};
pub use event_type::{EventLike, EventTypeBo, event_type_bo};
pub use language::{LanguageBo, language_bo};
pub use overrides::{Override, resolve};
pub use tag::{TagBo, tag_bo};
pub use user::{UserBo, user_bo};
