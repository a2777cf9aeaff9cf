//! Headless views and their controllers.
//!
//! Views hold what a client would render and expose it through
//! [`View::snapshot`](crate::navigation::View::snapshot). Everything
//! they do goes through a controller or service handed in at creation.

mod calendar;
mod editor;
mod login;
mod main_view;
mod session;

use std::sync::Arc;

pub use calendar::{
    CALENDAR_VIEW, CalendarController, CalendarItem, CalendarScreen, CalendarView, CalendarViewMode,
    calendar_state,
};
pub use editor::{
    CrudService, EditorDisplay, FieldBinding, FormField, ListItem, MasterDataEditor, MasterDataView,
    Screen, event_type_fields, language_fields, tag_fields, user_fields,
};
pub use login::{LoginController, LoginView};
pub use main_view::{MENU, MainView, MenuEntry};
pub use session::Session;

use crate::config::AppConfig;
use crate::model::{EventTypeBo, LanguageBo, TagBo, UserBo};
use crate::navigation::StaticViewProvider;
use crate::service::Services;

pub const LOGIN_VIEW: &str = "login";
pub const MAIN_VIEW: &str = "main";
pub const TAGS_VIEW: &str = "tags";
pub const EVENT_TYPES_VIEW: &str = "eventTypes";
pub const LANGUAGES_VIEW: &str = "languages";
pub const USERS_VIEW: &str = "users";

/// Every view of the application, wired to `services`.
pub fn view_provider(services: &Services, config: &AppConfig) -> StaticViewProvider {
    let tags: Arc<dyn CrudService<TagBo>> = services.tags.clone();
    let languages: Arc<dyn CrudService<LanguageBo>> = services.languages.clone();
    let event_types: Arc<dyn CrudService<EventTypeBo>> = services.event_types.clone();
    let users: Arc<dyn CrudService<UserBo>> = services.users.clone();
    let events = services.single_events.clone();
    let lookback_days = config.calendar_lookback_days;

    StaticViewProvider::new()
        .register(LOGIN_VIEW, LoginView::default)
        .register(MAIN_VIEW, MainView::default)
        .register(CALENDAR_VIEW, move || {
            CalendarView::new(CalendarController::new(events.clone(), lookback_days))
        })
        .register(TAGS_VIEW, move || MasterDataView::new(tags.clone(), tag_fields()))
        .register(LANGUAGES_VIEW, move || {
            MasterDataView::new(languages.clone(), language_fields())
        })
        .register(EVENT_TYPES_VIEW, move || {
            MasterDataView::new(event_types.clone(), event_type_fields())
        })
        .register(USERS_VIEW, move || MasterDataView::new(users.clone(), user_fields()))
}
