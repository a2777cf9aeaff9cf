//! Nested, path based view navigation.
//!
//! A navigation path is a `/` separated list of navigation states, one
//! per nesting level: `/main/calendar&view=WEEK&date=1700000000000`
//! mounts `main` under the root and `calendar` inside `main`, handing
//! `view=WEEK&date=1700000000000` to the calendar as parameters. Paths
//! without a leading `/` are resolved relative to a view in the current
//! path, where `..` climbs one level.

mod navigator;
mod provider;
mod view;

use thiserror::Error;

pub use navigator::{
    MemoryStateManager, Navigation, NavigationStateManager, NestedNavigator, ViewChangeListener,
    ViewSnapshot,
};
pub use provider::{ErrorViewProvider, StaticViewProvider, ViewProvider};
pub use view::{Redirects, RootView, View, ViewChangeEvent, ViewDisplay};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Trying to navigate to an unknown state '{0}' and an error view provider not present")]
    UnknownState(String),

    #[error("did not find view '{0}' in the current path")]
    ViewNotInPath(String),

    #[error("'{parent}' is not a nested view and cannot show '{child}'")]
    NotNested { parent: String, child: String },

    #[error("{0}")]
    Unsupported(&'static str),

    #[error("navigation to '{0}' was vetoed")]
    Vetoed(String),

    #[error("gave up following redirects at '{0}'")]
    RedirectLoop(String),
}

pub type NavigationResult<T> = Result<T, NavigationError>;
