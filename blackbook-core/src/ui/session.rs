//! Per client session state: who is logged in and where they are.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::entity::random_id;
use crate::model::UserBo;
use crate::navigation::{
    NavigationResult, NestedNavigator, ViewChangeEvent, ViewChangeListener, ViewDisplay,
    ViewProvider, ViewSnapshot,
};
use crate::ui::LOGIN_VIEW;

/// Keeps anonymous sessions on the login view.
struct LoginGuard {
    authenticated: Arc<AtomicBool>,
}

impl ViewChangeListener for LoginGuard {
    fn before_view_change(&mut self, event: &ViewChangeEvent) -> bool {
        event.view_name == LOGIN_VIEW || self.authenticated.load(Ordering::Acquire)
    }
}

/// Top level display of a session without a client attached.
struct HeadlessDisplay {
    session_id: String,
}

impl ViewDisplay for HeadlessDisplay {
    fn show_view(&mut self, view_name: &str) {
        debug!(session = %self.session_id, view = view_name, "showing top level view");
    }
}

/// A user and their navigator. Passed explicitly to whatever needs it.
pub struct Session {
    id: String,
    user: Option<UserBo>,
    navigator: NestedNavigator,
    authenticated: Arc<AtomicBool>,
}

impl Session {
    /// A fresh anonymous session, showing the login view.
    pub fn open(provider: Arc<dyn ViewProvider>) -> NavigationResult<Self> {
        let id = random_id();
        let authenticated = Arc::new(AtomicBool::new(false));
        let mut navigator = NestedNavigator::new(Box::new(HeadlessDisplay {
            session_id: id.clone(),
        }))
        .with_provider(provider);
        navigator.add_listener(Box::new(LoginGuard {
            authenticated: authenticated.clone(),
        }));

        let mut session = Session {
            id,
            user: None,
            navigator,
            authenticated,
        };
        session.navigate_to(&login_path())?;
        Ok(session)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user(&self) -> Option<&UserBo> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::Acquire)
    }

    pub fn sign_in(&mut self, user: UserBo) {
        info!(session = %self.id, username = %user.username, "user signed in");
        self.user = Some(user);
        self.authenticated.store(true, Ordering::Release);
    }

    /// Forget the user and go back to the login view.
    pub fn logout(&mut self) -> NavigationResult<()> {
        if let Some(user) = self.user.take() {
            info!(session = %self.id, username = %user.username, "user signed out");
        }
        self.authenticated.store(false, Ordering::Release);
        self.navigate_to(&login_path())
    }

    /// Navigate to an absolute path, failing unless the navigation completes.
    pub fn navigate_to(&mut self, path: &str) -> NavigationResult<()> {
        self.navigator.navigate_to(path)?.completed(path)
    }

    /// Navigate relative to `view_name` when given, otherwise absolutely.
    pub fn navigate(&mut self, path: &str, relative_to: Option<&str>) -> NavigationResult<()> {
        match relative_to {
            Some(view_name) => self.navigator.navigate_relative(view_name, path)?.completed(path),
            None => self.navigate_to(path),
        }
    }

    pub fn navigator(&self) -> &NestedNavigator {
        &self.navigator
    }

    pub fn location(&self) -> String {
        self.navigator.location()
    }

    pub fn snapshot(&self) -> Vec<ViewSnapshot> {
        self.navigator.snapshot()
    }
}

fn login_path() -> String {
    format!("/{LOGIN_VIEW}")
}
