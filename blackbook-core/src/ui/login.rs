use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::error::{BlackbookError, BlackbookResult};
use crate::model::UserBo;
use crate::navigation::{Redirects, View, ViewChangeEvent};
use crate::service::UserService;
use crate::ui::Session;

pub struct LoginController {
    users: Arc<UserService>,
    default_view: String,
}

impl LoginController {
    pub fn new(users: Arc<UserService>, default_view: impl Into<String>) -> Self {
        LoginController {
            users,
            default_view: default_view.into(),
        }
    }

    pub fn default_view(&self) -> &str {
        &self.default_view
    }

    /// The user with `username`, if `password` is theirs. Unknown users
    /// and wrong passwords fail alike.
    pub fn authenticate(&self, username: &str, password: &str) -> BlackbookResult<UserBo> {
        match self.users.find_by_username(username)? {
            Some(user) if user.matches(password) => Ok(user),
            _ => {
                warn!(username, "rejected login");
                Err(BlackbookError::Auth("wrong username or password".into()))
            }
        }
    }

    /// Sign `session` in and open the default view.
    pub fn login(&self, session: &mut Session, username: &str, password: &str) -> BlackbookResult<()> {
        let user = self.authenticate(username, password)?;
        session.sign_in(user);
        session.navigate_to(&self.default_view)?;
        info!(session = session.id(), location = %session.location(), "login complete");
        Ok(())
    }
}

/// The login form. Submitting it goes through [`LoginController::login`].
#[derive(Default)]
pub struct LoginView {
    reason: Option<String>,
}

impl View for LoginView {
    fn enter(&mut self, event: &ViewChangeEvent, _redirects: &mut Redirects) {
        self.reason = event.old_view.as_ref().map(|old| format!("signed out of {old}"));
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({
            "fields": ["username", "password"],
            "reason": self.reason,
        })
    }
}
