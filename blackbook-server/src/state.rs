use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use tracing::info;

use blackbook_core::config::AppConfig;
use blackbook_core::model::user_bo;
use blackbook_core::navigation::ViewProvider;
use blackbook_core::service::Services;
use blackbook_core::ui::{LoginController, Session, view_provider};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub views: Arc<dyn ViewProvider>,
    pub login: Arc<LoginController>,
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let services = Services::in_memory();
        if let Some(seed) = &config.seed_admin {
            if services.users.find_by_username(&seed.username)?.is_none() {
                let mut admin = user_bo(|u| {
                    u.username = seed.username.clone();
                    u.name = seed.name.clone();
                });
                admin.set_password(&seed.password)?;
                services.users.save(&admin)?;
                info!(username = %seed.username, "seeded admin user");
            }
        }

        Ok(AppState {
            views: Arc::new(view_provider(&services, config)),
            login: Arc::new(LoginController::new(
                services.users.clone(),
                config.default_view.clone(),
            )),
            services,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn sessions(&self) -> Result<MutexGuard<'_, HashMap<String, Session>>> {
        self.sessions
            .lock()
            .map_err(|_| anyhow!("session table lock poisoned"))
    }
}
