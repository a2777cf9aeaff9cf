use serde::Serialize;
use serde_json::json;

use crate::navigation::{Redirects, View, ViewChangeEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub view: &'static str,
    pub caption: &'static str,
}

pub const MENU: [MenuEntry; 5] = [
    MenuEntry {
        view: super::CALENDAR_VIEW,
        caption: "Calendar",
    },
    MenuEntry {
        view: super::EVENT_TYPES_VIEW,
        caption: "Event types",
    },
    MenuEntry {
        view: super::TAGS_VIEW,
        caption: "Tags",
    },
    MenuEntry {
        view: super::LANGUAGES_VIEW,
        caption: "Languages",
    },
    MenuEntry {
        view: super::USERS_VIEW,
        caption: "Users",
    },
];

/// The application frame: a menu and one child view next to it.
#[derive(Debug, Default)]
pub struct MainView {
    content: Option<String>,
}

impl MainView {
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

impl View for MainView {
    fn enter(&mut self, _event: &ViewChangeEvent, _redirects: &mut Redirects) {}

    fn is_nested(&self) -> bool {
        true
    }

    fn show_view(&mut self, child: &str) {
        self.content = Some(child.to_string());
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({
            "menu": MENU,
            "content": self.content,
        })
    }
}
