use std::collections::BTreeMap;

use serde_json::Value;

/// What a view is told when it is entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewChangeEvent {
    /// Name of the view that was mounted at this depth before, if any.
    pub old_view: Option<String>,
    pub view_name: String,
    /// Everything in the navigation state after the view name and its
    /// separator.
    pub parameters: String,
    /// Nesting depth of the entered view. The root sits at 0.
    pub depth: usize,
}

impl ViewChangeEvent {
    /// `a=1&b` becomes `{a: "1", b: ""}`.
    pub fn parameter_map(&self) -> BTreeMap<String, String> {
        self.parameters
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (pair.to_string(), String::new()),
            })
            .collect()
    }
}

/// Navigation requests a view makes while being entered. They run once
/// the current navigation has finished, relative to the requesting view.
#[derive(Debug, Default)]
pub struct Redirects {
    requested: Vec<String>,
}

impl Redirects {
    pub fn navigate_to(&mut self, path: impl Into<String>) {
        self.requested.push(path.into());
    }

    pub fn is_empty(&self) -> bool {
        self.requested.is_empty()
    }

    pub(crate) fn into_paths(self) -> Vec<String> {
        self.requested
    }
}

pub trait View: Send {
    fn enter(&mut self, event: &ViewChangeEvent, redirects: &mut Redirects);

    /// Whether this view can host a child view.
    fn is_nested(&self) -> bool {
        false
    }

    /// Mount the child view called `child`. Only called on nested views.
    fn show_view(&mut self, _child: &str) {}

    /// What the view currently shows, for clients rendering it.
    fn snapshot(&self) -> Value {
        Value::Null
    }
}

/// The outer display the root view mounts top level views into.
pub trait ViewDisplay: Send {
    fn show_view(&mut self, view_name: &str);
}

/// The sentinel at depth 0. Never a navigation target itself.
pub struct RootView {
    display: Box<dyn ViewDisplay>,
}

impl RootView {
    pub fn new(display: Box<dyn ViewDisplay>) -> Self {
        RootView { display }
    }
}

impl View for RootView {
    fn enter(&mut self, _event: &ViewChangeEvent, _redirects: &mut Redirects) {}

    fn is_nested(&self) -> bool {
        true
    }

    fn show_view(&mut self, child: &str) {
        self.display.show_view(child);
    }
}
