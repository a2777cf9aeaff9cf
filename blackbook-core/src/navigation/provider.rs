use std::collections::BTreeMap;
use std::sync::Arc;

use crate::navigation::View;

/// Resolves navigation states to views.
pub trait ViewProvider: Send + Sync {
    /// The longest registered view name that `state` starts with, or
    /// `None` when no view matches.
    fn view_name(&self, state: &str) -> Option<String>;

    fn get_view(&self, view_name: &str) -> Option<Box<dyn View>>;
}

type ViewFactory = Arc<dyn Fn() -> Box<dyn View> + Send + Sync>;

/// Views registered by name. Each navigation gets a fresh instance.
#[derive(Clone, Default)]
pub struct StaticViewProvider {
    factories: BTreeMap<String, ViewFactory>,
}

impl StaticViewProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<V, F>(mut self, view_name: impl Into<String>, factory: F) -> Self
    where
        V: View + 'static,
        F: Fn() -> V + Send + Sync + 'static,
    {
        self.factories.insert(
            view_name.into(),
            Arc::new(move || Box::new(factory()) as Box<dyn View>),
        );
        self
    }

    pub fn view_names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

/// `name` itself, or `name` followed by a parameter separator.
fn names_view(state: &str, name: &str) -> bool {
    match state.strip_prefix(name) {
        Some(rest) => rest.is_empty() || rest.starts_with(['&', '?', '/']),
        None => false,
    }
}

impl ViewProvider for StaticViewProvider {
    fn view_name(&self, state: &str) -> Option<String> {
        self.factories
            .keys()
            .filter(|name| names_view(state, name))
            .max_by_key(|name| name.len())
            .cloned()
    }

    fn get_view(&self, view_name: &str) -> Option<Box<dyn View>> {
        self.factories.get(view_name).map(|factory| factory())
    }
}

/// Answers every state with one view, for use as the fallback provider.
pub struct ErrorViewProvider {
    factory: ViewFactory,
}

impl ErrorViewProvider {
    pub fn new<V, F>(factory: F) -> Self
    where
        V: View + 'static,
        F: Fn() -> V + Send + Sync + 'static,
    {
        ErrorViewProvider {
            factory: Arc::new(move || Box::new(factory()) as Box<dyn View>),
        }
    }
}

impl ViewProvider for ErrorViewProvider {
    fn view_name(&self, state: &str) -> Option<String> {
        Some(state.to_string())
    }

    fn get_view(&self, _view_name: &str) -> Option<Box<dyn View>> {
        Some((self.factory)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{Redirects, ViewChangeEvent};

    struct Blank;

    impl View for Blank {
        fn enter(&mut self, _event: &ViewChangeEvent, _redirects: &mut Redirects) {}
    }

    fn provider() -> StaticViewProvider {
        StaticViewProvider::new()
            .register("cal", || Blank)
            .register("calendar", || Blank)
            .register("tags", || Blank)
    }

    #[test]
    fn test_longest_matching_name_wins() {
        let provider = provider();
        assert_eq!(provider.view_name("calendar&view=WEEK").as_deref(), Some("calendar"));
        assert_eq!(provider.view_name("cal?x=1").as_deref(), Some("cal"));
        assert_eq!(provider.view_name("calendar").as_deref(), Some("calendar"));
    }

    #[test]
    fn test_name_must_end_at_a_separator() {
        let provider = provider();
        assert_eq!(provider.view_name("tagsx"), None);
        assert_eq!(provider.view_name("calx").as_deref(), None);
        assert_eq!(provider.view_name("unknown"), None);
    }

    #[test]
    fn test_get_view() {
        let provider = provider();
        assert!(provider.get_view("tags").is_some());
        assert!(provider.get_view("languages").is_none());
    }
}
