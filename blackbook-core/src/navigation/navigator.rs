use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::navigation::{
    NavigationError, NavigationResult, Redirects, RootView, View, ViewChangeEvent, ViewDisplay,
    ViewProvider,
};

/// Redirects followed per navigation before giving up.
const MAX_REDIRECTS: usize = 8;

/// Keeps the externally visible location in sync, like a browser's URL
/// fragment.
pub trait NavigationStateManager: Send {
    fn state(&self) -> String;

    fn set_state(&mut self, state: &str);
}

#[derive(Debug, Default)]
pub struct MemoryStateManager {
    state: String,
}

impl NavigationStateManager for MemoryStateManager {
    fn state(&self) -> String {
        self.state.clone()
    }

    fn set_state(&mut self, state: &str) {
        self.state = state.to_string();
    }
}

pub trait ViewChangeListener: Send {
    /// Returning `false` cancels the whole navigation.
    fn before_view_change(&mut self, _event: &ViewChangeEvent) -> bool {
        true
    }

    fn after_view_change(&mut self, _event: &ViewChangeEvent) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Completed,
    Vetoed,
}

impl Navigation {
    /// Treat a veto of the navigation to `path` as an error.
    pub fn completed(self, path: &str) -> NavigationResult<()> {
        match self {
            Navigation::Completed => Ok(()),
            Navigation::Vetoed => Err(NavigationError::Vetoed(path.to_string())),
        }
    }
}

/// One mounted level of the current path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub view_name: String,
    pub navigation_state: String,
    pub content: serde_json::Value,
}

struct Mounted {
    view_name: String,
    view: Box<dyn View>,
}

enum Step {
    Keep,
    Mount {
        view: Box<dyn View>,
        event: ViewChangeEvent,
        state: String,
    },
}

/// Navigator for views nested inside each other.
///
/// `current_path[i]` is displayed inside `current_path[i - 1]` and was
/// reached through `current_navigation_states[i]`. Index 0 is the root.
pub struct NestedNavigator {
    current_path: Vec<Mounted>,
    current_navigation_states: Vec<String>,
    providers: Vec<Arc<dyn ViewProvider>>,
    error_provider: Option<Arc<dyn ViewProvider>>,
    listeners: Vec<Box<dyn ViewChangeListener>>,
    state_manager: Box<dyn NavigationStateManager>,
}

impl NestedNavigator {
    pub fn new(display: Box<dyn ViewDisplay>) -> Self {
        NestedNavigator {
            current_path: vec![Mounted {
                view_name: String::new(),
                view: Box::new(RootView::new(display)),
            }],
            current_navigation_states: vec![String::new()],
            providers: Vec::new(),
            error_provider: None,
            listeners: Vec::new(),
            state_manager: Box::new(MemoryStateManager::default()),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn ViewProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_error_provider(mut self, provider: Arc<dyn ViewProvider>) -> Self {
        self.error_provider = Some(provider);
        self
    }

    pub fn with_state_manager(mut self, state_manager: Box<dyn NavigationStateManager>) -> Self {
        self.state_manager = state_manager;
        self
    }

    pub fn add_listener(&mut self, listener: Box<dyn ViewChangeListener>) {
        self.listeners.push(listener);
    }

    /// Navigate relative to the root. Paths with a leading `/` are
    /// absolute anyway.
    pub fn navigate_to(&mut self, path: &str) -> NavigationResult<Navigation> {
        self.navigate_from(0, path, 0)
    }

    /// Navigate relative to the mounted view called `view_name`.
    pub fn navigate_relative(&mut self, view_name: &str, path: &str) -> NavigationResult<Navigation> {
        let depth = self.depth_of(view_name)?;
        self.navigate_from(depth, path, 0)
    }

    /// Navigate relative to the mounted view called `view_name`, with the
    /// path already split into navigation states.
    pub fn navigate_segments(
        &mut self,
        view_name: &str,
        segments: &[&str],
    ) -> NavigationResult<Navigation> {
        let depth = self.depth_of(view_name)?;
        let absolute = self.relative_to(depth, segments);
        self.navigate_absolute(absolute, 0)
    }

    /// Catch up with a location changed from outside, like a browser
    /// following an edited URL fragment. Does nothing when the state
    /// manager already agrees with the mounted path.
    pub fn follow_state(&mut self) -> NavigationResult<Navigation> {
        let state = self.state_manager.state();
        if state == self.location() {
            return Ok(Navigation::Completed);
        }
        debug!(state = %state, "following external state");
        self.navigate_from(0, &state, 0)
    }

    /// Single level navigation cannot say where in the nesting the view
    /// belongs.
    #[deprecated(note = "carries no nesting information; use navigate_to or navigate_relative")]
    pub fn navigate_to_view(
        &mut self,
        _view: Box<dyn View>,
        _view_name: &str,
        _parameters: &str,
    ) -> NavigationResult<Navigation> {
        Err(NavigationError::Unsupported(
            "single level navigation is not supported, navigate by path instead",
        ))
    }

    pub fn current_view_name(&self, depth: usize) -> Option<&str> {
        self.current_path
            .get(depth)
            .map(|mounted| mounted.view_name.as_str())
    }

    pub fn current_navigation_states(&self) -> &[String] {
        &self.current_navigation_states
    }

    /// Number of mounted views, the root included.
    pub fn depth(&self) -> usize {
        self.current_path.len()
    }

    /// The absolute path leading to the deepest mounted view.
    pub fn location(&self) -> String {
        format!("/{}", self.current_navigation_states[1..].join("/"))
    }

    /// Every mounted view below the root.
    pub fn snapshot(&self) -> Vec<ViewSnapshot> {
        self.current_path
            .iter()
            .zip(&self.current_navigation_states)
            .skip(1)
            .map(|(mounted, state)| ViewSnapshot {
                view_name: mounted.view_name.clone(),
                navigation_state: state.clone(),
                content: mounted.view.snapshot(),
            })
            .collect()
    }

    fn depth_of(&self, view_name: &str) -> NavigationResult<usize> {
        self.current_path
            .iter()
            .rposition(|mounted| mounted.view_name == view_name)
            .ok_or_else(|| NavigationError::ViewNotInPath(view_name.to_string()))
    }

    fn navigate_from(&mut self, depth: usize, path: &str, hops: usize) -> NavigationResult<Navigation> {
        let absolute = match path.strip_prefix('/') {
            Some(rest) => split(rest),
            None => {
                let segments: Vec<&str> = path.split('/').collect();
                self.relative_to(depth, &segments)
            }
        };
        self.navigate_absolute(absolute, hops)
    }

    /// Turn `segments`, relative to the view at `depth`, into an absolute
    /// list of navigation states. `..` at the root is dropped.
    fn relative_to(&self, depth: usize, segments: &[&str]) -> Vec<String> {
        match segments.split_first() {
            Some((&"..", rest)) => self.relative_to(depth.saturating_sub(1), rest),
            _ => self.current_navigation_states[1..=depth]
                .iter()
                .cloned()
                .chain(segments.iter().filter(|s| !s.is_empty()).map(|s| s.to_string()))
                .collect(),
        }
    }

    /// The provider with the longest matching view name, else the error
    /// provider.
    fn resolve(&self, state: &str) -> NavigationResult<(String, Arc<dyn ViewProvider>)> {
        self.providers
            .iter()
            .filter_map(|provider| provider.view_name(state).map(|name| (name, provider)))
            .max_by_key(|(name, _)| name.len())
            .map(|(name, provider)| (name, Arc::clone(provider)))
            .or_else(|| {
                let provider = self.error_provider.as_ref()?;
                provider
                    .view_name(state)
                    .map(|name| (name, Arc::clone(provider)))
            })
            .ok_or_else(|| NavigationError::UnknownState(state.to_string()))
    }

    /// Resolve every level first, so that a failure or a veto anywhere
    /// leaves the current path untouched.
    fn plan(&self, states: &[String]) -> NavigationResult<Vec<Step>> {
        let mut steps: Vec<Step> = Vec::with_capacity(states.len());
        let mut diverged = false;

        for (index, state) in states.iter().enumerate() {
            let depth = index + 1;
            let (view_name, provider) = self.resolve(state)?;

            let unchanged = !diverged
                && self.current_view_name(depth) == Some(view_name.as_str())
                && self.current_navigation_states.get(depth) == Some(state);
            if unchanged {
                steps.push(Step::Keep);
                continue;
            }

            let parent_is_nested = match steps.last() {
                Some(Step::Mount { view, .. }) => view.is_nested(),
                _ => self.current_path[depth - 1].view.is_nested(),
            };
            if !parent_is_nested {
                let parent = match steps.last() {
                    Some(Step::Mount { event, .. }) => event.view_name.clone(),
                    _ => self.current_path[depth - 1].view_name.clone(),
                };
                return Err(NavigationError::NotNested {
                    parent,
                    child: view_name,
                });
            }

            let view = provider
                .get_view(&view_name)
                .ok_or_else(|| NavigationError::UnknownState(state.clone()))?;
            let parameters = state
                .get(view_name.len() + 1..)
                .unwrap_or_default()
                .to_string();
            let old_view = if diverged {
                None
            } else {
                self.current_view_name(depth).map(str::to_string)
            };

            diverged = true;
            steps.push(Step::Mount {
                view,
                event: ViewChangeEvent {
                    old_view,
                    view_name,
                    parameters,
                    depth,
                },
                state: state.clone(),
            });
        }

        Ok(steps)
    }

    fn navigate_absolute(&mut self, states: Vec<String>, hops: usize) -> NavigationResult<Navigation> {
        let target = format!("/{}", states.join("/"));
        let steps = self.plan(&states)?;

        for step in &steps {
            if let Step::Mount { event, .. } = step {
                let allowed = self
                    .listeners
                    .iter_mut()
                    .all(|listener| listener.before_view_change(event));
                if !allowed {
                    info!(path = %target, view = %event.view_name, "navigation vetoed");
                    let location = self.location();
                    self.state_manager.set_state(&location);
                    return Ok(Navigation::Vetoed);
                }
            }
        }

        let mut redirects: Vec<(usize, String)> = Vec::new();
        for step in steps {
            let Step::Mount { view, event, state } = step else {
                continue;
            };
            let depth = event.depth;

            self.current_path.truncate(depth);
            self.current_navigation_states.truncate(depth);

            self.current_path[depth - 1].view.show_view(&event.view_name);
            self.current_path.push(Mounted {
                view_name: event.view_name.clone(),
                view,
            });
            self.current_navigation_states.push(state);
            let location = self.location();
            self.state_manager.set_state(&location);

            debug!(view = %event.view_name, depth, parameters = %event.parameters, "entering view");
            let mut requested = Redirects::default();
            self.current_path[depth].view.enter(&event, &mut requested);
            redirects.extend(requested.into_paths().into_iter().map(|path| (depth, path)));

            for listener in &mut self.listeners {
                listener.after_view_change(&event);
            }
        }

        for (depth, path) in redirects {
            if depth >= self.current_path.len() {
                debug!(path = %path, depth, "dropping redirect of a view no longer mounted");
                continue;
            }
            if hops >= MAX_REDIRECTS {
                return Err(NavigationError::RedirectLoop(path));
            }
            debug!(path = %path, depth, "following redirect");
            if self.navigate_from(depth, &path, hops + 1)? == Navigation::Vetoed {
                return Ok(Navigation::Vetoed);
            }
        }

        Ok(Navigation::Completed)
    }
}

fn split(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
