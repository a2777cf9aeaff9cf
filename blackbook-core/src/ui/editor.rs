//! Generic list + form panel for master data.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::entity::Entity;
use crate::error::{BlackbookError, BlackbookResult};
use crate::mapping::{BusinessObject, BusinessService};
use crate::model::{EventTypeBo, LanguageBo, TagBo, UserBo};
use crate::navigation::{Redirects, View, ViewChangeEvent};

/// The operations an editor needs from a service.
pub trait CrudService<B>: Send + Sync {
    fn create(&self) -> B;

    fn find_all(&self) -> BlackbookResult<Vec<B>>;

    fn find(&self, id: &str) -> BlackbookResult<Option<B>>;

    fn save(&self, bo: &B) -> BlackbookResult<B>;

    fn delete(&self, bo: &B) -> BlackbookResult<()>;
}

impl<E: Entity, B: BusinessObject> CrudService<B> for BusinessService<E, B> {
    fn create(&self) -> B {
        self.create_bo()
    }

    fn find_all(&self) -> BlackbookResult<Vec<B>> {
        BusinessService::find_all(self)
    }

    fn find(&self, id: &str) -> BlackbookResult<Option<B>> {
        BusinessService::find(self, id)
    }

    fn save(&self, bo: &B) -> BlackbookResult<B> {
        BusinessService::save(self, bo)
    }

    fn delete(&self, bo: &B) -> BlackbookResult<()> {
        BusinessService::delete(self, bo)
    }
}

/// A form field bound to one property of `B`, edited as text.
pub struct FieldBinding<B> {
    pub label: &'static str,
    pub get: fn(&B) -> String,
    pub set: fn(&mut B, String) -> BlackbookResult<()>,
}

impl<B> Clone for FieldBinding<B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B> Copy for FieldBinding<B> {}

/// Receives what the editor wants shown. The editor never reads back
/// from it.
pub trait EditorDisplay<B>: Send {
    fn show_items(&mut self, items: &[B]);

    fn show_form(&mut self, fields: Vec<(&'static str, String)>);

    fn set_editor_enabled(&mut self, enabled: bool);
}

pub struct MasterDataEditor<B, D> {
    service: Arc<dyn CrudService<B>>,
    bindings: Vec<FieldBinding<B>>,
    display: D,
    items: Vec<B>,
    current: Option<B>,
}

impl<B: BusinessObject, D: EditorDisplay<B>> MasterDataEditor<B, D> {
    pub fn new(service: Arc<dyn CrudService<B>>, bindings: Vec<FieldBinding<B>>, display: D) -> Self {
        MasterDataEditor {
            service,
            bindings,
            display,
            items: Vec::new(),
            current: None,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn items(&self) -> &[B] {
        &self.items
    }

    pub fn current(&self) -> Option<&B> {
        self.current.as_ref()
    }

    pub fn editor_enabled(&self) -> bool {
        self.current.is_some()
    }

    pub fn load(&mut self) -> BlackbookResult<()> {
        self.items = self.service.find_all()?;
        self.display.show_items(&self.items);
        Ok(())
    }

    /// Start editing a fresh, unsaved object.
    pub fn add(&mut self) {
        self.edit_object(Some(self.service.create()));
    }

    /// Edit the loaded item with `id`, or clear the form for `None`.
    pub fn select(&mut self, id: Option<&str>) -> BlackbookResult<()> {
        let selected = match id {
            Some(id) => Some(
                self.items
                    .iter()
                    .find(|item| item.id() == id)
                    .cloned()
                    .ok_or_else(|| BlackbookError::not_found::<B>(id))?,
            ),
            None => None,
        };
        self.edit_object(selected);
        Ok(())
    }

    /// Change the field labelled `label` of the object being edited.
    pub fn edit(&mut self, label: &str, value: impl Into<String>) -> BlackbookResult<()> {
        let binding = self
            .bindings
            .iter()
            .find(|binding| binding.label == label)
            .copied()
            .ok_or_else(|| BlackbookError::Editor(format!("no field labelled '{label}'")))?;
        let current = self
            .current
            .as_mut()
            .ok_or_else(|| BlackbookError::Editor("nothing selected".into()))?;
        (binding.set)(current, value.into())?;
        self.show_current();
        Ok(())
    }

    /// Delete the selected object, if any, and reload. A refused delete
    /// keeps the selection.
    pub fn remove(&mut self) -> BlackbookResult<()> {
        if let Some(selected) = &self.current {
            self.service.delete(selected)?;
        }
        self.load()?;
        self.edit_object(None);
        Ok(())
    }

    pub fn save(&mut self) -> BlackbookResult<B> {
        let current = self
            .current
            .as_ref()
            .ok_or_else(|| BlackbookError::Editor("nothing to save".into()))?;
        let saved = self.service.save(current).inspect_err(|e| {
            warn!(id = current.id(), error = %e, "saving master data failed");
        })?;
        self.load()?;
        self.edit_object(None);
        Ok(saved)
    }

    fn edit_object(&mut self, bo: Option<B>) {
        self.current = bo;
        self.show_current();
        self.display.set_editor_enabled(self.current.is_some());
    }

    /// With nothing selected the form shows an empty object.
    fn show_current(&mut self) {
        let blank;
        let shown = match &self.current {
            Some(current) => current,
            None => {
                blank = self.service.create();
                &blank
            }
        };
        let fields = self
            .bindings
            .iter()
            .map(|binding| (binding.label, (binding.get)(shown)))
            .collect();
        self.display.show_form(fields);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: String,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
}

/// A display that keeps what it was told, for clients to render.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    pub items: Vec<ListItem>,
    pub form: Vec<FormField>,
    pub editor_enabled: bool,
}

impl<B: BusinessObject + fmt::Display> EditorDisplay<B> for Screen {
    fn show_items(&mut self, items: &[B]) {
        self.items = items
            .iter()
            .map(|item| ListItem {
                id: item.id().to_string(),
                caption: item.to_string(),
            })
            .collect();
    }

    fn show_form(&mut self, fields: Vec<(&'static str, String)>) {
        self.form = fields
            .into_iter()
            .map(|(label, value)| FormField { label, value })
            .collect();
    }

    fn set_editor_enabled(&mut self, enabled: bool) {
        self.editor_enabled = enabled;
    }
}

/// A master data screen mounted by the navigator.
pub struct MasterDataView<B> {
    editor: MasterDataEditor<B, Screen>,
}

impl<B: BusinessObject + fmt::Display> MasterDataView<B> {
    pub fn new(service: Arc<dyn CrudService<B>>, bindings: Vec<FieldBinding<B>>) -> Self {
        MasterDataView {
            editor: MasterDataEditor::new(service, bindings, Screen::default()),
        }
    }

    pub fn editor(&mut self) -> &mut MasterDataEditor<B, Screen> {
        &mut self.editor
    }
}

impl<B: BusinessObject + fmt::Display> View for MasterDataView<B> {
    fn enter(&mut self, event: &ViewChangeEvent, _redirects: &mut Redirects) {
        if let Err(e) = self.editor.load() {
            warn!(view = %event.view_name, error = %e, "could not load master data");
        }
        self.editor.edit_object(None);
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self.editor.display()).unwrap_or_default()
    }
}

fn parse_flag(value: &str) -> BlackbookResult<bool> {
    value
        .parse()
        .map_err(|_| BlackbookError::Editor(format!("'{value}' is neither true nor false")))
}

pub fn tag_fields() -> Vec<FieldBinding<TagBo>> {
    vec![
        FieldBinding {
            label: "Display name",
            get: |tag| tag.display_name.clone(),
            set: |tag, value| {
                tag.display_name = value;
                Ok(())
            },
        },
        FieldBinding {
            label: "Tag",
            get: |tag| tag.tag.clone(),
            set: |tag, value| {
                tag.tag = value;
                Ok(())
            },
        },
    ]
}

pub fn language_fields() -> Vec<FieldBinding<LanguageBo>> {
    vec![
        FieldBinding {
            label: "Name",
            get: |language| language.name.clone(),
            set: |language, value| {
                language.name = value;
                Ok(())
            },
        },
        FieldBinding {
            label: "ISO code",
            get: |language| language.iso_code.clone(),
            set: |language, value| {
                language.iso_code = value;
                Ok(())
            },
        },
    ]
}

pub fn event_type_fields() -> Vec<FieldBinding<EventTypeBo>> {
    vec![
        FieldBinding {
            label: "Title",
            get: |event_type| event_type.title.clone(),
            set: |event_type, value| {
                event_type.title = value;
                Ok(())
            },
        },
        FieldBinding {
            label: "Comment",
            get: |event_type| event_type.comment.clone(),
            set: |event_type, value| {
                event_type.comment = value;
                Ok(())
            },
        },
        FieldBinding {
            label: "Public",
            get: |event_type| event_type.public_event.to_string(),
            set: |event_type, value| {
                event_type.public_event = parse_flag(&value)?;
                Ok(())
            },
        },
    ]
}

pub fn user_fields() -> Vec<FieldBinding<UserBo>> {
    vec![
        FieldBinding {
            label: "Username",
            get: |user| user.username.clone(),
            set: |user, value| {
                user.username = value;
                Ok(())
            },
        },
        FieldBinding {
            label: "Name",
            get: |user| user.name.clone(),
            set: |user, value| {
                user.name = value;
                Ok(())
            },
        },
        FieldBinding {
            label: "Password",
            get: |user| user.password().to_string(),
            set: |user, value| user.set_password(&value),
        },
    ]
}
