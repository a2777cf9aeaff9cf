//! Master data endpoints: tags, languages, event types and users

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use blackbook_core::BlackbookError;
use blackbook_core::mapping::{BusinessObject, Mapper};
use blackbook_core::model::{EventTypeBo, LanguageBo, TagBo, UserBo};
use blackbook_core::ui::CrudService;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list::<TagBo>).post(save::<TagBo>))
        .route("/tags/{id}", delete(remove::<TagBo>))
        .route("/languages", get(list::<LanguageBo>).post(save::<LanguageBo>))
        .route("/languages/{id}", delete(remove::<LanguageBo>))
        .route("/event-types", get(list::<EventTypeBo>).post(save::<EventTypeBo>))
        .route("/event-types/{id}", delete(remove::<EventTypeBo>))
        .route("/users", get(list::<UserBo>).post(save::<UserBo>))
        .route("/users/{id}", delete(remove::<UserBo>))
}

/// A business object exposed as a JSON resource.
trait Resource: BusinessObject {
    type Body: Serialize + DeserializeOwned + Send + 'static;

    fn service(state: &AppState) -> Arc<dyn CrudService<Self>>;

    fn body_id(body: &Self::Body) -> Option<&str>;

    fn to_body(&self) -> Self::Body;

    fn apply(&mut self, body: Self::Body, state: &AppState) -> anyhow::Result<()>;
}

/// GET /{resource} - List everything
async fn list<R: Resource>(State(state): State<AppState>) -> Result<Json<Vec<R::Body>>, AppError> {
    let items = R::service(&state).find_all()?;
    Ok(Json(items.iter().map(R::to_body).collect()))
}

/// POST /{resource} - Create, or update when the body carries a known id
async fn save<R: Resource>(
    State(state): State<AppState>,
    Json(body): Json<R::Body>,
) -> Result<Json<R::Body>, AppError> {
    let service = R::service(&state);
    let mut bo = match R::body_id(&body) {
        Some(id) => service
            .find(id)?
            .ok_or_else(|| BlackbookError::not_found::<R>(id))?,
        None => service.create(),
    };
    bo.apply(body, &state)?;
    let saved = service.save(&bo)?;
    Ok(Json(saved.to_body()))
}

/// DELETE /{resource}/{id}
async fn remove<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let service = R::service(&state);
    let bo = service
        .find(&id)?
        .ok_or_else(|| BlackbookError::not_found::<R>(&id))?;
    service.delete(&bo)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagBody {
    pub id: Option<String>,
    pub display_name: String,
    pub tag: String,
}

impl Resource for TagBo {
    type Body = TagBody;

    fn service(state: &AppState) -> Arc<dyn CrudService<Self>> {
        state.services.tags.clone()
    }

    fn body_id(body: &TagBody) -> Option<&str> {
        body.id.as_deref()
    }

    fn to_body(&self) -> TagBody {
        TagBody {
            id: Some(self.id.clone()),
            display_name: self.display_name.clone(),
            tag: self.tag.clone(),
        }
    }

    fn apply(&mut self, body: TagBody, _state: &AppState) -> anyhow::Result<()> {
        self.display_name = body.display_name;
        self.tag = body.tag;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageBody {
    pub id: Option<String>,
    pub name: String,
    pub iso_code: String,
}

impl Resource for LanguageBo {
    type Body = LanguageBody;

    fn service(state: &AppState) -> Arc<dyn CrudService<Self>> {
        state.services.languages.clone()
    }

    fn body_id(body: &LanguageBody) -> Option<&str> {
        body.id.as_deref()
    }

    fn to_body(&self) -> LanguageBody {
        LanguageBody {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            iso_code: self.iso_code.clone(),
        }
    }

    fn apply(&mut self, body: LanguageBody, _state: &AppState) -> anyhow::Result<()> {
        self.name = body.name;
        self.iso_code = body.iso_code;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeBody {
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub tag_ids: BTreeSet<String>,
    #[serde(default)]
    pub public_event: bool,
}

impl Resource for EventTypeBo {
    type Body = EventTypeBody;

    fn service(state: &AppState) -> Arc<dyn CrudService<Self>> {
        state.services.event_types.clone()
    }

    fn body_id(body: &EventTypeBody) -> Option<&str> {
        body.id.as_deref()
    }

    fn to_body(&self) -> EventTypeBody {
        EventTypeBody {
            id: Some(self.id.clone()),
            title: self.title.clone(),
            comment: self.comment.clone(),
            tag_ids: self.tags.iter().map(|tag| tag.id.clone()).collect(),
            public_event: self.public_event,
        }
    }

    fn apply(&mut self, body: EventTypeBody, state: &AppState) -> anyhow::Result<()> {
        self.title = body.title;
        self.comment = body.comment;
        self.tags = state.services.tags.map_multiple(&body.tag_ids)?.into_iter().collect();
        self.public_event = body.public_event;
        Ok(())
    }
}

/// Users are written with a plaintext password and read without one.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    pub id: Option<String>,
    pub username: String,
    pub name: String,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

impl Resource for UserBo {
    type Body = UserBody;

    fn service(state: &AppState) -> Arc<dyn CrudService<Self>> {
        state.services.users.clone()
    }

    fn body_id(body: &UserBody) -> Option<&str> {
        body.id.as_deref()
    }

    fn to_body(&self) -> UserBody {
        UserBody {
            id: Some(self.id.clone()),
            username: self.username.clone(),
            name: self.name.clone(),
            password: None,
        }
    }

    fn apply(&mut self, body: UserBody, _state: &AppState) -> anyhow::Result<()> {
        self.username = body.username;
        self.name = body.name;
        if let Some(password) = body.password {
            self.set_password(&password)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::app;
    use crate::routes::test_support::{send, state};

    #[tokio::test]
    async fn test_tag_crud() {
        let state = state();

        let (status, created) = send(
            app(state.clone()),
            "POST",
            "/tags",
            Some(json!({ "displayName": "Music", "tag": "music" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = created["id"].as_str().unwrap().to_string();

        let (_, updated) = send(
            app(state.clone()),
            "POST",
            "/tags",
            Some(json!({ "id": id, "displayName": "Live music", "tag": "music" })),
        )
        .await;
        assert_eq!(updated["displayName"], "Live music");

        let (_, listed) = send(app(state.clone()), "GET", "/tags", None).await;
        assert_eq!(listed.as_array().map(Vec::len), Some(1));

        let (status, _) = send(app(state.clone()), "DELETE", &format!("/tags/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(app(state), "DELETE", &format!("/tags/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], format!("TagBo not found: {id}"));
    }

    #[tokio::test]
    async fn test_event_type_resolves_tags() {
        let state = state();
        let (_, tag) = send(
            app(state.clone()),
            "POST",
            "/tags",
            Some(json!({ "displayName": "Sport", "tag": "sport" })),
        )
        .await;

        let (status, event_type) = send(
            app(state.clone()),
            "POST",
            "/event-types",
            Some(json!({ "title": "Training", "tagIds": [tag["id"]], "publicEvent": true })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(event_type["tagIds"], json!([tag["id"]]));
        assert_eq!(event_type["publicEvent"], true);

        let (status, _) = send(
            app(state),
            "POST",
            "/event-types",
            Some(json!({ "title": "Broken", "tagIds": ["missing"] })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tag_used_by_event_type_is_kept() {
        let state = state();
        let (_, tag) = send(
            app(state.clone()),
            "POST",
            "/tags",
            Some(json!({ "displayName": "Sport", "tag": "sport" })),
        )
        .await;
        let (_, event_type) = send(
            app(state.clone()),
            "POST",
            "/event-types",
            Some(json!({ "title": "Training", "tagIds": [tag["id"]] })),
        )
        .await;

        let tag_uri = format!("/tags/{}", tag["id"].as_str().unwrap());
        let (status, body) = send(app(state.clone()), "DELETE", &tag_uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("still used"));

        let (status, types) = send(app(state.clone()), "GET", "/event-types", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(types.as_array().unwrap().len(), 1);

        let type_uri = format!("/event-types/{}", event_type["id"].as_str().unwrap());
        let (status, _) = send(app(state.clone()), "DELETE", &type_uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(app(state), "DELETE", &tag_uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_users_never_expose_passwords() {
        let state = state();

        let (status, user) = send(
            app(state.clone()),
            "POST",
            "/users",
            Some(json!({ "username": "jane", "name": "Jane", "password": "pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(user.get("password").is_none());

        let stored = state.services.users.find_by_username("jane").unwrap().unwrap();
        assert!(stored.matches("pw"));

        let (_, users) = send(app(state), "GET", "/users", None).await;
        let names: Vec<_> = users
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["username"].as_str().unwrap().to_string())
            .collect();
        assert!(names.contains(&"admin".to_string()));
        assert!(names.contains(&"jane".to_string()));
    }
}
