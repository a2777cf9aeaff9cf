//! Calendar event endpoints

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use blackbook_core::BlackbookError;
use blackbook_core::model::{EventLike, EventTypeBo, SingleEventBo, repeated_event_master_bo};
use blackbook_core::ui::CalendarController;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/repeated-events", post(create_repeated_event))
}

/// An event as clients see it, with inherited values filled in
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
    pub id: String,
    pub event_type_id: Option<String>,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub public_event: Option<bool>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl From<&SingleEventBo> for EventInfo {
    fn from(event: &SingleEventBo) -> Self {
        EventInfo {
            id: event.id.clone(),
            event_type_id: event.parent.as_ref().map(|parent| parent.id.clone()),
            title: event.title().map(str::to_string),
            comment: event.comment().map(str::to_string),
            public_event: event.public_event(),
            start: event.start(),
            end: event.end(),
        }
    }
}

#[derive(Deserialize)]
pub struct RangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

fn controller(state: &AppState) -> CalendarController {
    CalendarController::new(state.services.single_events.clone(), 0)
}

fn event_type(state: &AppState, id: Option<&str>) -> Result<Option<EventTypeBo>, AppError> {
    let Some(id) = id else {
        return Ok(None);
    };
    let event_type = state
        .services
        .event_types
        .find(id)?
        .ok_or_else(|| BlackbookError::not_found::<EventTypeBo>(id))?;
    Ok(Some(event_type))
}

/// GET /events?from=..&to=.. - Events dated within the range
async fn list_events(
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<EventInfo>>, AppError> {
    let events = controller(&state).events(range.from, range.to)?;
    Ok(Json(events.iter().map(EventInfo::from).collect()))
}

/// Request body for creating an event. Unset fields are inherited from
/// the event type.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub event_type_id: Option<String>,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub public_event: Option<bool>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl CreateEventRequest {
    fn apply_overrides(self, event: &mut SingleEventBo) {
        if let Some(title) = self.title {
            event.title.set(title);
        }
        if let Some(comment) = self.comment {
            event.comment.set(comment);
        }
        if let Some(public_event) = self.public_event {
            event.public_event.set(public_event);
        }
    }
}

/// POST /events - Create a single event
async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<EventInfo>, AppError> {
    let parent = event_type(&state, req.event_type_id.as_deref())?;
    let controller = controller(&state);
    let mut event = controller.new_event(parent, req.start, req.end)?;
    req.apply_overrides(&mut event);

    let saved = controller.save(&event)?;
    Ok(Json(EventInfo::from(&saved)))
}

/// Request body for a recurring event: `event` repeated every
/// `every_days` days until `end_date`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRepeatedEventRequest {
    #[serde(flatten)]
    pub event: CreateEventRequest,
    pub every_days: Option<u32>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatedEventInfo {
    pub id: String,
    pub instances: Vec<NaiveDate>,
}

/// POST /repeated-events - Create a recurring event and its instances
async fn create_repeated_event(
    State(state): State<AppState>,
    Json(req): Json<CreateRepeatedEventRequest>,
) -> Result<Json<RepeatedEventInfo>, AppError> {
    let parent = event_type(&state, req.event.event_type_id.as_deref())?;
    let mut event = controller(&state).new_event(parent, req.event.start, req.event.end)?;
    req.event.apply_overrides(&mut event);

    let mut master = repeated_event_master_bo(|m| {
        m.event = event;
        m.end_date = req.end_date;
    });
    if let Some(every) = req.every_days {
        master.daily(every)?;
    }
    let saved = state.services.repeated_event_masters.save(&master)?;

    let mut instances: Vec<NaiveDate> = state
        .services
        .repeated_events
        .find_all()?
        .into_iter()
        .filter(|instance| instance.parent.as_ref().map(|p| p.event.id.as_str()) == Some(saved.event.id.as_str()))
        .filter_map(|instance| instance.date)
        .collect();
    instances.sort();

    Ok(Json(RepeatedEventInfo {
        id: saved.event.id,
        instances,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::app;
    use crate::routes::test_support::{send, state};

    #[tokio::test]
    async fn test_events_inherit_from_event_type() {
        let state = state();
        let (_, event_type) = send(
            app(state.clone()),
            "POST",
            "/event-types",
            Some(json!({ "title": "Training", "comment": "Bring shoes" })),
        )
        .await;

        let (status, event) = send(
            app(state.clone()),
            "POST",
            "/events",
            Some(json!({
                "eventTypeId": event_type["id"],
                "comment": "Indoor",
                "start": "2024-03-20T18:00:00",
                "end": "2024-03-20T19:30:00",
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(event["title"], "Training");
        assert_eq!(event["comment"], "Indoor");
        assert_eq!(event["end"], "2024-03-20T19:30:00");

        let (_, listed) = send(app(state.clone()), "GET", "/events?from=2024-03-18&to=2024-03-24", None).await;
        assert_eq!(listed.as_array().map(Vec::len), Some(1));

        let (_, outside) = send(app(state), "GET", "/events?from=2024-04-01&to=2024-04-30", None).await;
        assert_eq!(outside, json!([]));
    }

    #[tokio::test]
    async fn test_unknown_event_type_is_not_found() {
        let (status, _) = send(
            app(state()),
            "POST",
            "/events",
            Some(json!({
                "eventTypeId": "missing",
                "start": "2024-03-20T18:00:00",
                "end": "2024-03-20T19:00:00",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_repeated_event_expands_daily() {
        let (status, body) = send(
            app(state()),
            "POST",
            "/repeated-events",
            Some(json!({
                "title": "Standup",
                "start": "2024-01-01T09:00:00",
                "end": "2024-01-01T09:15:00",
                "everyDays": 3,
                "endDate": "2024-01-10",
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["instances"], json!(["2024-01-01", "2024-01-04", "2024-01-07", "2024-01-10"]));
    }

    #[tokio::test]
    async fn test_repeated_event_without_end_date_is_rejected() {
        let (status, body) = send(
            app(state()),
            "POST",
            "/repeated-events",
            Some(json!({
                "title": "Standup",
                "start": "2024-01-01T09:00:00",
                "end": "2024-01-01T09:15:00",
                "everyDays": 1,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("end date"));
    }
}
