//! Login sessions, each with its own navigator

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use blackbook_core::BlackbookError;
use blackbook_core::navigation::ViewSnapshot;
use blackbook_core::ui::Session;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(login))
        .route("/sessions/{id}", get(show_session).delete(logout))
        .route("/sessions/{id}/navigate", post(navigate))
}

/// Where a session is and what it shows
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: String,
    pub username: Option<String>,
    pub path: String,
    pub navigation_states: Vec<String>,
    pub views: Vec<ViewSnapshot>,
}

impl From<&Session> for SessionInfo {
    fn from(session: &Session) -> Self {
        SessionInfo {
            id: session.id().to_string(),
            username: session.user().map(|user| user.username.clone()),
            path: session.location(),
            navigation_states: session.navigator().current_navigation_states()[1..].to_vec(),
            views: session.snapshot(),
        }
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /sessions - Log in and open the default view
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionInfo>, AppError> {
    let mut session = Session::open(state.views.clone())?;
    state.login.login(&mut session, &req.username, &req.password)?;

    let info = SessionInfo::from(&session);
    state.sessions()?.insert(session.id().to_string(), session);
    Ok(Json(info))
}

/// GET /sessions/:id - Current path and views of a session
async fn show_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionInfo>, AppError> {
    let sessions = state.sessions()?;
    let session = sessions
        .get(&id)
        .ok_or_else(|| BlackbookError::not_found::<Session>(&id))?;
    Ok(Json(SessionInfo::from(session)))
}

/// DELETE /sessions/:id - Log out and forget the session
async fn logout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut session = state
        .sessions()?
        .remove(&id)
        .ok_or_else(|| BlackbookError::not_found::<Session>(&id))?;
    let username = session.user().map(|user| user.username.clone());
    session.logout()?;

    info!(session = %id, username = ?username, "logged out");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateRequest {
    pub path: String,
    pub relative_to: Option<String>,
}

/// POST /sessions/:id/navigate - Navigate a session, absolutely or
/// relative to a mounted view
async fn navigate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NavigateRequest>,
) -> Result<Json<SessionInfo>, AppError> {
    let mut sessions = state.sessions()?;
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| BlackbookError::not_found::<Session>(&id))?;

    debug!(session = %id, path = %req.path, relative_to = ?req.relative_to, "navigating");
    session.navigate(&req.path, req.relative_to.as_deref())?;
    Ok(Json(SessionInfo::from(&*session)))
}
