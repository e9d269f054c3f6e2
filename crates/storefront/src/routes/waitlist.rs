//! Waitlist route handlers.
//!
//! Two front doors share one submission path:
//! - `POST /api/waitlist` takes JSON from the marketing site and answers
//!   `{success, data}` or `{error}` with a status code.
//! - `POST /waitlist` takes the landing-page form and answers HTMX fragments
//!   that replace the form.
//!
//! Both record the attempt in the session window before touching the
//! database, and both drop the cached public figures on success.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, header::USER_AGENT},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use atmos_core::{Email, WaitlistStats, WaitlistSubmission};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::session::{save_waitlist_attempts, waitlist_attempts};
use crate::models::WaitlistEntry;
use crate::services::WaitlistError;
use crate::state::AppState;

const USER_AGENT_MAX_CHARS: usize = 500;

/// Success body for the JSON API.
#[derive(Debug, Serialize)]
pub struct WaitlistJoined {
    pub success: bool,
    pub data: WaitlistEntry,
}

/// Body for `GET /api/waitlist/count`.
#[derive(Debug, Serialize)]
pub struct WaitlistCountResponse {
    pub count: i64,
}

/// Body for `POST /api/waitlist/unsubscribe`.
#[derive(Debug, Deserialize)]
pub struct UnsubscribeRequest {
    pub email: String,
}

/// Success fragment template (replaces the form via HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "waitlist/success.html")]
pub struct WaitlistSuccessTemplate {
    pub name: String,
    pub count: Option<i64>,
}

/// Error fragment template (replaces the form via HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "waitlist/error.html")]
pub struct WaitlistErrorTemplate {
    pub message: String,
    pub name: String,
    pub email: String,
}

/// Active waitlist size, served from cache when fresh.
///
/// # Errors
///
/// Returns `WaitlistError::Repository` if the count query fails.
pub async fn cached_count(state: &AppState) -> std::result::Result<i64, WaitlistError> {
    if let Some(count) = state.waitlist_cache().count().await {
        return Ok(count);
    }
    let count = state.waitlist().count().await?;
    state.waitlist_cache().set_count(count).await;
    Ok(count)
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|ua| ua.chars().take(USER_AGENT_MAX_CHARS).collect())
}

/// Validate, rate-limit and store a submission.
async fn submit(
    state: &AppState,
    session: &Session,
    headers: &HeaderMap,
    submission: &WaitlistSubmission,
) -> Result<WaitlistEntry> {
    let signup = submission.validate().map_err(WaitlistError::from)?;

    let mut attempts = waitlist_attempts(session).await?;
    let result = state
        .waitlist()
        .submit(
            &signup,
            user_agent(headers).as_deref(),
            &mut attempts,
            Utc::now(),
        )
        .await;
    // Counted attempts persist whether or not the signup succeeded
    save_waitlist_attempts(session, attempts).await?;

    let entry = result?;
    state.waitlist_cache().invalidate().await;
    add_breadcrumb("waitlist", "Joined waitlist", Some(&[("source", entry.source.as_str())]));
    Ok(entry)
}

/// Join the waitlist (JSON API).
#[instrument(skip_all, fields(source = submission.source.as_deref().unwrap_or_default()))]
pub async fn join(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Json(submission): Json<WaitlistSubmission>,
) -> Result<Json<WaitlistJoined>> {
    let entry = submit(&state, &session, &headers, &submission).await?;
    Ok(Json(WaitlistJoined {
        success: true,
        data: entry,
    }))
}

/// Join the waitlist from the landing page form (HTMX).
///
/// Every outcome renders a fragment; server errors are still captured to
/// Sentry through `AppError`.
#[instrument(skip_all)]
pub async fn join_form(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(submission): Form<WaitlistSubmission>,
) -> Response {
    match submit(&state, &session, &headers, &submission).await {
        Ok(entry) => WaitlistSuccessTemplate {
            name: entry.name,
            count: cached_count(&state).await.ok(),
        }
        .into_response(),
        Err(err) => {
            if err.status().is_server_error() {
                let event_id = sentry::capture_error(&err);
                tracing::error!(error = %err, sentry_event_id = %event_id, "waitlist form error");
            }
            WaitlistErrorTemplate {
                message: err.public_message(),
                name: submission.name,
                email: submission.email,
            }
            .into_response()
        }
    }
}

/// Number of active entries.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Result<Json<WaitlistCountResponse>> {
    let count = cached_count(&state).await?;
    Ok(Json(WaitlistCountResponse { count }))
}

/// Aggregate statistics.
#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> Result<Json<WaitlistStats>> {
    if let Some(stats) = state.waitlist_cache().stats().await {
        return Ok(Json(stats.as_ref().clone()));
    }
    let stats = state.waitlist().stats().await?;
    state.waitlist_cache().set_stats(stats.clone()).await;
    Ok(Json(stats))
}

/// Unsubscribe an email.
#[instrument(skip_all)]
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(request): Json<UnsubscribeRequest>,
) -> Result<Json<serde_json::Value>> {
    let email = Email::normalize(&request.email)
        .map_err(|_| AppError::BadRequest("Please enter a valid email address".to_owned()))?;

    state.waitlist().unsubscribe(&email).await?;
    state.waitlist_cache().invalidate().await;
    tracing::info!("waitlist entry unsubscribed");

    Ok(Json(serde_json::json!({ "success": true })))
}
