use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use bson::oid::ObjectId;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use gather_types::api::{AdminStats, AdminStatsResponse, EventView, EventsResponse, TopEvent};
use gather_types::models::EventStatus;

use crate::auth::AppState;
use crate::error::{ApiError, parse_object_id};

const TOP_EVENTS_LIMIT: i64 = 5;

pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let active_users = state.db.count_active_users().await?;
    let active_events = state.db.count_published_events().await?;
    let total_volunteers = state.db.count_volunteers().await?;
    let forum_posts = state.db.count_threads().await?;
    let new_users = state
        .db
        .count_users_joined_since(&join_cutoff(Utc::now()))
        .await?;

    let top_events = state
        .db
        .top_registered_events(TOP_EVENTS_LIMIT)
        .await?
        .into_iter()
        .map(|event| TopEvent {
            id: event.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: event.title,
            registered: event.registered,
        })
        .collect();

    Ok(Json(AdminStatsResponse {
        success: true,
        stats: AdminStats {
            active_users,
            active_events,
            total_volunteers,
            forum_posts,
            new_users,
            top_events,
        },
    }))
}

/// Approval queue. The creator id is swapped for the creator's display name
/// when the reference resolves.
pub async fn pending_events(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let events = state.db.list_pending_events().await?;

    let mut views = Vec::with_capacity(events.len());
    for event in events {
        let mut view = EventView::from(event);
        if let Ok(creator_id) = ObjectId::parse_str(&view.creator) {
            if let Some(user) = state.db.find_user_by_id(creator_id).await? {
                view.creator = user.name;
            }
        }
        views.push(view);
    }

    Ok(Json(EventsResponse {
        success: true,
        events: views,
    }))
}

pub async fn approve_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    set_status(&state, &id, EventStatus::Published).await
}

pub async fn reject_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    set_status(&state, &id, EventStatus::Rejected).await
}

/// Idempotent: re-approving a published event matches without modifying.
async fn set_status(
    state: &AppState,
    id: &str,
    status: EventStatus,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_object_id(id)?;
    let matched = state.db.set_event_status(id, status).await?;
    if matched == 0 {
        return Err(ApiError::NotFound("event not found".into()));
    }
    Ok(Json(json!({ "success": true })))
}

/// Trailing 30 days, measured from now.
fn join_cutoff(now: DateTime<Utc>) -> String {
    (now - Duration::days(30)).to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_is_thirty_days_before_now() {
        let now = DateTime::parse_from_rfc3339("2026-08-31T10:00:00+00:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(join_cutoff(now), "2026-08-01T10:00:00+00:00");
    }

    #[test]
    fn cutoff_sorts_lexicographically_against_join_dates() {
        let now = DateTime::parse_from_rfc3339("2026-08-31T10:00:00+00:00")
            .unwrap()
            .with_timezone(&Utc);
        let cutoff = join_cutoff(now);
        // RFC 3339 strings in the same offset order chronologically.
        assert!("2026-08-15T00:00:00+00:00".to_string() > cutoff);
        assert!("2026-07-15T00:00:00+00:00".to_string() < cutoff);
    }
}
