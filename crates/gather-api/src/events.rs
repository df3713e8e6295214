use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use bson::Document;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use gather_db::RegisterOutcome;
use gather_types::api::{
    CreateEventRequest, EventCreatedResponse, EventRegistrationRequest, EventResponse, EventView,
    EventsResponse, UpdateEventRequest,
};
use gather_types::models::{Event, EventStatus};

use crate::auth::AppState;
use crate::error::{ApiError, parse_object_id};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListQuery {
    /// When present, each event is annotated with `isRegistered` for this
    /// caller.
    pub user_id: Option<String>,
    pub category: Option<String>,
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let events = state
        .db
        .list_listable_events(query.category.as_deref())
        .await?;

    let events = events
        .into_iter()
        .map(|event| {
            let view = EventView::from(event);
            match &query.user_id {
                Some(user_id) => view.for_caller(user_id),
                None => view,
            }
        })
        .collect();

    Ok(Json(EventsResponse {
        success: true,
        events,
    }))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    let event = state
        .db
        .find_event(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("event not found".into()))?;

    Ok(Json(EventResponse {
        success: true,
        event: event.into(),
    }))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.capacity < 0 {
        return Err(ApiError::BadRequest("capacity must be non-negative".into()));
    }
    let creator_id = parse_object_id(&req.creator)?;

    let event = Event {
        id: None,
        title: req.title,
        description: req.description,
        date: req.date,
        time: req.time,
        location: req.location,
        category: req.category,
        capacity: req.capacity,
        registered: 0,
        attendees: vec![],
        image_url: req.image_url,
        creator: req.creator,
        status: effective_status(req.status),
        tags: req.tags,
        created_at: Utc::now().to_rfc3339(),
    };

    let id = state.db.insert_event(event).await?;
    state.db.inc_events_created(creator_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(EventCreatedResponse {
            success: true,
            event_id: id.to_hex(),
        }),
    ))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    let fields = build_event_update(&req)?;

    let matched = state.db.update_event(id, fields).await?;
    if matched == 0 {
        return Err(ApiError::NotFound("event not found".into()));
    }
    Ok(Json(json!({ "success": true })))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    let deleted = state.db.delete_event(id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("event not found".into()));
    }
    Ok(Json(json!({ "success": true })))
}

pub async fn register_for_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<EventRegistrationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;

    match state.db.register_attendee(id, &req.user_id).await? {
        RegisterOutcome::Registered => Ok(Json(json!({ "success": true }))),
        RegisterOutcome::EventNotFound => Err(ApiError::NotFound("event not found".into())),
        RegisterOutcome::AlreadyRegistered => {
            Err(ApiError::Conflict("already registered for this event".into()))
        }
        RegisterOutcome::Full => Err(ApiError::BadRequest("event is full".into())),
    }
}

pub async fn events_by_creator(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    parse_object_id(&id)?;
    let events = state.db.list_events_by_creator(&id).await?;

    Ok(Json(EventsResponse {
        success: true,
        events: events.into_iter().map(EventView::from).collect(),
    }))
}

/// Publishing is gated on admin approval: a caller asking for `published`
/// lands in `pending`; an omitted status drafts.
fn effective_status(requested: Option<EventStatus>) -> EventStatus {
    match requested {
        None => EventStatus::Draft,
        Some(EventStatus::Published) => EventStatus::Pending,
        Some(other) => other,
    }
}

fn build_event_update(req: &UpdateEventRequest) -> Result<Document, ApiError> {
    let mut fields = Document::new();

    if let Some(title) = &req.title {
        fields.insert("title", title.clone());
    }
    if let Some(description) = &req.description {
        fields.insert("description", description.clone());
    }
    if let Some(date) = &req.date {
        fields.insert("date", date.clone());
    }
    if let Some(time) = &req.time {
        fields.insert("time", time.clone());
    }
    if let Some(location) = &req.location {
        fields.insert("location", location.clone());
    }
    if let Some(category) = &req.category {
        fields.insert("category", category.clone());
    }
    if let Some(capacity) = req.capacity {
        if capacity < 0 {
            return Err(ApiError::BadRequest("capacity must be non-negative".into()));
        }
        fields.insert("capacity", capacity);
    }
    if let Some(image_url) = &req.image_url {
        fields.insert("imageUrl", image_url.clone());
    }
    if let Some(status) = req.status {
        fields.insert("status", status.as_str());
    }
    if let Some(tags) = &req.tags {
        fields.insert("tags", tags.clone());
    }

    if fields.is_empty() {
        return Err(ApiError::BadRequest("no updatable fields supplied".into()));
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_gate() {
        assert_eq!(effective_status(None), EventStatus::Draft);
        assert_eq!(
            effective_status(Some(EventStatus::Published)),
            EventStatus::Pending
        );
        assert_eq!(
            effective_status(Some(EventStatus::Draft)),
            EventStatus::Draft
        );
        assert_eq!(
            effective_status(Some(EventStatus::Pending)),
            EventStatus::Pending
        );
    }

    #[test]
    fn update_uses_store_field_names() {
        let req = UpdateEventRequest {
            title: Some("New title".into()),
            image_url: Some("https://img.example/e.png".into()),
            status: Some(EventStatus::Published),
            capacity: Some(25),
            ..Default::default()
        };
        let fields = build_event_update(&req).unwrap();

        assert_eq!(fields.get_str("title").unwrap(), "New title");
        assert_eq!(fields.get_str("imageUrl").unwrap(), "https://img.example/e.png");
        assert_eq!(fields.get_str("status").unwrap(), "published");
        assert_eq!(fields.get_i64("capacity").unwrap(), 25);
    }

    #[test]
    fn empty_or_invalid_updates_are_rejected() {
        assert!(matches!(
            build_event_update(&UpdateEventRequest::default()),
            Err(ApiError::BadRequest(_))
        ));
        let negative = UpdateEventRequest {
            capacity: Some(-3),
            ..Default::default()
        };
        assert!(matches!(
            build_event_update(&negative),
            Err(ApiError::BadRequest(_))
        ));
    }
}
