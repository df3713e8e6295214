use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use bson::oid::ObjectId;
use chrono::Utc;

use gather_db::DbError;
use gather_types::api::{
    VolunteerCreatedResponse, VolunteerSignupRequest, VolunteerView, VolunteersResponse,
};
use gather_types::models::VolunteerRecord;

use crate::auth::AppState;
use crate::error::{ApiError, parse_object_id};

/// Volunteer shifts marked completed at sign-up time count toward the user's
/// hour total immediately; upcoming ones do not.
const COMPLETED: &str = "completed";

pub async fn list_volunteers(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let records = state.db.list_volunteers().await?;

    Ok(Json(VolunteersResponse {
        success: true,
        volunteers: records.into_iter().map(VolunteerView::from).collect(),
    }))
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<VolunteerSignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = parse_object_id(&req.user_id)?;
    parse_object_id(&req.event_id)?;
    if req.hours < 0.0 {
        return Err(ApiError::BadRequest("hours must be non-negative".into()));
    }

    let conflict = || ApiError::Conflict("already volunteering for this event".into());
    if state
        .db
        .find_volunteer(&req.user_id, &req.event_id)
        .await?
        .is_some()
    {
        return Err(conflict());
    }

    let status = req.status.unwrap_or_else(|| "upcoming".into());
    let record = VolunteerRecord {
        id: None,
        user_id: req.user_id,
        event_id: req.event_id,
        role: req.role,
        hours: req.hours,
        status: status.clone(),
        registered_at: Utc::now().to_rfc3339(),
    };

    let id = state.db.insert_volunteer(record).await.map_err(|err| match err {
        DbError::DuplicateKey => conflict(),
        other => other.into(),
    })?;

    if status == COMPLETED {
        state.db.inc_volunteer_hours(user_id, req.hours).await?;
    }

    Ok((
        StatusCode::CREATED,
        Json(VolunteerCreatedResponse {
            success: true,
            volunteer_id: id.to_hex(),
        }),
    ))
}

pub async fn history_by_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let records = state.db.list_volunteers_by_user(&id).await?;

    let mut volunteers = Vec::with_capacity(records.len());
    for record in records {
        let mut view = VolunteerView::from(record);
        // Per-row enrichment; a dangling event reference leaves the extra
        // fields unset rather than failing the whole listing.
        if let Ok(event_id) = ObjectId::parse_str(&view.event_id) {
            if let Some(event) = state.db.find_event(event_id).await? {
                view.event_title = Some(event.title);
                view.event_date = Some(event.date);
            }
        }
        volunteers.push(view);
    }

    Ok(Json(VolunteersResponse {
        success: true,
        volunteers,
    }))
}

pub async fn history_by_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let records = state.db.list_volunteers_by_event(&id).await?;

    let mut volunteers = Vec::with_capacity(records.len());
    for record in records {
        let mut view = VolunteerView::from(record);
        if let Ok(user_id) = ObjectId::parse_str(&view.user_id) {
            if let Some(user) = state.db.find_user_by_id(user_id).await? {
                view.user_name = Some(user.name);
                view.user_email = Some(user.email);
            }
        }
        volunteers.push(view);
    }

    Ok(Json(VolunteersResponse {
        success: true,
        volunteers,
    }))
}
