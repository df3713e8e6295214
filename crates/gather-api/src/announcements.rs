use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use gather_types::api::{
    AnnouncementCreatedResponse, AnnouncementView, AnnouncementsResponse,
    CreateAnnouncementRequest,
};
use gather_types::models::Announcement;

use crate::auth::AppState;
use crate::error::{ApiError, parse_object_id};

#[derive(Debug, Default, Deserialize)]
pub struct AnnouncementListQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

pub async fn list_announcements(
    State(state): State<AppState>,
    Query(query): Query<AnnouncementListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let announcements = state.db.list_announcements(query.kind.as_deref()).await?;

    Ok(Json(AnnouncementsResponse {
        success: true,
        announcements: announcements
            .into_iter()
            .map(AnnouncementView::from)
            .collect(),
    }))
}

pub async fn create_announcement(
    State(state): State<AppState>,
    Json(req): Json<CreateAnnouncementRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let announcement = Announcement {
        id: None,
        title: req.title,
        content: req.content,
        kind: req.kind,
        author: req.author,
        date: Utc::now().to_rfc3339(),
        expires_on: req.expires_on,
    };

    let id = state.db.insert_announcement(announcement).await?;

    Ok((
        StatusCode::CREATED,
        Json(AnnouncementCreatedResponse {
            success: true,
            announcement_id: id.to_hex(),
        }),
    ))
}

pub async fn delete_announcement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    let deleted = state.db.delete_announcement(id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("announcement not found".into()));
    }
    Ok(Json(json!({ "success": true })))
}
