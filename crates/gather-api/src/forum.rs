use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use gather_types::api::{CreateThreadRequest, ThreadCreatedResponse, ThreadView, ThreadsResponse};
use gather_types::models::ForumThread;

use crate::auth::AppState;
use crate::error::{ApiError, parse_object_id};

#[derive(Debug, Default, Deserialize)]
pub struct ThreadListQuery {
    pub category: Option<String>,
}

pub async fn list_threads(
    State(state): State<AppState>,
    Query(query): Query<ThreadListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let threads = state.db.list_threads(query.category.as_deref()).await?;

    Ok(Json(ThreadsResponse {
        success: true,
        threads: threads.into_iter().map(ThreadView::from).collect(),
    }))
}

pub async fn create_thread(
    State(state): State<AppState>,
    Json(req): Json<CreateThreadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now().to_rfc3339();
    let thread = ForumThread {
        id: None,
        title: req.title,
        author: req.author,
        category: req.category,
        replies: 0,
        likes: 0,
        tags: req.tags,
        is_pinned: false,
        flags: 0,
        created_at: now.clone(),
        last_activity: now,
    };

    let id = state.db.insert_thread(thread).await?;

    Ok((
        StatusCode::CREATED,
        Json(ThreadCreatedResponse {
            success: true,
            thread_id: id.to_hex(),
        }),
    ))
}

pub async fn delete_thread(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    let deleted = state.db.delete_thread(id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("thread not found".into()));
    }
    Ok(Json(json!({ "success": true })))
}

/// Idempotent; only an unknown id is an error.
pub async fn pin_thread(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    let matched = state.db.pin_thread(id).await?;
    if matched == 0 {
        return Err(ApiError::NotFound("thread not found".into()));
    }
    Ok(Json(json!({ "success": true })))
}
