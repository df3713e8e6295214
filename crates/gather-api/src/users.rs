use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use bson::Document;
use serde_json::json;

use gather_db::DbError;
use gather_types::api::{UpdateUserRequest, UserProfile, UserResponse, UsersResponse};

use crate::auth::{AppState, hash_password};
use crate::error::{ApiError, parse_object_id};

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = state.db.list_users().await?;
    Ok(Json(UsersResponse {
        success: true,
        users: users.into_iter().map(UserProfile::from).collect(),
    }))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    let user = state
        .db
        .find_user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    Ok(Json(UserResponse {
        success: true,
        user: user.into(),
    }))
}

/// Either a password change (rehashed) or allow-listed profile fields.
/// Anything else the caller submitted never reaches the store.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    let fields = build_user_update(&req)?;

    let matched = state.db.update_user(id, fields).await.map_err(|err| match err {
        DbError::DuplicateKey => ApiError::Conflict("email already registered".into()),
        other => other.into(),
    })?;

    if matched == 0 {
        return Err(ApiError::NotFound("user not found".into()));
    }
    Ok(Json(json!({ "success": true })))
}

fn build_user_update(req: &UpdateUserRequest) -> Result<Document, ApiError> {
    let mut fields = Document::new();

    if let Some(password) = &req.password {
        fields.insert("password", hash_password(password)?);
    }
    if let Some(name) = &req.name {
        fields.insert("name", name.clone());
    }
    if let Some(email) = &req.email {
        fields.insert("email", email.clone());
    }
    if let Some(bio) = &req.bio {
        fields.insert("bio", bio.clone());
    }
    if let Some(role) = req.role {
        fields.insert("role", role.as_str());
    }
    if let Some(status) = &req.status {
        fields.insert("status", status.clone());
    }
    if let Some(prefs) = &req.email_preferences {
        fields.insert("emailPreferences", prefs.clone());
    }

    if fields.is_empty() {
        return Err(ApiError::BadRequest("no updatable fields supplied".into()));
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use gather_types::models::Role;

    #[test]
    fn empty_update_is_rejected() {
        assert!(matches!(
            build_user_update(&UpdateUserRequest::default()),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn profile_fields_use_store_names() {
        let req = UpdateUserRequest {
            name: Some("New Name".into()),
            role: Some(Role::Organizer),
            status: Some("inactive".into()),
            ..Default::default()
        };
        let fields = build_user_update(&req).unwrap();

        assert_eq!(fields.get_str("name").unwrap(), "New Name");
        assert_eq!(fields.get_str("role").unwrap(), "organizer");
        assert_eq!(fields.get_str("status").unwrap(), "inactive");
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn password_is_rehashed_never_stored_plain() {
        let req = UpdateUserRequest {
            password: Some("new-secret".into()),
            ..Default::default()
        };
        let fields = build_user_update(&req).unwrap();

        let stored = fields.get_str("password").unwrap();
        assert_ne!(stored, "new-secret");
        assert!(verify_password("new-secret", stored).unwrap());
    }

    #[test]
    fn unknown_fields_are_dropped_before_the_store() {
        // Serde only materializes the allow-listed fields, so a payload full
        // of extras produces exactly the known subset.
        let req: UpdateUserRequest = serde_json::from_str(
            r#"{"bio": "hi", "volunteerHours": 9000, "eventsCreated": 12, "_id": "abc"}"#,
        )
        .unwrap();
        let fields = build_user_update(&req).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get_str("bio").unwrap(), "hi");
    }
}
