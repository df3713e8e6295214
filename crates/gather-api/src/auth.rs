use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde_json::json;

use gather_db::{Database, DbError};
use gather_types::api::{
    AuthResponse, ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, RegisterRequest,
    ResetPasswordRequest, UserSummary,
};
use gather_types::models::{PasswordReset, Role, User};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
}

const RESET_TOKEN_TTL_MINUTES: i64 = 30;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "name, email and password are required".into(),
        ));
    }

    // Fast path for the common case; the unique index on email is what
    // actually holds under concurrent registration.
    if state.db.find_user_by_email(&req.email).await?.is_some() {
        return Err(ApiError::Conflict("email already registered".into()));
    }

    let user = User {
        id: None,
        name: req.name.clone(),
        email: req.email.clone(),
        password: hash_password(&req.password)?,
        role: Role::Member,
        bio: None,
        join_date: Utc::now().to_rfc3339(),
        events_created: 0,
        volunteer_hours: 0.0,
        status: "active".into(),
        email_preferences: None,
        password_reset: None,
    };

    let id = state.db.insert_user(user).await.map_err(|err| match err {
        DbError::DuplicateKey => ApiError::Conflict("email already registered".into()),
        other => other.into(),
    })?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            user: UserSummary {
                id: id.to_hex(),
                name: req.name,
                email: req.email,
                role: Role::Member,
            },
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .find_user_by_email(&req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("no account for that email".into()))?;

    if !verify_password(&req.password, &user.password)? {
        return Err(ApiError::Unauthorized("invalid credentials".into()));
    }

    Ok(Json(AuthResponse {
        success: true,
        user: UserSummary::from(&user),
    }))
}

/// Anti-enumeration: the response shape is success whether or not the email
/// matched. The token rides back in the body as a stand-in for an email
/// delivery collaborator.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(user) = state.db.find_user_by_email(&req.email).await? else {
        return Ok(Json(ForgotPasswordResponse {
            success: true,
            reset_token: None,
        }));
    };
    let Some(id) = user.id else {
        return Ok(Json(ForgotPasswordResponse {
            success: true,
            reset_token: None,
        }));
    };

    let token = generate_reset_token();
    let reset = PasswordReset {
        token: token.clone(),
        expires_at: (Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES)).to_rfc3339(),
    };
    state.db.set_password_reset(id, &reset).await?;

    Ok(Json(ForgotPasswordResponse {
        success: true,
        reset_token: Some(token),
    }))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let invalid = || ApiError::BadRequest("invalid or expired reset token".into());

    let user = state
        .db
        .find_user_by_reset_token(&req.token)
        .await?
        .ok_or_else(invalid)?;

    let reset = user.password_reset.as_ref().ok_or_else(invalid)?;
    if reset_expired(&reset.expires_at, Utc::now()) {
        return Err(invalid());
    }

    let id = user
        .id
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("user document missing _id")))?;

    let password_hash = hash_password(&req.password)?;
    state.db.complete_password_reset(id, &password_hash).await?;

    Ok(Json(json!({ "success": true })))
}

pub(crate) fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ApiError::Internal(anyhow::anyhow!("password hashing failed: {err}")))
}

pub(crate) fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| ApiError::Internal(anyhow::anyhow!("stored hash unreadable: {err}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// A stored expiry that fails to parse invalidates the token.
fn reset_expired(expires_at: &str, now: DateTime<Utc>) -> bool {
    match DateTime::parse_from_rfc3339(expires_at) {
        Ok(expiry) => expiry < now,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("hunter2!").unwrap();
        assert_ne!(hash, "hunter2!");
        assert!(verify_password("hunter2!", &hash).unwrap());
        assert!(!verify_password("hunter3!", &hash).unwrap());
    }

    #[test]
    fn unreadable_stored_hash_is_an_internal_error() {
        assert!(matches!(
            verify_password("x", "not-a-phc-string"),
            Err(ApiError::Internal(_))
        ));
    }

    #[test]
    fn reset_tokens_are_url_safe_and_distinct() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_ne!(a, b);
        // 32 bytes, unpadded base64
        assert_eq!(a.len(), 43);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn expiry_boundaries() {
        let now = DateTime::parse_from_rfc3339("2026-08-01T12:00:00+00:00")
            .unwrap()
            .with_timezone(&Utc);

        assert!(!reset_expired("2026-08-01T12:30:00+00:00", now));
        assert!(reset_expired("2026-08-01T11:59:59+00:00", now));
        // Exactly at expiry the token is still valid.
        assert!(!reset_expired("2026-08-01T12:00:00+00:00", now));
        // Corrupt timestamps behave like expired ones.
        assert!(reset_expired("not a timestamp", now));
        assert!(reset_expired("", now));
    }
}
