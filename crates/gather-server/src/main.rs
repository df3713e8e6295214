use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use gather_api::auth::{self, AppState, AppStateInner};
use gather_api::{admin, announcements, events, forum, users, volunteers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gather=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let mongo_uri = std::env::var("GATHER_MONGO_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".into());
    let db_name = std::env::var("GATHER_DB_NAME").unwrap_or_else(|_| "gather".into());
    let host = std::env::var("GATHER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("GATHER_PORT")
        .unwrap_or_else(|_| "5000".into())
        .parse()?;

    // Connect to the document store (also creates the unique indexes)
    let db = gather_db::Database::connect(&mongo_uri, &db_name).await?;

    // Shared state
    let state: AppState = Arc::new(AppStateInner { db });

    // Routes
    let app = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        .route("/api/users", get(users::list_users))
        .route("/api/users/{id}", get(users::get_user))
        .route("/api/users/{id}", put(users::update_user))
        .route("/api/events", get(events::list_events))
        .route("/api/events", post(events::create_event))
        .route("/api/events/{id}", get(events::get_event))
        .route("/api/events/{id}", put(events::update_event))
        .route("/api/events/{id}", delete(events::delete_event))
        .route("/api/events/{id}/register", post(events::register_for_event))
        .route("/api/events/user/{id}", get(events::events_by_creator))
        .route("/api/announcements", get(announcements::list_announcements))
        .route("/api/announcements", post(announcements::create_announcement))
        .route(
            "/api/announcements/{id}",
            delete(announcements::delete_announcement),
        )
        .route("/api/forum/threads", get(forum::list_threads))
        .route("/api/forum/threads", post(forum::create_thread))
        .route("/api/forum/threads/{id}", delete(forum::delete_thread))
        .route("/api/forum/threads/{id}/pin", put(forum::pin_thread))
        .route("/api/volunteers", get(volunteers::list_volunteers))
        .route("/api/volunteers", post(volunteers::signup))
        .route("/api/volunteers/user/{id}", get(volunteers::history_by_user))
        .route(
            "/api/volunteers/event/{id}",
            get(volunteers::history_by_event),
        )
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/events/pending", get(admin::pending_events))
        .route("/api/admin/events/{id}/approve", put(admin::approve_event))
        .route("/api/admin/events/{id}/reject", put(admin::reject_event))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Gather server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
