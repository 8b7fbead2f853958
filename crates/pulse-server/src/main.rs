mod rate_limit;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use pulse_api::auth::{self, AppState, AppStateInner};
use pulse_api::middleware::require_auth;
use pulse_api::storage::Storage;
use pulse_api::{
    admin_messages, consultations, contacts, doctor_requests, first_aid, hospitals, notes,
    notifications, reports, users,
};
use pulse_types::envelope::Envelope;

use crate::rate_limit::RateLimiter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulse=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("PULSE_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("PULSE_DB_PATH").unwrap_or_else(|_| "pulse.db".into());
    let upload_dir: PathBuf = std::env::var("PULSE_UPLOAD_DIR")
        .unwrap_or_else(|_| "./uploads".into())
        .into();
    let host = std::env::var("PULSE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("PULSE_PORT")
        .unwrap_or_else(|_| "4000".into())
        .parse()?;
    let rate_max: u32 = std::env::var("PULSE_RATE_LIMIT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(300);
    let rate_window_secs: u64 = std::env::var("PULSE_RATE_WINDOW_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60);

    // Init database and attachment storage
    let db = pulse_db::Database::open(&PathBuf::from(&db_path))?;
    let storage = Storage::new(upload_dir).await?;

    // Shared state
    let app_state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        storage,
    });

    let limiter = RateLimiter::new(rate_max, Duration::from_secs(rate_window_secs));

    // Routes
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/contacts", post(contacts::create_contact))
        .with_state(app_state.clone());

    let protected_routes = Router::new()
        // users
        .route("/users", get(users::list_users))
        .route("/users/me", get(users::get_me).patch(users::update_me))
        .route("/users/{id}", get(users::get_user).delete(users::delete_user))
        .route("/users/{id}/role", patch(users::update_role))
        // incident reports
        .route("/reports", post(reports::create_report).get(reports::list_reports))
        .route("/reports/nearby", get(reports::nearby_reports))
        .route(
            "/reports/{id}",
            get(reports::get_report)
                .patch(reports::update_report)
                .delete(reports::delete_report),
        )
        // contact inbox (creation is public)
        .route("/contacts", get(contacts::list_contacts))
        .route(
            "/contacts/{id}",
            get(contacts::get_contact)
                .patch(contacts::update_contact)
                .delete(contacts::delete_contact),
        )
        // personal health notes
        .route("/notes", post(notes::create_note).get(notes::list_notes))
        .route(
            "/notes/{id}",
            get(notes::get_note)
                .patch(notes::update_note)
                .delete(notes::delete_note),
        )
        // consultations
        .route(
            "/consultations",
            post(consultations::create_consultation).get(consultations::list_consultations),
        )
        .route(
            "/consultations/{id}",
            get(consultations::get_consultation)
                .patch(consultations::update_consultation)
                .delete(consultations::delete_consultation),
        )
        .route(
            "/consultations/{id}/respond",
            post(consultations::respond_consultation),
        )
        // doctor applications
        .route(
            "/doctor-requests",
            post(doctor_requests::create_doctor_request)
                .get(doctor_requests::list_doctor_requests),
        )
        .route(
            "/doctor-requests/{id}",
            get(doctor_requests::get_doctor_request)
                .delete(doctor_requests::delete_doctor_request),
        )
        .route(
            "/doctor-requests/{id}/approve",
            post(doctor_requests::approve_doctor_request),
        )
        .route(
            "/doctor-requests/{id}/reject",
            post(doctor_requests::reject_doctor_request),
        )
        // first-aid reference
        .route(
            "/first-aid",
            post(first_aid::create_entry).get(first_aid::list_entries),
        )
        .route(
            "/first-aid/{id}",
            get(first_aid::get_entry)
                .patch(first_aid::update_entry)
                .delete(first_aid::delete_entry),
        )
        // hospitals
        .route(
            "/hospitals",
            post(hospitals::create_hospital).get(hospitals::list_hospitals),
        )
        .route("/hospitals/nearby", get(hospitals::nearby_hospitals))
        .route(
            "/hospitals/{id}",
            get(hospitals::get_hospital)
                .patch(hospitals::update_hospital)
                .delete(hospitals::delete_hospital),
        )
        // notifications
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/{id}/read", post(notifications::mark_read))
        .route("/notifications/{id}", delete(notifications::delete_notification))
        // admin messages
        .route(
            "/admin-messages",
            post(admin_messages::create_message).get(admin_messages::list_messages),
        )
        .route(
            "/admin-messages/{id}",
            get(admin_messages::get_message).delete(admin_messages::delete_message),
        )
        .layer(middleware::from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(8 * 1024 * 1024)) // attachments cap at 5 MB + form overhead
        .layer(middleware::from_fn_with_state(limiter, rate_limit::limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Pulse server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn health() -> Json<Envelope<&'static str>> {
    Json(Envelope::ok("up", "service healthy"))
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
