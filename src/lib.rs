//! Student feedback backend.
//!
//! Collects per-institution student feedback, authenticates users, and
//! produces aggregate sentiment summaries over stored responses using a
//! lexical polarity scorer plus a generative-text service.
//!
//! # Endpoints
//! - `POST /signup` — create a credential record, returns a session token
//! - `POST /login` — obtain a session token
//! - `POST /submit_feedback` — store one respondent's ten answers
//! - `GET /check_submission/{username}` — query a prior submission
//! - `GET /analyze_feedback/{institution}` — sentiment tally + debrief
//! - `GET /export_feedback/{institution}` — download raw responses as CSV
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod analysis;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod feedback;
pub mod llm;
pub mod routes;
pub mod sentiment;
pub mod state;

use routes::{
    analyze_feedback_handler, check_submission_handler, export_feedback_handler, home_handler,
    login_handler, signup_handler, submit_feedback_handler,
};
use state::AppState;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/", get(home_handler))
        .route("/signup", post(signup_handler))
        .route("/login", post(login_handler))
        .route("/submit_feedback", post(submit_feedback_handler))
        .route("/check_submission/{username}", get(check_submission_handler))
        .route(
            "/analyze_feedback/{institution}",
            get(analyze_feedback_handler),
        )
        .route(
            "/export_feedback/{institution}",
            get(export_feedback_handler),
        )
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
