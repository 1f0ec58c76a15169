use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    analysis::aggregate,
    auth::{LoginRequest, SignupRequest, login, signup},
    error::AppError,
    export::{export_csv, export_filename},
    feedback::{check_submission, submit},
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubmitFeedbackRequest {
    pub username: String,
    pub institution: String,
    pub answers: Vec<String>,
}

pub async fn home_handler() -> &'static str {
    "Student Feedback System API"
}

pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let token = signup(&state.pool, &state.config.jwt_secret, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully", "token": token })),
    ))
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let token = login(&state.pool, &state.config.jwt_secret, &payload).await?;

    Ok(Json(json!({ "message": "Login successful", "token": token })))
}

pub async fn submit_feedback_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SubmitFeedbackRequest>,
) -> Result<impl IntoResponse, AppError> {
    submit(
        &state.pool,
        &payload.username,
        &payload.institution,
        &payload.answers,
    )
    .await?;

    Ok(Json(json!({ "message": "Feedback submitted successfully" })))
}

pub async fn check_submission_handler(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let response = match check_submission(&state.pool, &username).await? {
        Some(institution) => json!({ "submitted": true, "institution": institution }),
        None => json!({ "submitted": false }),
    };

    Ok(Json(response))
}

pub async fn analyze_feedback_handler(
    State(state): State<Arc<AppState>>,
    Path(institution): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let report = aggregate(&state.pool, &state.analyzer, &state.llm, &institution).await?;

    Ok(Json(report))
}

pub async fn export_feedback_handler(
    State(state): State<Arc<AppState>>,
    Path(institution): Path<String>,
) -> Result<Response, AppError> {
    let bytes = export_csv(&state.pool, &institution).await?;
    let disposition = format!("attachment; filename=\"{}\"", export_filename(&institution));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
