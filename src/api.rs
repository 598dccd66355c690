//! HTTP front for the verification engine.
//!
//! `GET /` answers a welcome message; `POST /verify-email` takes `{"email": "..."}`
//! and answers the [`VerificationResult`](crate::VerificationResult) JSON.

use std::future::Future;
use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, error, warn};

use crate::engine::VerificationEngine;

pub const WELCOME_MESSAGE: &str = "Welcome to the email verification service";

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub email: Option<String>,
}

pub fn router(engine: Arc<VerificationEngine>) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/verify-email", post(verify_email))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(engine)
}

/// Serves until `shutdown` resolves, then drains in-flight requests.
pub async fn serve<F>(
    listener: TcpListener,
    engine: Arc<VerificationEngine>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(engine))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn welcome() -> Json<serde_json::Value> {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

async fn verify_email(
    State(engine): State<Arc<VerificationEngine>>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Response {
    let email = match body {
        Ok(Json(VerifyRequest { email: Some(email) })) if email.contains('@') => email,
        Ok(_) => return invalid_email(),
        Err(rejection) => {
            warn!(error = %rejection, "rejected verification request body");
            return invalid_email();
        }
    };

    // Detached so a disconnecting client does not cancel cache and store writes.
    let task = tokio::spawn(async move { engine.verify(&email).await });
    match task.await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => {
            error!(error = %err, "verification task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal Server Error" })),
            )
                .into_response()
        }
    }
}

fn invalid_email() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Invalid email" })),
    )
        .into_response()
}
