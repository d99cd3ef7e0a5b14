//! HTTP surface of the converter: one endpoint that fetches the chat text,
//! runs the conversion, uploads the result and returns a download link.
//!
//! Failures keep distinct status codes so callers can tell an unreachable
//! AnythingLLM instance (502) from a chat with no exportable reply (404)
//! from a hosting-service rejection (502 with an upload detail). A failure
//! never produces a partial document: conversion only starts once the full
//! text is in hand, and upload only after rendering succeeded.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::anythingllm::HistoryClient;
use crate::config::Config;
use crate::upload::GofileClient;

pub struct AppState {
    pub history: HistoryClient,
    pub uploader: GofileClient,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            history: HistoryClient::new(&config.anythingllm)?,
            uploader: GofileClient::new(&config.upload)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ConversionRequest {
    pub workspace_slug: String,
    pub chat_id: String,
    #[serde(default = "default_filename")]
    pub filename: String,
}

fn default_filename() -> String {
    "SOW-Document.docx".to_string()
}

#[derive(Debug, Serialize)]
pub struct ConversionResponse {
    pub status: String,
    pub download_url: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/generate-from-chat", post(generate_from_chat))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn generate_from_chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConversionRequest>,
) -> Result<Json<ConversionResponse>, Response> {
    if !state.history.is_configured() {
        return Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "server is not configured with AnythingLLM API credentials".to_string(),
        ));
    }

    let reply = state
        .history
        .last_exportable_reply(&request.workspace_slug, &request.chat_id)
        .await
        .map_err(|err| {
            error_response(
                StatusCode::BAD_GATEWAY,
                format!("failed to fetch chat history from AnythingLLM: {err:#}"),
            )
        })?;
    let Some(markdown) = reply else {
        return Err(error_response(
            StatusCode::NOT_FOUND,
            "could not find a suitable SOW message in the chat history".to_string(),
        ));
    };

    let bytes = crate::markdown_to_docx(&markdown).map_err(|err| {
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to render document: {err:#}"),
        )
    })?;

    let download_url = state
        .uploader
        .upload(&request.filename, bytes)
        .await
        .map_err(|err| {
            error_response(StatusCode::BAD_GATEWAY, format!("file upload error: {err:#}"))
        })?;

    info!(
        "generated {} for workspace {}",
        request.filename, request.workspace_slug
    );
    Ok(Json(ConversionResponse {
        status: "success".to_string(),
        download_url,
    }))
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}
