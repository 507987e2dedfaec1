//! Shipment document field extraction service.
//!
//! Accepts scanned Bills of Lading and Air Waybills over HTTP, runs them
//! through the Vision-backed extraction engine, and returns the recovered
//! field map (or a single-key error) for the caller to attach to its
//! shipment record.

mod awb;
mod bol;
mod config;
mod docnum;
mod extract;
mod fields;
mod layout;
mod proximity;
mod recognition;
mod scan;
mod strategy;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::AppConfig;
use fields::ExtractOutcome;
use recognition::{vision::VisionProvider, RecognitionProvider};

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    provider: Arc<dyn RecognitionProvider>,
    upload_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shipdoc_extractor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let client = reqwest::Client::new();
    let provider = VisionProvider::from_key_file(client, &config.credentials_path)?;

    std::fs::create_dir_all(&config.upload_dir)?;

    let state = AppState {
        provider: Arc::new(provider),
        upload_dir: config.upload_dir.clone(),
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/extract", post(extract_document))
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024)) // 50MB
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Upload a scanned shipment document and extract its fields.
///
/// Responds 200 with either the field map or the error result; extraction
/// failure is a domain outcome, not a transport failure.
async fn extract_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractOutcome>, (StatusCode, String)> {
    let mut filename = String::new();
    let mut file_data = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            filename = field.file_name().unwrap_or("document.pdf").to_string();
            file_data = field
                .bytes()
                .await
                .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to read file: {}", e)))?
                .to_vec();
            break;
        }
    }

    if file_data.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No file uploaded".to_string()));
    }

    info!("Received document: {} ({} bytes)", filename, file_data.len());

    // Uploads are kept on disk for the downstream human review step.
    let stored = state
        .upload_dir
        .join(format!("{}-{}", uuid::Uuid::new_v4(), sanitize(&filename)));
    tokio::fs::write(&stored, &file_data).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to store upload: {}", e),
        )
    })?;

    let outcome = extract::extract_fields(state.provider.as_ref(), &stored).await;
    Ok(Json(outcome))
}

fn sanitize(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
