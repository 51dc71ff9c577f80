//! HTTP request handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, Redirect};
use axum::Json;
use serde::Serialize;
use tracing::{error, info};

use jukebot_core::SourceRef;

use crate::api::server::AppContext;
use crate::sounds;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "jukebot".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /trigger/:clip - Play a local clip through the voice session,
/// preempting whatever is playing, then send the caller to the listing.
///
/// An unconnected session degrades to the guarded no-op; the redirect is
/// returned either way.
pub async fn trigger_clip(
    State(ctx): State<AppContext>,
    Path(clip): Path<String>,
) -> Result<Redirect, (StatusCode, String)> {
    let path = sounds::clip_path(&ctx.sounds_dir, &clip)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    info!("HTTP trigger for clip '{}'", clip);
    if let Err(e) = ctx.session.play(&SourceRef::File(path)).await {
        error!("failed to play clip '{}': {}", clip, e);
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to play clip: {e}"),
        ));
    }

    Ok(Redirect::to("/sounds/"))
}

/// GET /sounds/ - HTML listing of the available clips
pub async fn list_sounds(
    State(ctx): State<AppContext>,
) -> Result<Html<String>, (StatusCode, String)> {
    if !ctx.sounds_dir.exists() {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "The sounds directory does not exist".to_string(),
        ));
    }

    let names = sounds::list(&ctx.sounds_dir).await.map_err(|e| {
        error!("failed to list sounds: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to list sounds: {e}"),
        )
    })?;

    let items: String = names
        .iter()
        .map(|name| format!("    <li><a href=\"/trigger/{name}\">{name}</a></li>\n"))
        .collect();

    Ok(Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><title>jukebot sounds</title></head>\n<body>\n  \
         <h1>Available sounds</h1>\n  <ul>\n{items}  </ul>\n</body>\n</html>\n"
    )))
}
