/// Video metadata endpoint backed by the yt-dlp probe
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::services::{ProbeError, VideoProbe};

#[derive(Debug, Deserialize)]
pub struct VideoUrlRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
struct ParseFailureResponse {
    error: String,
    /// Raw probe output, echoed on parse failure as a debugging aid.
    raw_output: String,
}

/// Extract title/formats for a video URL
/// POST /api/video-info
pub async fn video_info(
    probe: web::Data<VideoProbe>,
    req: web::Json<VideoUrlRequest>,
) -> Result<HttpResponse> {
    let url = req.url.trim();
    if url.is_empty() {
        return Err(AppError::BadRequest("video URL cannot be empty".to_string()));
    }

    match probe.probe(url).await {
        Ok(info) => Ok(HttpResponse::Ok().json(info)),
        Err(ProbeError::Parse { source, raw }) => {
            tracing::error!(error = %source, "failed to parse probe output");
            Ok(HttpResponse::InternalServerError().json(ParseFailureResponse {
                error: format!("failed to parse probe output: {}", source),
                raw_output: raw,
            }))
        }
        Err(e) => {
            tracing::error!(error = %e, url, "video probe failed");
            Err(AppError::Upstream(e.to_string()))
        }
    }
}
