/// Standalone upload endpoints
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::services::MediaStore;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub description: String,
    pub reference: String,
}

/// Upload a single file with an optional description field
/// POST /upload
pub async fn upload_file(
    media: web::Data<MediaStore>,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    let mut description = String::new();
    let mut reference: Option<String> = None;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::BadRequest(format!("multipart error: {}", e)))?;

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(|s| s.to_string());

        match file_name {
            None => {
                let mut data = Vec::new();
                while let Some(chunk) = field.next().await {
                    let bytes = chunk
                        .map_err(|e| AppError::BadRequest(format!("multipart read error: {}", e)))?;
                    data.extend_from_slice(&bytes);
                }
                description = String::from_utf8_lossy(&data).into_owned();
            }
            Some(name) => {
                let (mut file, stored) = media.create(Some(&name)).await?;
                while let Some(chunk) = field.next().await {
                    let bytes = chunk
                        .map_err(|e| AppError::BadRequest(format!("multipart read error: {}", e)))?;
                    file.write_all(&bytes)
                        .await
                        .map_err(|e| AppError::Internal(format!("failed to write upload: {}", e)))?;
                }
                file.flush()
                    .await
                    .map_err(|e| AppError::Internal(format!("failed to flush upload: {}", e)))?;
                reference = Some(stored);
            }
        }
    }

    let reference =
        reference.ok_or_else(|| AppError::BadRequest("no file part in upload".to_string()))?;

    Ok(HttpResponse::Ok().json(UploadResponse {
        description,
        reference,
    }))
}

/// Serve a previously uploaded file
/// GET /uploads/{name}
pub async fn serve_upload(
    media: web::Data<MediaStore>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let name = path.into_inner();
    let file_path = media.resolve(&name)?;

    let data = match tokio::fs::read(&file_path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("file not found".to_string()))
        }
        Err(e) => return Err(AppError::Internal(format!("failed to read upload: {}", e))),
    };

    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&name))
        .body(data))
}

/// Best-effort content type from the stored extension.
fn content_type_for(name: &str) -> mime::Mime {
    let extension = name
        .rsplit('.')
        .next()
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "png" => mime::IMAGE_PNG,
        "gif" => mime::IMAGE_GIF,
        "mp4" => "video/mp4".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        "webm" => "video/webm".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        "txt" => mime::TEXT_PLAIN_UTF_8,
        "json" => mime::APPLICATION_JSON,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_match_extensions() {
        assert_eq!(content_type_for("a.jpg"), mime::IMAGE_JPEG);
        assert_eq!(content_type_for("a.JPEG"), mime::IMAGE_JPEG);
        assert_eq!(content_type_for("a.png"), mime::IMAGE_PNG);
        assert_eq!(content_type_for("archive"), mime::APPLICATION_OCTET_STREAM);
        assert_eq!(content_type_for("clip.mp4").essence_str(), "video/mp4");
    }
}
