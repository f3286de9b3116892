use super::types::{DetectionResponse, ErrorResponse};
use crate::{Error, pipeline::DetectClassifyPipeline, upload::UploadStore, vision::decode_upload};
use axum::{
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Multipart field carrying the uploaded image.
pub const UPLOAD_FIELD: &str = "images";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DetectClassifyPipeline>,
    pub uploads: Arc<UploadStore>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn reject(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn error_status(e: &Error) -> StatusCode {
    match e {
        Error::Validation(_) | Error::Image(_) => StatusCode::BAD_REQUEST,
        Error::EmptyCrop { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// POST /detect_and_classify
pub async fn detect_and_classify(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Vec<DetectionResponse>>, ApiError> {
    let request_id = Uuid::new_v4();

    let Ok(mut multipart) = multipart else {
        warn!("[{}] Request is not multipart", request_id);
        return Err(reject(StatusCode::BAD_REQUEST, "No file part"));
    };

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("[{}] Malformed multipart body: {}", request_id, e);
        reject(e.status(), format!("Malformed upload: {e}"))
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        // parts without a filename are plain form values, not files
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await.map_err(|e| {
            warn!("[{}] Failed to read upload: {}", request_id, e);
            reject(e.status(), format!("Malformed upload: {e}"))
        })?;
        upload = Some((file_name, bytes));
        break;
    }

    let Some((file_name, bytes)) = upload else {
        return Err(reject(StatusCode::BAD_REQUEST, "No file part"));
    };
    if file_name.is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "No selected file"));
    }
    if !state.uploads.allows(&file_name) {
        warn!("[{}] Rejected upload {}", request_id, file_name);
        return Err(reject(StatusCode::BAD_REQUEST, "File not allowed"));
    }

    info!(
        "[{}] Received upload {} ({} bytes)",
        request_id,
        file_name,
        bytes.len()
    );

    let (saved_name, _path) = state.uploads.save(&file_name, &bytes).await.map_err(|e| match e {
        Error::Validation(_) => reject(StatusCode::BAD_REQUEST, "File not allowed"),
        other => {
            error!("[{}] Failed to store upload: {}", request_id, other);
            reject(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    })?;

    let image = decode_upload(&bytes).map_err(|e| {
        warn!("[{}] Undecodable image {}: {}", request_id, saved_name, e);
        reject(StatusCode::BAD_REQUEST, format!("Invalid image: {e}"))
    })?;

    match state.pipeline.process(&saved_name, &image).await {
        Ok(results) => {
            info!("[{}] Returning {} result(s)", request_id, results.len());
            Ok(Json(results.into_iter().map(DetectionResponse::from).collect()))
        }
        Err(e) => {
            let status = error_status(&e);
            if status.is_server_error() {
                error!("[{}] Pipeline failed for {}: {}", request_id, saved_name, e);
            } else {
                warn!("[{}] Pipeline rejected {}: {}", request_id, saved_name, e);
            }
            Err(reject(status, e.to_string()))
        }
    }
}
