// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright (C) 2025 Shahzad A. Bhatti <bhatti@plexobject.com>
//
// This file is part of PlexPdf.
//
// PlexPdf is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 2.1 of the License, or
// (at your option) any later version.
//
// PlexPdf is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with PlexPdf. If not, see <https://www.gnu.org/licenses/>.

//! Axum HTTP handlers for the file management API:
//! - GET /{file_name} - Download a file
//! - POST /uploadfile - Upload a file (multipart/form-data, field `uploadedFile`)
//! - GET /list - List files ordered by position
//! - DELETE /delete/{file_name} - Delete a file
//! - GET /reorder?filename=&filePosition= - Move a file to a position
//!
//! Every failure is surfaced as 400 with a human-readable message; storage
//! failures are additionally logged with full detail server-side.

use crate::{FileError, FileService};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

/// Create the Axum router for the file management endpoints
pub fn create_router(service: Arc<FileService>) -> Router {
    // Size policy is enforced by validation, not by the framework limit
    let body_limit = service
        .config()
        .max_file_size
        .saturating_mul(2)
        .saturating_add(1024 * 1024) as usize;

    Router::new()
        .route("/health", get(handle_health))
        .route("/list", get(handle_list))
        .route("/uploadfile", post(handle_upload))
        .route("/reorder", get(handle_reorder))
        .route("/delete/:file_name", delete(handle_delete))
        .route("/:file_name", get(handle_download))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(service)
}

async fn handle_health() -> &'static str {
    "OK"
}

/// Handle raw file download
async fn handle_download(
    State(service): State<Arc<FileService>>,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse, FileError> {
    let file = service.download(&file_name).await?;

    let content_disposition = format!("attachment; filename=\"{}\"", file.file_name);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type),
            (header::CONTENT_DISPOSITION, content_disposition),
            (header::CONTENT_LENGTH, file.content.len().to_string()),
        ],
        file.content,
    ))
}

/// Handle file upload (multipart/form-data)
async fn handle_upload(
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<Response, FileError> {
    let mut upload: Option<(String, String, bytes::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| FileError::InvalidInput(format!("Failed to parse multipart: {}", e)))?
    {
        if field.name() != Some("uploadedFile") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(sanitize_file_name)
            .unwrap_or_default();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| FileError::InvalidInput(format!("Failed to read file data: {}", e)))?;

        upload = Some((file_name, content_type, data));
    }

    let Some((file_name, content_type, data)) = upload else {
        let body = json!({ "NoFile": ["file not uploaded"] });
        return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
    };

    let location = service.upload(&file_name, &content_type, data).await?;
    Ok((StatusCode::OK, location).into_response())
}

/// Handle file list request
async fn handle_list(
    State(service): State<Arc<FileService>>,
) -> Result<impl IntoResponse, FileError> {
    let files = service.list().await?;
    Ok(Json(files))
}

/// Handle file deletion
async fn handle_delete(
    State(service): State<Arc<FileService>>,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse, FileError> {
    let physical = service.delete(&file_name).await?;
    Ok((
        StatusCode::OK,
        format!("File : {} deleted successfully", physical),
    ))
}

#[derive(Debug, Deserialize)]
struct ReorderParams {
    filename: Option<String>,
    #[serde(rename = "filePosition")]
    file_position: Option<u64>,
}

/// Handle file reorder request
async fn handle_reorder(
    State(service): State<Arc<FileService>>,
    Query(params): Query<ReorderParams>,
) -> Result<impl IntoResponse, FileError> {
    let filename = params.filename.unwrap_or_default();
    let position = params.file_position.unwrap_or(0);

    let files = service.reorder(&filename, position).await?;
    Ok(Json(files))
}

/// Strip any path components from a client-supplied filename
fn sanitize_file_name(name: &str) -> String {
    name.rsplit(['/', '\\']).next().unwrap_or(name).to_string()
}

/// Convert FileError to an HTTP response.
///
/// Every failure maps to 400: validation and not-found errors carry their
/// own message, upload policy violations become a field-error map, and
/// backend failures are logged in full and surfaced with generic text.
impl IntoResponse for FileError {
    fn into_response(self) -> Response {
        match &self {
            FileError::UploadRejected(rejection) => {
                let mut body = serde_json::Map::new();
                if let Some(message) = &rejection.file_size_too_big {
                    body.insert("FileSizeTooBig".to_string(), json!([message]));
                }
                if let Some(message) = &rejection.invalid_file_type {
                    body.insert("InvalidFileType".to_string(), json!([message]));
                }
                (StatusCode::BAD_REQUEST, Json(serde_json::Value::Object(body))).into_response()
            }
            FileError::StorageError(_)
            | FileError::ObjectStoreError(_)
            | FileError::ConfigError(_)
            | FileError::IoError(_)
            | FileError::SerializationError(_) => {
                error!(error = %self, "request failed");
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            _ => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
        }
    }
}
