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

//! Error types for the file management service

use thiserror::Error;

/// Result type for file operations
pub type FileResult<T> = Result<T, FileError>;

/// Upload policy violations. Size and content-type checks are evaluated
/// independently so a single request can report both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadRejection {
    pub file_size_too_big: Option<String>,
    pub invalid_file_type: Option<String>,
}

impl UploadRejection {
    pub fn is_empty(&self) -> bool {
        self.file_size_too_big.is_none() && self.invalid_file_type.is_none()
    }
}

/// Error types for file management operations
#[derive(Error, Debug)]
pub enum FileError {
    #[error("FileName not provided")]
    NameRequired,

    #[error("File Doesn't exist")]
    NotFound(String),

    #[error("File name or position is invalid")]
    InvalidRequest,

    #[error("Not enough files to re-order")]
    InsufficientFiles,

    #[error("upload rejected")]
    UploadRejected(UploadRejection),

    #[error("Unable to delete file : {0}")]
    DeleteFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Object store error: {0}")]
    ObjectStoreError(#[from] object_store::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<&str> for FileError {
    fn from(s: &str) -> Self {
        FileError::StorageError(s.to_string())
    }
}

impl From<String> for FileError {
    fn from(s: String) -> Self {
        FileError::StorageError(s)
    }
}
