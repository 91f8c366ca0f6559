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

//! File metadata and download models

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata for a stored file, as returned by list and reorder
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    /// User-facing filename, stable across reorders
    pub file_name: String,

    /// Content type recorded at upload
    pub content_type: String,

    /// Object size in bytes
    pub file_length: u64,

    /// Positive integer rank among stored files
    pub position: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// A downloaded file: identity plus content bytes
#[derive(Debug, Clone)]
pub struct FileDownload {
    pub file_name: String,
    pub content_type: String,
    pub content: Bytes,
}
