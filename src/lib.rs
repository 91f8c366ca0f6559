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

//! PlexPdf Ordered File Management Service
//!
//! ## Purpose
//! Lets clients upload, download, list, delete, and reorder PDF files stored
//! in a blob storage backend. Supports multiple backends: S3, MinIO,
//! Azure Blob Storage, local filesystem.
//!
//! ## Architecture
//! - **Blob Backend**: Binary data stored in an S3-compatible/Azure backend
//!   via the `object_store` crate
//! - **Ordering**: Each object is stored under a physical name of the form
//!   `{position}-{logical_name}`; a position is a positive integer rank
//! - **Ordering Index**: In-memory bidirectional mapping position <-> name,
//!   built once at startup and updated incrementally on each mutation
//! - **Reorder**: Moving a file to a new position renumbers the files in
//!   between through a planned sequence of copy-then-delete renames
//!
//! ## Usage
//! ```rust,no_run
//! use plexpdf::{FileService, StoreConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = StoreConfig::default();
//! config.backend = "minio".to_string();
//! config.container = "pdf-files".to_string();
//! config.endpoint = Some("http://localhost:9000".to_string());
//!
//! let service = FileService::new(config).await?;
//!
//! // Upload a file
//! let location = service
//!     .upload("report.pdf", "application/pdf", b"%PDF-1.4".as_ref().into())
//!     .await?;
//!
//! // Move it to the front of the list
//! let ordered = service.reorder("report.pdf", 1).await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod index;
pub mod model;
pub mod reorder;
pub mod server;
pub mod service;

pub use config::StoreConfig;
pub use error::{FileError, FileResult, UploadRejection};
pub use index::OrderingIndex;
pub use model::{FileDownload, FileInfo};
pub use service::FileService;
