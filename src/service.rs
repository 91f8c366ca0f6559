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

//! File service facade: upload, download, list, delete, reorder.
//!
//! Mutating operations (upload, delete, reorder) hold the index write lock
//! for the whole operation, including the backend calls, so writers are
//! totally ordered per process: positions assigned under the lock never
//! collide and reorder plans never interleave. Download only takes a read
//! guard to resolve the name.

use bytes::Bytes;
use object_store::{
    path::Path as ObjectPath, Attribute, AttributeValue, Attributes, GetOptions, ObjectStore,
    PutOptions,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    backend,
    config::StoreConfig,
    error::{FileError, FileResult},
    index::{self, OrderingIndex},
    model::{FileDownload, FileInfo},
    reorder,
};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// File management service over a blob storage backend
pub struct FileService {
    config: StoreConfig,
    store: Arc<dyn ObjectStore>,
    index: RwLock<OrderingIndex>,
}

impl FileService {
    /// Create a new file service for the configured backend.
    ///
    /// Builds the ordering index from the current backend state; a backend
    /// failure here is fatal (the backend is unreachable or the listing is
    /// unreadable).
    pub async fn new(config: StoreConfig) -> FileResult<Self> {
        config.validate()?;
        let store = config.build_object_store()?;
        Self::with_object_store(config, store).await
    }

    /// Create a new file service with a custom object store (for testing)
    pub async fn with_object_store(
        config: StoreConfig,
        store: Arc<dyn ObjectStore>,
    ) -> FileResult<Self> {
        let index = OrderingIndex::build(store.as_ref(), &config.prefix).await?;
        info!(files = index.len(), "ordering index built");

        Ok(Self {
            config,
            store,
            index: RwLock::new(index),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Upload a file at the next available position.
    ///
    /// Returns the stored object's public location. Size and content-type
    /// policy violations are reported together in one rejection.
    #[instrument(skip(self, content), fields(size = content.len()))]
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        content: Bytes,
    ) -> FileResult<String> {
        if file_name.is_empty() {
            return Err(FileError::NameRequired);
        }

        let rejection = self
            .config
            .validate_upload(content_type, content.len() as u64);
        if !rejection.is_empty() {
            return Err(FileError::UploadRejected(rejection));
        }

        let mut index = self.index.write().await;
        let position = index.next_position();
        let physical = index::physical_name(position, file_name);
        let path = backend::object_path(&self.config.prefix, &physical);

        self.put_with_content_type(&path, content, content_type)
            .await?;
        index.record(file_name, position, physical.clone());

        info!(file = %file_name, position, "file uploaded");
        Ok(self.config.public_url(&physical))
    }

    /// Download a file by its logical name
    pub async fn download(&self, file_name: &str) -> FileResult<FileDownload> {
        if file_name.is_empty() {
            return Err(FileError::NameRequired);
        }

        let physical = {
            let index = self.index.read().await;
            index
                .resolve(file_name)
                .map(|(_, physical)| physical.to_string())
        }
        .ok_or_else(|| FileError::NotFound(file_name.to_string()))?;

        let path = backend::object_path(&self.config.prefix, &physical);
        let result = self.store.get(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => FileError::NotFound(file_name.to_string()),
            e => {
                error!(file = %file_name, error = %e, "failed to download file");
                FileError::StorageError(format!("Failed to download file: {}", e))
            }
        })?;

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|v| v.as_ref().to_string())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let content = result
            .bytes()
            .await
            .map_err(|e| FileError::StorageError(format!("Failed to read file bytes: {}", e)))?;

        Ok(FileDownload {
            file_name: file_name.to_string(),
            content_type,
            content,
        })
    }

    /// List all files ordered by position ascending
    pub async fn list(&self) -> FileResult<Vec<FileInfo>> {
        self.collect_files().await
    }

    /// Delete a file by its logical name.
    ///
    /// The vacated position is left as a gap; remaining files keep their
    /// positions.
    #[instrument(skip(self))]
    pub async fn delete(&self, file_name: &str) -> FileResult<String> {
        if file_name.is_empty() {
            return Err(FileError::NameRequired);
        }

        let mut index = self.index.write().await;
        let Some((position, physical)) = index
            .resolve(file_name)
            .map(|(position, physical)| (position, physical.to_string()))
        else {
            return Err(FileError::NotFound(file_name.to_string()));
        };

        let path = backend::object_path(&self.config.prefix, &physical);
        if !backend::exists(self.store.as_ref(), &path).await? {
            return Err(FileError::NotFound(file_name.to_string()));
        }

        self.store.delete(&path).await.map_err(|e| {
            error!(file = %file_name, error = %e, "failed to delete file");
            FileError::DeleteFailed(physical.clone())
        })?;
        index.remove(file_name);

        info!(file = %file_name, position, "file deleted");
        Ok(physical)
    }

    /// Move a file to a target position, renumbering the files in between.
    ///
    /// A target beyond the current maximum clamps to the maximum. Returns
    /// the new ordering re-derived from the backend rather than from
    /// in-memory state.
    #[instrument(skip(self))]
    pub async fn reorder(&self, file_name: &str, position: u64) -> FileResult<Vec<FileInfo>> {
        if file_name.is_empty() || position == 0 {
            return Err(FileError::InvalidRequest);
        }

        let mut index = self.index.write().await;
        if index.position_of(file_name).is_none() {
            return Err(FileError::NotFound(file_name.to_string()));
        }
        if index.len() < 2 {
            return Err(FileError::InsufficientFiles);
        }

        let max = index.max_position().unwrap_or(1);
        let target = position.min(max);

        let plan = reorder::plan_reorder(&index, file_name, target)?;
        if !plan.is_empty() {
            info!(file = %file_name, target, steps = plan.len(), "reordering");
            if let Err(e) = reorder::execute(self.store.as_ref(), &self.config.prefix, &plan).await
            {
                // Partial renames stay committed; resync the index with the
                // backend's current state before surfacing the error.
                match self.collect_files().await {
                    Ok(files) => *index = Self::index_from_files(&files),
                    Err(refresh_err) => {
                        warn!(error = %refresh_err, "could not refresh index after failed reorder")
                    }
                }
                return Err(e);
            }
        } else {
            debug!(file = %file_name, target, "already at target position");
        }

        let files = self.collect_files().await?;
        *index = Self::index_from_files(&files);

        Ok(files)
    }

    /// Check whether a logical name resolves to a stored object
    pub async fn exists(&self, file_name: &str) -> FileResult<bool> {
        let physical = {
            let index = self.index.read().await;
            index
                .resolve(file_name)
                .map(|(_, physical)| physical.to_string())
        };
        match physical {
            Some(physical) => {
                let path = backend::object_path(&self.config.prefix, &physical);
                backend::exists(self.store.as_ref(), &path).await
            }
            None => Ok(false),
        }
    }

    fn index_from_files(files: &[FileInfo]) -> OrderingIndex {
        OrderingIndex::from_entries(
            files
                .iter()
                .map(|f| (f.position, index::physical_name(f.position, &f.file_name))),
        )
    }

    /// Position-sorted metadata for everything currently in the backend
    async fn collect_files(&self) -> FileResult<Vec<FileInfo>> {
        let metas = backend::list_objects(self.store.as_ref(), &self.config.prefix).await?;
        let mut files = Vec::new();

        for meta in &metas {
            let Some(name) = meta.location.filename() else {
                continue;
            };
            let Some((position, logical)) = index::parse_physical_name(name) else {
                warn!(object = %meta.location, "object without position prefix in listing, skipping");
                continue;
            };

            let content_type = self.content_type_of(&meta.location).await;
            files.push(FileInfo {
                file_name: logical.to_string(),
                content_type,
                file_length: meta.size as u64,
                position,
                last_modified: Some(meta.last_modified),
            });
        }

        files.sort_by_key(|f| f.position);
        Ok(files)
    }

    async fn content_type_of(&self, location: &ObjectPath) -> String {
        let options = GetOptions {
            head: true,
            ..Default::default()
        };
        match self.store.get_opts(location, options).await {
            Ok(result) => result
                .attributes
                .get(&Attribute::ContentType)
                .map(|v| v.as_ref().to_string())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            Err(e) => {
                debug!(object = %location, error = %e, "could not read content type attribute");
                DEFAULT_CONTENT_TYPE.to_string()
            }
        }
    }

    /// Store an object with its content type as an object attribute.
    /// Backends that do not persist attributes (local filesystem) fall back
    /// to a plain put; such objects read back as octet-stream.
    async fn put_with_content_type(
        &self,
        path: &ObjectPath,
        content: Bytes,
        content_type: &str,
    ) -> FileResult<()> {
        let attributes = Attributes::from_iter([(
            Attribute::ContentType,
            AttributeValue::from(content_type.to_string()),
        )]);
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        match self.store.put_opts(path, content.clone().into(), options).await {
            Ok(_) => Ok(()),
            Err(object_store::Error::NotSupported { .. }) | Err(object_store::Error::NotImplemented) => {
                self.store
                    .put(path, content.into())
                    .await
                    .map_err(|e| FileError::StorageError(format!("Failed to upload file: {}", e)))?;
                Ok(())
            }
            Err(e) => {
                error!(object = %path, error = %e, "failed to upload file");
                Err(FileError::StorageError(format!(
                    "Failed to upload file: {}",
                    e
                )))
            }
        }
    }
}
