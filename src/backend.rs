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

//! Thin helpers over the object store: listing, existence checks, and the
//! copy-then-delete rename used by index repair and reorder.

use crate::error::{FileError, FileResult};
use futures::StreamExt;
use object_store::{path::Path as ObjectPath, ObjectMeta, ObjectStore};
use tracing::debug;

/// Storage path for an object name under the configured prefix
pub(crate) fn object_path(prefix: &str, name: &str) -> ObjectPath {
    if prefix.is_empty() {
        ObjectPath::from(name)
    } else {
        ObjectPath::from(format!("{}/{}", prefix.trim_matches('/'), name))
    }
}

/// List all objects under the prefix, sorted by location.
/// The sort keeps index repair deterministic across backends.
pub(crate) async fn list_objects(
    store: &dyn ObjectStore,
    prefix: &str,
) -> FileResult<Vec<ObjectMeta>> {
    let prefix_path = (!prefix.is_empty()).then(|| ObjectPath::from(prefix.trim_matches('/')));
    let mut stream = store.list(prefix_path.as_ref());
    let mut metas = Vec::new();

    while let Some(result) = stream.next().await {
        let meta = result
            .map_err(|e| FileError::StorageError(format!("Failed to list objects: {}", e)))?;
        metas.push(meta);
    }

    metas.sort_by(|a, b| a.location.as_ref().cmp(b.location.as_ref()));
    Ok(metas)
}

pub(crate) async fn exists(store: &dyn ObjectStore, path: &ObjectPath) -> FileResult<bool> {
    match store.head(path).await {
        Ok(_) => Ok(true),
        Err(object_store::Error::NotFound { .. }) => Ok(false),
        Err(e) => Err(FileError::StorageError(format!(
            "Failed to check object: {}",
            e
        ))),
    }
}

/// Rename an object by copy-then-delete. Not atomic: a crash between the two
/// calls leaves both objects in place.
///
/// The step is idempotent so a rename sequence can be re-run after partial
/// failure: a destination that already exists means the copy half is done and
/// only the source (if still present) needs deleting; a missing source with
/// no destination is a position gap and is skipped.
///
/// Returns whether any backend mutation was performed.
pub(crate) async fn rename(
    store: &dyn ObjectStore,
    from: &ObjectPath,
    to: &ObjectPath,
) -> FileResult<bool> {
    let source_exists = exists(store, from).await?;

    if exists(store, to).await? {
        if source_exists {
            // Finish a half-applied step
            delete_ignore_missing(store, from).await?;
            return Ok(true);
        }
        debug!(from = %from, to = %to, "rename already applied, skipping");
        return Ok(false);
    }

    if !source_exists {
        return Ok(false);
    }

    store
        .copy(from, to)
        .await
        .map_err(|e| FileError::StorageError(format!("Failed to copy object: {}", e)))?;

    delete_ignore_missing(store, from).await?;
    Ok(true)
}

async fn delete_ignore_missing(store: &dyn ObjectStore, path: &ObjectPath) -> FileResult<()> {
    match store.delete(path).await {
        Ok(()) => Ok(()),
        Err(object_store::Error::NotFound { .. }) => Ok(()),
        Err(e) => Err(FileError::StorageError(format!(
            "Failed to delete object: {}",
            e
        ))),
    }
}
