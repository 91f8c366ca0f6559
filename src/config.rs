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

//! Service configuration: storage backend selection and upload policy

use crate::error::{FileError, FileResult, UploadRejection};
use object_store::{
    aws::AmazonS3Builder,
    azure::MicrosoftAzureBuilder,
    local::LocalFileSystem,
    memory::InMemory,
    ObjectStore,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;

/// File service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend type (azure, s3, minio, local, memory)
    pub backend: String,

    /// Container/bucket name
    pub container: String,

    /// Endpoint URL (for MinIO or custom S3-compatible)
    pub endpoint: Option<String>,

    /// Region (for S3)
    pub region: Option<String>,

    /// Access key ID (can be from env var)
    pub access_key_id: Option<String>,

    /// Secret access key (should be from env var, not config file)
    pub secret_access_key: Option<String>,

    /// Use SSL/TLS
    pub use_ssl: bool,

    /// Azure-specific: Account name
    pub azure_account_name: Option<String>,

    /// Azure-specific: Account key
    pub azure_account_key: Option<String>,

    /// Path prefix for all objects inside the container (default: none)
    pub prefix: String,

    /// Base URL reported back as an uploaded file's public location.
    /// Derived from the backend settings when unset.
    pub public_base_url: Option<String>,

    /// Maximum allowed upload size in bytes
    pub max_file_size: u64,

    /// Content types accepted for upload
    pub allowed_content_types: Vec<String>,

    /// Listen address for the HTTP server
    pub http_addr: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: "minio".to_string(),
            container: "pdf-files".to_string(),
            endpoint: Some("http://localhost:9000".to_string()),
            region: None,
            access_key_id: None,
            secret_access_key: None,
            use_ssl: false,
            azure_account_name: None,
            azure_account_key: None,
            prefix: String::new(),
            public_base_url: None,
            max_file_size: 5 * 1024 * 1024,
            allowed_content_types: vec!["application/pdf".to_string()],
            http_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

impl StoreConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: env::var("BLOB_BACKEND").unwrap_or(defaults.backend),
            container: env::var("BLOB_CONTAINER").unwrap_or(defaults.container),
            endpoint: env::var("BLOB_ENDPOINT").ok().or(defaults.endpoint),
            region: env::var("BLOB_REGION").ok(),
            access_key_id: env::var("BLOB_ACCESS_KEY_ID")
                .or_else(|_| env::var("AWS_ACCESS_KEY_ID"))
                .ok(),
            secret_access_key: env::var("BLOB_SECRET_ACCESS_KEY")
                .or_else(|_| env::var("AWS_SECRET_ACCESS_KEY"))
                .ok(),
            use_ssl: env::var("BLOB_USE_SSL")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            azure_account_name: env::var("AZURE_ACCOUNT_NAME").ok(),
            azure_account_key: env::var("AZURE_ACCOUNT_KEY").ok(),
            prefix: env::var("BLOB_PREFIX").unwrap_or(defaults.prefix),
            public_base_url: env::var("BLOB_PUBLIC_BASE_URL").ok(),
            max_file_size: env::var("PDF_MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_file_size),
            allowed_content_types: env::var("PDF_ALLOWED_CONTENT_TYPES")
                .map(|v| {
                    v.split(',')
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.allowed_content_types),
            http_addr: env::var("PDF_HTTP_ADDR").unwrap_or(defaults.http_addr),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> FileResult<()> {
        match self.backend.as_str() {
            "azure" | "s3" | "minio" | "local" | "memory" => {}
            _ => {
                return Err(FileError::ConfigError(format!(
                    "Invalid backend: {}",
                    self.backend
                )))
            }
        }

        if self.container.is_empty() && self.backend != "local" && self.backend != "memory" {
            return Err(FileError::ConfigError("container is required".to_string()));
        }

        if self.backend == "minio" && self.endpoint.is_none() {
            return Err(FileError::ConfigError(
                "endpoint is required for MinIO backend".to_string(),
            ));
        }

        if self.backend == "s3" && self.region.is_none() {
            return Err(FileError::ConfigError(
                "region is required for S3 backend".to_string(),
            ));
        }

        if self.backend == "azure" && self.azure_account_name.is_none() {
            return Err(FileError::ConfigError(
                "azure_account_name is required for Azure backend".to_string(),
            ));
        }

        if self.max_file_size == 0 {
            return Err(FileError::ConfigError(
                "max_file_size must be positive".to_string(),
            ));
        }

        if self.allowed_content_types.is_empty() {
            return Err(FileError::ConfigError(
                "at least one allowed content type is required".to_string(),
            ));
        }

        Ok(())
    }

    /// Get access key ID (from config or env)
    pub fn get_access_key_id(&self) -> Option<String> {
        self.access_key_id
            .clone()
            .or_else(|| env::var("BLOB_ACCESS_KEY_ID").ok())
            .or_else(|| env::var("AWS_ACCESS_KEY_ID").ok())
    }

    /// Get secret access key (from config or env)
    pub fn get_secret_access_key(&self) -> Option<String> {
        self.secret_access_key
            .clone()
            .or_else(|| env::var("BLOB_SECRET_ACCESS_KEY").ok())
            .or_else(|| env::var("AWS_SECRET_ACCESS_KEY").ok())
    }

    /// Check an upload against the size and content-type policy.
    /// Both violations are collected so the caller can report them together.
    pub fn validate_upload(&self, content_type: &str, file_length: u64) -> UploadRejection {
        let mut rejection = UploadRejection::default();

        if file_length > self.max_file_size {
            rejection.file_size_too_big = Some(format!(
                "File size is bigger than maximum allowed file size {}",
                self.max_file_size
            ));
        }

        if !self.allowed_content_types.iter().any(|t| t == content_type) {
            rejection.invalid_file_type = Some("Input file type is not supported".to_string());
        }

        rejection
    }

    /// Public location URL for a stored object, as returned to upload clients.
    pub fn public_url(&self, physical_name: &str) -> String {
        let base = match &self.public_base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => match self.backend.as_str() {
                "azure" => format!(
                    "https://{}.blob.core.windows.net/{}",
                    self.azure_account_name.as_deref().unwrap_or_default(),
                    self.container
                ),
                "s3" => format!(
                    "https://{}.s3.{}.amazonaws.com",
                    self.container,
                    self.region.as_deref().unwrap_or_default()
                ),
                "minio" => format!(
                    "{}/{}",
                    self.endpoint.as_deref().unwrap_or_default().trim_end_matches('/'),
                    self.container
                ),
                _ => format!("/{}", self.container),
            },
        };

        if self.prefix.is_empty() {
            format!("{}/{}", base, physical_name)
        } else {
            format!("{}/{}/{}", base, self.prefix.trim_matches('/'), physical_name)
        }
    }

    /// Build the object store for the configured backend
    pub fn build_object_store(&self) -> FileResult<Arc<dyn ObjectStore>> {
        let store: Arc<dyn ObjectStore> = match self.backend.as_str() {
            "s3" => {
                let mut builder = AmazonS3Builder::new().with_bucket_name(&self.container);

                if let Some(ref region) = self.region {
                    builder = builder.with_region(region);
                }

                if let Some(access_key_id) = self.get_access_key_id() {
                    builder = builder.with_access_key_id(&access_key_id);
                }

                if let Some(secret_access_key) = self.get_secret_access_key() {
                    builder = builder.with_secret_access_key(&secret_access_key);
                }

                Arc::new(builder.build().map_err(|e| {
                    FileError::ConfigError(format!("Failed to build S3 store: {}", e))
                })?)
            }
            "minio" => {
                let endpoint = self.endpoint.as_deref().ok_or_else(|| {
                    FileError::ConfigError("endpoint required for MinIO".to_string())
                })?;

                let mut builder = AmazonS3Builder::new()
                    .with_bucket_name(&self.container)
                    .with_endpoint(endpoint)
                    .with_allow_http(!self.use_ssl);

                if let Some(access_key_id) = self.get_access_key_id() {
                    builder = builder.with_access_key_id(&access_key_id);
                }

                if let Some(secret_access_key) = self.get_secret_access_key() {
                    builder = builder.with_secret_access_key(&secret_access_key);
                }

                Arc::new(builder.build().map_err(|e| {
                    FileError::ConfigError(format!("Failed to build MinIO store: {}", e))
                })?)
            }
            "azure" => {
                let account = self.azure_account_name.as_deref().ok_or_else(|| {
                    FileError::ConfigError("azure_account_name required".to_string())
                })?;

                let mut builder = MicrosoftAzureBuilder::new()
                    .with_account(account)
                    .with_container_name(&self.container);

                if let Some(ref key) = self.azure_account_key {
                    builder = builder.with_access_key(key);
                }

                Arc::new(builder.build().map_err(|e| {
                    FileError::ConfigError(format!("Failed to build Azure store: {}", e))
                })?)
            }
            "local" => {
                // Local filesystem for testing
                let store = match self.endpoint.as_deref() {
                    Some(root) => LocalFileSystem::new_with_prefix(root).map_err(|e| {
                        FileError::ConfigError(format!(
                            "Failed to create local filesystem store: {}",
                            e
                        ))
                    })?,
                    None => LocalFileSystem::new(),
                };
                Arc::new(store)
            }
            "memory" => Arc::new(InMemory::new()),
            _ => {
                return Err(FileError::ConfigError(format!(
                    "Unsupported backend: {}",
                    self.backend
                )))
            }
        };

        Ok(store)
    }
}
