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

//! Unit tests for the file service using the in-memory backend

use bytes::Bytes;
use object_store::{memory::InMemory, path::Path as ObjectPath, ObjectStore, PutPayload};
use plexpdf::{FileError, FileService, StoreConfig};
use std::sync::Arc;

fn test_config() -> StoreConfig {
    StoreConfig {
        backend: "memory".to_string(),
        container: "pdfs".to_string(),
        endpoint: None,
        prefix: String::new(),
        max_file_size: 5 * 1024 * 1024,
        allowed_content_types: vec!["application/pdf".to_string()],
        ..Default::default()
    }
}

async fn create_test_service() -> Arc<FileService> {
    let store = Arc::new(InMemory::new());
    let service = FileService::with_object_store(test_config(), store)
        .await
        .unwrap();
    Arc::new(service)
}

async fn upload_pdf(service: &FileService, name: &str, content: &[u8]) -> String {
    service
        .upload(name, "application/pdf", Bytes::copy_from_slice(content))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_upload_and_download_round_trip() {
    let service = create_test_service().await;

    let content = b"%PDF-1.4 round trip".to_vec();
    upload_pdf(&service, "report.pdf", &content).await;

    let file = service.download("report.pdf").await.unwrap();
    assert_eq!(file.content.as_ref(), content.as_slice());
    assert_eq!(file.content_type, "application/pdf");
    assert_eq!(file.file_name, "report.pdf");
}

#[tokio::test]
async fn test_upload_assigns_sequential_positions() {
    let service = create_test_service().await;

    let location = upload_pdf(&service, "a.pdf", b"a").await;
    assert!(location.ends_with("/1-a.pdf"), "got {}", location);

    let location = upload_pdf(&service, "b.pdf", b"b").await;
    assert!(location.ends_with("/2-b.pdf"), "got {}", location);

    let files = service.list().await.unwrap();
    let positions: Vec<u64> = files.iter().map(|f| f.position).collect();
    assert_eq!(positions, vec![1, 2]);
}

#[tokio::test]
async fn test_upload_rejects_invalid_content_type() {
    let service = create_test_service().await;

    let result = service
        .upload("data.json", "application/json", Bytes::from_static(b"{}"))
        .await;

    match result {
        Err(FileError::UploadRejected(rejection)) => {
            assert!(rejection.file_size_too_big.is_none());
            assert_eq!(
                rejection.invalid_file_type.as_deref(),
                Some("Input file type is not supported")
            );
        }
        other => panic!("expected UploadRejected, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_upload_rejects_oversize_file() {
    let mut config = test_config();
    config.max_file_size = 8;
    let store = Arc::new(InMemory::new());
    let service = FileService::with_object_store(config, store).await.unwrap();

    let result = service
        .upload(
            "big.pdf",
            "application/pdf",
            Bytes::from_static(b"0123456789abcdef"),
        )
        .await;

    match result {
        Err(FileError::UploadRejected(rejection)) => {
            assert!(rejection.invalid_file_type.is_none());
            assert!(rejection
                .file_size_too_big
                .as_deref()
                .unwrap()
                .contains("maximum allowed file size 8"));
        }
        other => panic!("expected UploadRejected, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_upload_reports_both_violations_together() {
    let mut config = test_config();
    config.max_file_size = 8;
    let store = Arc::new(InMemory::new());
    let service = FileService::with_object_store(config, store).await.unwrap();

    let result = service
        .upload(
            "big.json",
            "application/json",
            Bytes::from_static(b"0123456789abcdef"),
        )
        .await;

    match result {
        Err(FileError::UploadRejected(rejection)) => {
            assert!(rejection.file_size_too_big.is_some());
            assert!(rejection.invalid_file_type.is_some());
        }
        other => panic!("expected UploadRejected, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_download_empty_name() {
    let service = create_test_service().await;
    assert!(matches!(
        service.download("").await,
        Err(FileError::NameRequired)
    ));
}

#[tokio::test]
async fn test_download_missing_file() {
    let service = create_test_service().await;
    assert!(matches!(
        service.download("missing.pdf").await,
        Err(FileError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_list_empty_backend() {
    let service = create_test_service().await;
    let files = service.list().await.unwrap();
    assert!(files.is_empty());
}

#[tokio::test]
async fn test_list_orders_by_position() {
    // Seed the backend out of order; listing must come back position-sorted
    let store = Arc::new(InMemory::new());
    store
        .put(&ObjectPath::from("3-c.pdf"), PutPayload::from_static(b"c"))
        .await
        .unwrap();
    store
        .put(&ObjectPath::from("1-a.pdf"), PutPayload::from_static(b"a"))
        .await
        .unwrap();
    store
        .put(&ObjectPath::from("2-b.pdf"), PutPayload::from_static(b"b"))
        .await
        .unwrap();

    let service = FileService::with_object_store(test_config(), store)
        .await
        .unwrap();

    let files = service.list().await.unwrap();
    let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
    let positions: Vec<u64> = files.iter().map(|f| f.position).collect();
    assert_eq!(names, vec!["a.pdf", "b.pdf", "c.pdf"]);
    assert_eq!(positions, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_delete_leaves_position_gap() {
    let service = create_test_service().await;
    upload_pdf(&service, "a.pdf", b"a").await;
    upload_pdf(&service, "b.pdf", b"b").await;
    upload_pdf(&service, "c.pdf", b"c").await;

    service.delete("b.pdf").await.unwrap();

    let files = service.list().await.unwrap();
    let positions: Vec<u64> = files.iter().map(|f| f.position).collect();
    assert_eq!(positions, vec![1, 3]);

    // Next upload takes max + 1, not the gap
    upload_pdf(&service, "d.pdf", b"d").await;
    let files = service.list().await.unwrap();
    let positions: Vec<u64> = files.iter().map(|f| f.position).collect();
    assert_eq!(positions, vec![1, 3, 4]);
}

#[tokio::test]
async fn test_delete_missing_file() {
    let service = create_test_service().await;
    assert!(matches!(
        service.delete("missing.pdf").await,
        Err(FileError::NotFound(_))
    ));
    assert!(matches!(
        service.delete("").await,
        Err(FileError::NameRequired)
    ));
}

#[tokio::test]
async fn test_delete_removes_object() {
    let service = create_test_service().await;
    upload_pdf(&service, "a.pdf", b"a").await;

    let physical = service.delete("a.pdf").await.unwrap();
    assert_eq!(physical, "1-a.pdf");

    assert!(!service.exists("a.pdf").await.unwrap());
    assert!(matches!(
        service.download("a.pdf").await,
        Err(FileError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_index_build_repairs_unprefixed_names() {
    // An object written outside the service gets a position assigned and a
    // physical rename at startup
    let store = Arc::new(InMemory::new());
    store
        .put(
            &ObjectPath::from("1-a.pdf"),
            PutPayload::from_static(b"a"),
        )
        .await
        .unwrap();
    store
        .put(
            &ObjectPath::from("legacy.pdf"),
            PutPayload::from_static(b"x"),
        )
        .await
        .unwrap();

    let service = FileService::with_object_store(test_config(), store.clone())
        .await
        .unwrap();

    let files = service.list().await.unwrap();
    assert_eq!(files.len(), 2);
    let positions: Vec<u64> = files.iter().map(|f| f.position).collect();
    assert_eq!(positions, vec![1, 2]);
    assert_eq!(files[1].file_name, "legacy.pdf");

    // The rename is physical, not just in-memory
    assert!(store.head(&ObjectPath::from("2-legacy.pdf")).await.is_ok());
    assert!(store.head(&ObjectPath::from("legacy.pdf")).await.is_err());
}

#[tokio::test]
async fn test_index_build_repairs_position_collisions() {
    let store = Arc::new(InMemory::new());
    store
        .put(&ObjectPath::from("1-a.pdf"), PutPayload::from_static(b"a"))
        .await
        .unwrap();
    store
        .put(&ObjectPath::from("1-b.pdf"), PutPayload::from_static(b"b"))
        .await
        .unwrap();

    let service = FileService::with_object_store(test_config(), store)
        .await
        .unwrap();

    let files = service.list().await.unwrap();
    let mut positions: Vec<u64> = files.iter().map(|f| f.position).collect();
    positions.dedup();
    assert_eq!(files.len(), 2);
    assert_eq!(positions.len(), 2, "positions must be unique");
}

#[tokio::test]
async fn test_upload_stores_under_prefix() {
    let mut config = test_config();
    config.prefix = "docs".to_string();
    let store = Arc::new(InMemory::new());
    let service = FileService::with_object_store(config, store.clone())
        .await
        .unwrap();

    upload_pdf(&service, "a.pdf", b"a").await;

    assert!(store.head(&ObjectPath::from("docs/1-a.pdf")).await.is_ok());
    let files = service.list().await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name, "a.pdf");
}
