//! Catalog of uploaded payloads, addressed by per-shelf numeric ids.
//!
//! The library is independent of where files sit in the drive tree. Records
//! are only ever appended; ids are never handed out twice, even across
//! restarts, because the counters live in the persisted document.

pub mod data_url;
mod record;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::store::{self, Store, StoreError};

pub use record::{
    ImageRecord, LibraryDocument, MediaRecord, RecordKind, Shelf, TextFormat, TextRecord,
};

/// Store key of the library document.
pub const LIBRARY_DOCUMENT_KEY: &str = "media_library_data";

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, LibraryError>;

/// Source of upload timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Clone)]
pub struct MediaLibrary {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl MediaLibrary {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Current document, or an empty one if nothing usable is stored.
    pub fn document(&self) -> LibraryDocument {
        store::read_document(self.store.as_ref(), LIBRARY_DOCUMENT_KEY).unwrap_or_default()
    }

    fn save(&self, document: &LibraryDocument) -> Result<()> {
        store::write_document(self.store.as_ref(), LIBRARY_DOCUMENT_KEY, document)?;
        Ok(())
    }

    /// Hands out the next id of `shelf` and persists the bump right away.
    ///
    /// A counter that lags behind the stored records is moved past them.
    pub fn next_id(&self, shelf: Shelf) -> Result<u64> {
        let mut document = self.document();
        let floor = document.highest_id(shelf) + 1;
        let counter = document.counter_mut(shelf);
        let id = (*counter).max(floor);
        *counter = id + 1;
        self.save(&document)?;
        Ok(id)
    }

    pub fn save_image(
        &self,
        name: &str,
        data_url: &str,
        mime_type: &str,
        description: Option<&str>,
    ) -> Result<ImageRecord> {
        let id = self.next_id(Shelf::Image)?;
        let now = self.clock.now();
        let extension = mime_type
            .split_once('/')
            .map(|(_, subtype)| subtype)
            .filter(|subtype| !subtype.is_empty())
            .unwrap_or("png");
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(name);

        let record = ImageRecord {
            id,
            filename: format!("photo_{id}_{}.{extension}", now.timestamp_millis()),
            original_name: name.to_string(),
            mime_type: mime_type.to_string(),
            data: data_url.to_string(),
            description: description.to_string(),
            upload_date: now,
            size: data_url::payload_size(data_url),
        };

        let mut document = self.document();
        document.images.push(record.clone());
        self.save(&document)?;
        debug!(id, filename = %record.filename, "saved image");
        Ok(record)
    }

    pub fn save_text(&self, name: &str, content: &str, mime_type: &str) -> Result<TextRecord> {
        let mime_type = if mime_type.trim().is_empty() {
            "text/plain"
        } else {
            mime_type
        };
        self.push_text(
            name,
            content,
            "text",
            "txt",
            TextFormat::Text {
                mime_type: mime_type.to_string(),
            },
        )
    }

    pub fn save_code(&self, name: &str, content: &str, language: &str) -> Result<TextRecord> {
        self.push_text(
            name,
            content,
            "code",
            language,
            TextFormat::Code {
                language: language.to_string(),
            },
        )
    }

    fn push_text(
        &self,
        name: &str,
        content: &str,
        prefix: &str,
        extension: &str,
        format: TextFormat,
    ) -> Result<TextRecord> {
        let id = self.next_id(Shelf::Text)?;
        let now = self.clock.now();
        let record = TextRecord {
            id,
            filename: format!("{prefix}_{id}_{}.{extension}", now.timestamp_millis()),
            original_name: name.to_string(),
            format,
            data: content.to_string(),
            upload_date: now,
            size: content.len() as u64,
        };

        let mut document = self.document();
        document.texts.push(record.clone());
        self.save(&document)?;
        debug!(id, filename = %record.filename, "saved text");
        Ok(record)
    }

    pub fn get_by_id(&self, shelf: Shelf, id: u64) -> Option<MediaRecord> {
        let document = self.document();
        match shelf {
            Shelf::Image => document
                .images
                .into_iter()
                .find(|r| r.id == id)
                .map(MediaRecord::Image),
            Shelf::Text => document
                .texts
                .into_iter()
                .find(|r| r.id == id)
                .map(MediaRecord::Text),
        }
    }

    pub fn list_all(&self, shelf: Shelf) -> Vec<MediaRecord> {
        let document = self.document();
        match shelf {
            Shelf::Image => document.images.into_iter().map(MediaRecord::Image).collect(),
            Shelf::Text => document.texts.into_iter().map(MediaRecord::Text).collect(),
        }
    }

    /// Images first, then texts and code.
    pub fn list_files(&self) -> Vec<MediaRecord> {
        let document = self.document();
        document
            .images
            .into_iter()
            .map(MediaRecord::Image)
            .chain(document.texts.into_iter().map(MediaRecord::Text))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn at() -> DateTime<Utc> {
        "2025-03-01T10:00:00Z".parse().unwrap()
    }

    fn library(store: Arc<MemoryStore>) -> MediaLibrary {
        MediaLibrary::with_clock(store, Arc::new(FixedClock(at())))
    }

    #[test]
    fn test_next_id_is_monotonic_and_survives_reload() {
        let store = Arc::new(MemoryStore::new());
        let first = library(store.clone());

        let ids: Vec<u64> = (0..5).map(|_| first.next_id(Shelf::Image).unwrap()).collect();
        assert_eq!(ids, [1, 2, 3, 4, 5]);

        let reloaded = library(store);
        assert_eq!(reloaded.document().next_image_id, 6);
        assert_eq!(reloaded.next_id(Shelf::Image).unwrap(), 6);
        assert_eq!(reloaded.next_id(Shelf::Text).unwrap(), 1);
    }

    #[test]
    fn test_save_text() {
        let lib = library(Arc::new(MemoryStore::new()));
        let content = "a".repeat(3000);
        let record = lib.save_text("notes.txt", &content, "text/plain").unwrap();

        assert_eq!(record.id, 1);
        assert_eq!(record.size, 3000);
        assert_eq!(record.filename, format!("text_1_{}.txt", at().timestamp_millis()));
        assert_eq!(record.original_name, "notes.txt");
        assert_eq!(record.mime_type(), "text/plain");
        assert_eq!(record.upload_date, at());
    }

    #[test]
    fn test_save_text_counts_utf8_bytes() {
        let lib = library(Arc::new(MemoryStore::new()));
        let record = lib.save_text("u.txt", "привет", "").unwrap();
        assert_eq!(record.size, 12);
        assert_eq!(record.mime_type(), "text/plain");
    }

    #[test]
    fn test_save_code_shares_text_counter() {
        let lib = library(Arc::new(MemoryStore::new()));
        lib.save_text("a.txt", "a", "text/plain").unwrap();
        let code = lib.save_code("app.js", "let x = 1;", "js").unwrap();

        assert_eq!(code.id, 2);
        assert_eq!(code.language(), Some("js"));
        assert!(code.filename.starts_with("code_2_"));
        assert!(code.filename.ends_with(".js"));
        assert_eq!(lib.list_all(Shelf::Text).len(), 2);
        assert_eq!(lib.get_by_id(Shelf::Text, 2).unwrap().kind(), RecordKind::Code);
    }

    #[test]
    fn test_save_image() {
        let lib = library(Arc::new(MemoryStore::new()));
        let url = data_url::encode("image/jpeg", &[0u8; 10]);
        let record = lib.save_image("cat.jpg", &url, "image/jpeg", None).unwrap();

        assert_eq!(record.id, 1);
        assert_eq!(record.size, 10);
        assert_eq!(record.description, "cat.jpg");
        assert_eq!(record.filename, format!("photo_1_{}.jpeg", at().timestamp_millis()));

        let second = lib
            .save_image("dog", &url, "application", Some("  a dog "))
            .unwrap();
        assert_eq!(second.id, 2);
        assert_eq!(second.description, "a dog");
        assert!(second.filename.ends_with(".png"));
    }

    #[test]
    fn test_get_by_id_and_listing() {
        let lib = library(Arc::new(MemoryStore::new()));
        let url = data_url::encode("image/png", b"png");
        lib.save_image("one.png", &url, "image/png", None).unwrap();
        lib.save_text("one.txt", "text", "text/plain").unwrap();

        assert_eq!(lib.get_by_id(Shelf::Image, 1).unwrap().original_name(), "one.png");
        assert_eq!(lib.get_by_id(Shelf::Text, 1).unwrap().original_name(), "one.txt");
        assert!(lib.get_by_id(Shelf::Image, 2).is_none());

        let all: Vec<_> = lib.list_files().iter().map(|r| r.kind()).collect();
        assert_eq!(all, [RecordKind::Image, RecordKind::Text]);
    }

    #[test]
    fn test_code_records_are_stored_with_type_code() {
        let store = Arc::new(MemoryStore::new());
        let lib = library(store.clone());
        lib.save_code("a.js", "x", "js").unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&store.get(LIBRARY_DOCUMENT_KEY).unwrap()).unwrap();
        assert_eq!(raw["texts"][0]["type"], "code");
        assert_eq!(raw["texts"][0]["language"], "js");
    }

    #[test]
    fn test_untagged_library_keeps_records_and_counters() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                LIBRARY_DOCUMENT_KEY,
                r#"{"images":[],"texts":[{"id":1,"filename":"code_1_1740823200000.js",
                "originalName":"a.js","type":"code","language":"js","data":"x",
                "uploadDate":"2025-03-01T10:00:00.000Z","size":1}],
                "nextImageId":1,"nextTextId":2}"#,
            )
            .unwrap();
        let lib = library(store);

        assert_eq!(lib.list_all(Shelf::Text).len(), 1);
        assert_eq!(lib.get_by_id(Shelf::Text, 1).unwrap().kind(), RecordKind::Code);
        assert_eq!(lib.next_id(Shelf::Text).unwrap(), 2);
    }

    #[test]
    fn test_lagging_counter_never_reuses_ids() {
        let store = Arc::new(MemoryStore::new());
        let lib = library(store.clone());
        lib.save_text("a.txt", "a", "text/plain").unwrap();
        lib.save_text("b.txt", "b", "text/plain").unwrap();

        let mut document = lib.document();
        document.next_text_id = 1;
        store::write_document(store.as_ref(), LIBRARY_DOCUMENT_KEY, &document).unwrap();

        let third = lib.save_text("c.txt", "c", "text/plain").unwrap();
        assert_eq!(third.id, 3);
        assert_eq!(lib.document().next_text_id, 4);
    }

    #[test]
    fn test_malformed_library_starts_over() {
        let store = Arc::new(MemoryStore::new());
        store.set(LIBRARY_DOCUMENT_KEY, "{\"images\": 12").unwrap();
        let lib = library(store);

        assert!(lib.list_files().is_empty());
        assert_eq!(lib.next_id(Shelf::Image).unwrap(), 1);
    }

    #[test]
    fn test_failed_write_reports_error() {
        let store = Arc::new(MemoryStore::with_quota(300));
        let lib = library(store);
        let err = lib.save_text("big.txt", &"x".repeat(1000), "text/plain").unwrap_err();
        assert!(matches!(err, LibraryError::Store(StoreError::QuotaExceeded { .. })));
        // the id was already spent before the record was rejected
        assert_eq!(lib.document().next_text_id, 2);
        assert!(lib.list_all(Shelf::Text).is_empty());
    }
}
