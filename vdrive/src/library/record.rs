use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the two id sequences of the library. Code shares the text shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shelf {
    Image,
    Text,
}

impl fmt::Display for Shelf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shelf::Image => write!(f, "images"),
            Shelf::Text => write!(f, "texts"),
        }
    }
}

impl FromStr for Shelf {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" | "images" => Ok(Shelf::Image),
            "text" | "texts" | "code" => Ok(Shelf::Text),
            other => Err(format!("unknown library shelf: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Image,
    Text,
    Code,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Image => "image",
            RecordKind::Text => "text",
            RecordKind::Code => "code",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: u64,
    pub filename: String,
    pub original_name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Data URL.
    pub data: String,
    pub description: String,
    pub upload_date: DateTime<Utc>,
    pub size: u64,
}

/// What a text record holds: plain text with a MIME type, or source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextFormat {
    Text { mime_type: String },
    Code { language: String },
}

/// Stored as `type` (the MIME type, or `"code"`) plus `language` for code.
/// `kind` is written for readers that switch on it but is not required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredTextRecord", into = "StoredTextRecord")]
pub struct TextRecord {
    pub id: u64,
    pub filename: String,
    pub original_name: String,
    pub format: TextFormat,
    pub data: String,
    pub upload_date: DateTime<Utc>,
    pub size: u64,
}

const CODE_TYPE: &str = "code";

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTextRecord {
    id: u64,
    filename: String,
    original_name: String,
    #[serde(rename = "type", default)]
    mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    data: String,
    upload_date: DateTime<Utc>,
    size: u64,
}

impl From<StoredTextRecord> for TextRecord {
    fn from(stored: StoredTextRecord) -> Self {
        let is_code = stored.kind.as_deref() == Some(CODE_TYPE)
            || stored.mime_type.as_deref() == Some(CODE_TYPE)
            || stored.language.is_some();
        let format = if is_code {
            TextFormat::Code {
                language: stored.language.unwrap_or_default(),
            }
        } else {
            TextFormat::Text {
                mime_type: stored
                    .mime_type
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "text/plain".to_string()),
            }
        };
        Self {
            id: stored.id,
            filename: stored.filename,
            original_name: stored.original_name,
            format,
            data: stored.data,
            upload_date: stored.upload_date,
            size: stored.size,
        }
    }
}

impl From<TextRecord> for StoredTextRecord {
    fn from(record: TextRecord) -> Self {
        let (mime_type, kind, language) = match record.format {
            TextFormat::Text { mime_type } => (mime_type, "text", None),
            TextFormat::Code { language } => (CODE_TYPE.to_string(), CODE_TYPE, Some(language)),
        };
        Self {
            id: record.id,
            filename: record.filename,
            original_name: record.original_name,
            mime_type: Some(mime_type),
            kind: Some(kind.to_string()),
            language,
            data: record.data,
            upload_date: record.upload_date,
            size: record.size,
        }
    }
}

impl TextRecord {
    /// MIME type for text, `"code"` for source code.
    pub fn mime_type(&self) -> &str {
        match &self.format {
            TextFormat::Text { mime_type } => mime_type,
            TextFormat::Code { .. } => CODE_TYPE,
        }
    }

    pub fn language(&self) -> Option<&str> {
        match &self.format {
            TextFormat::Code { language } => Some(language),
            TextFormat::Text { .. } => None,
        }
    }
}

/// Any library entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MediaRecord {
    Image(ImageRecord),
    Text(TextRecord),
}

impl MediaRecord {
    pub fn id(&self) -> u64 {
        match self {
            MediaRecord::Image(r) => r.id,
            MediaRecord::Text(r) => r.id,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            MediaRecord::Image(_) => RecordKind::Image,
            MediaRecord::Text(r) => match r.format {
                TextFormat::Text { .. } => RecordKind::Text,
                TextFormat::Code { .. } => RecordKind::Code,
            },
        }
    }

    pub fn shelf(&self) -> Shelf {
        match self {
            MediaRecord::Image(_) => Shelf::Image,
            MediaRecord::Text(_) => Shelf::Text,
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            MediaRecord::Image(r) => &r.filename,
            MediaRecord::Text(r) => &r.filename,
        }
    }

    pub fn original_name(&self) -> &str {
        match self {
            MediaRecord::Image(r) => &r.original_name,
            MediaRecord::Text(r) => &r.original_name,
        }
    }

    pub fn mime_type(&self) -> &str {
        match self {
            MediaRecord::Image(r) => &r.mime_type,
            MediaRecord::Text(r) => r.mime_type(),
        }
    }

    pub fn data(&self) -> &str {
        match self {
            MediaRecord::Image(r) => &r.data,
            MediaRecord::Text(r) => &r.data,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            MediaRecord::Image(r) => r.size,
            MediaRecord::Text(r) => r.size,
        }
    }

    pub fn upload_date(&self) -> DateTime<Utc> {
        match self {
            MediaRecord::Image(r) => r.upload_date,
            MediaRecord::Text(r) => r.upload_date,
        }
    }
}

fn first_id() -> u64 {
    1
}

/// The persisted library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryDocument {
    #[serde(default)]
    pub images: Vec<ImageRecord>,
    #[serde(default)]
    pub texts: Vec<TextRecord>,
    #[serde(default = "first_id")]
    pub next_image_id: u64,
    #[serde(default = "first_id")]
    pub next_text_id: u64,
}

impl Default for LibraryDocument {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            texts: Vec::new(),
            next_image_id: first_id(),
            next_text_id: first_id(),
        }
    }
}

impl LibraryDocument {
    pub(crate) fn counter_mut(&mut self, shelf: Shelf) -> &mut u64 {
        match shelf {
            Shelf::Image => &mut self.next_image_id,
            Shelf::Text => &mut self.next_text_id,
        }
    }

    /// Largest id on `shelf`, 0 when empty.
    pub(crate) fn highest_id(&self, shelf: Shelf) -> u64 {
        match shelf {
            Shelf::Image => self.images.iter().map(|r| r.id).max(),
            Shelf::Text => self.texts.iter().map(|r| r.id).max(),
        }
        .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_record_shapes() {
        let date: DateTime<Utc> = "2025-03-01T10:00:00Z".parse().unwrap();
        let code = TextRecord {
            id: 2,
            filename: "code_2_1740823200000.py".into(),
            original_name: "main.py".into(),
            format: TextFormat::Code {
                language: "py".into(),
            },
            data: "print(1)".into(),
            upload_date: date,
            size: 8,
        };

        let value = serde_json::to_value(&code).unwrap();
        assert_eq!(value["type"], "code");
        assert_eq!(value["kind"], "code");
        assert_eq!(value["language"], "py");
        assert_eq!(value["originalName"], "main.py");
        assert_eq!(value["uploadDate"], "2025-03-01T10:00:00Z");

        let back: TextRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, code);
        assert_eq!(back.mime_type(), "code");
        assert_eq!(MediaRecord::Text(back).kind(), RecordKind::Code);
    }

    #[test]
    fn test_plain_text_record_keeps_its_mime_type() {
        let value = serde_json::json!({
            "id": 4,
            "filename": "text_4_1740823200000.txt",
            "originalName": "notes.md",
            "type": "text/markdown",
            "data": "# hi",
            "uploadDate": "2025-03-01T10:00:00.000Z",
            "size": 4
        });
        let record: TextRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.mime_type(), "text/markdown");
        assert_eq!(record.language(), None);

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["type"], "text/markdown");
        assert_eq!(back["kind"], "text");
        assert!(back.get("language").is_none());
    }

    #[test]
    fn test_document_without_kind_tags_loads() {
        let raw = r#"{
            "images": [],
            "texts": [
                {"id": 1, "filename": "code_1_1740823200000.js", "originalName": "a.js",
                 "type": "code", "language": "js", "data": "x",
                 "uploadDate": "2025-03-01T10:00:00.000Z", "size": 1},
                {"id": 2, "filename": "text_2_1740823200000.txt", "originalName": "b.txt",
                 "type": "text/plain", "data": "yy",
                 "uploadDate": "2025-03-01T10:00:00.000Z", "size": 2}
            ],
            "nextImageId": 1,
            "nextTextId": 3
        }"#;
        let doc: LibraryDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.texts.len(), 2);
        assert_eq!(doc.texts[0].language(), Some("js"));
        assert_eq!(doc.texts[1].mime_type(), "text/plain");
        assert_eq!(doc.next_text_id, 3);
    }

    #[test]
    fn test_empty_document_defaults() {
        let doc: LibraryDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc, LibraryDocument::default());
        assert_eq!(doc.next_image_id, 1);
        assert_eq!(doc.next_text_id, 1);
    }

    #[test]
    fn test_shelf_parse() {
        assert_eq!("images".parse::<Shelf>(), Ok(Shelf::Image));
        assert_eq!("Text".parse::<Shelf>(), Ok(Shelf::Text));
        assert_eq!("code".parse::<Shelf>(), Ok(Shelf::Text));
        assert!("videos".parse::<Shelf>().is_err());
    }
}
