//! Entry points used by the front ends: drive setup, browsing, save and open,
//! and uploads that land both in the library and on a drive.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::blob::BlobStore;
use crate::library::{self, LibraryError, MediaLibrary, MediaRecord, Shelf, data_url};
use crate::store::{Store, StoreError};
use crate::vfs::{FileSystemDocument, Listing, VfsError, VfsPath, VirtualFileSystem};

/// Extensions uploaded as code, with the language tag they get.
const CODE_EXTENSIONS: &[&str] = &["js", "html", "css", "py"];

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{0}")]
    Vfs(#[from] VfsError),

    #[error("{0}")]
    Library(#[from] LibraryError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Unsupported upload: {name} ({mime_type})")]
    UnsupportedUpload { name: String, mime_type: String },
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// How an upload is catalogued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Text,
    Code { language: String },
}

impl UploadKind {
    /// Images by MIME type, text by `text/*` or JSON, code by file extension.
    pub fn classify(name: &str, mime_type: &str) -> Option<Self> {
        if mime_type.starts_with("image/") {
            return Some(UploadKind::Image);
        }
        if mime_type.starts_with("text/") || mime_type == "application/json" {
            return Some(UploadKind::Text);
        }
        let (_, extension) = name.rsplit_once('.')?;
        let extension = extension.to_ascii_lowercase();
        if CODE_EXTENSIONS.contains(&extension.as_str()) {
            return Some(UploadKind::Code {
                language: extension,
            });
        }
        None
    }

    /// Whether the payload is read as text rather than as a data URL.
    pub fn is_textual(&self) -> bool {
        !matches!(self, UploadKind::Image)
    }
}

/// One store shared by the file system, the blobs and the library.
#[derive(Clone)]
pub struct Session {
    vfs: VirtualFileSystem,
    blobs: BlobStore,
    library: MediaLibrary,
}

impl Session {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_clock(store, Arc::new(library::SystemClock))
    }

    pub fn with_clock(store: Arc<dyn Store>, clock: Arc<dyn library::Clock>) -> Self {
        Self {
            vfs: VirtualFileSystem::new(store.clone()),
            blobs: BlobStore::new(store.clone()),
            library: MediaLibrary::with_clock(store, clock),
        }
    }

    pub fn vfs(&self) -> &VirtualFileSystem {
        &self.vfs
    }

    pub fn library(&self) -> &MediaLibrary {
        &self.library
    }

    /// Front ends prompt for drive setup while this is false.
    pub fn needs_setup(&self) -> bool {
        !self.vfs.is_setup_done()
    }

    pub fn setup_drives(&self, count: usize, capacities: &[u64]) -> Result<FileSystemDocument> {
        Ok(self.vfs.initialize(count, capacities)?)
    }

    pub fn reset(&self) -> Result<()> {
        Ok(self.vfs.reset()?)
    }

    pub fn navigate(&self, path: &VfsPath) -> Result<Listing> {
        Ok(self.vfs.list_children(path)?)
    }

    pub fn create_folder(&self, path: &VfsPath, name: &str) -> Result<VfsPath> {
        Ok(self.vfs.create_folder(path, name)?)
    }

    /// Stores `payload` for `path\filename` and records it in the tree.
    ///
    /// The blob goes first. If recording the entry fails afterwards the blob
    /// stays behind unreferenced.
    pub fn save_file_to_path(
        &self,
        path: &VfsPath,
        filename: &str,
        payload: &str,
        mime_type: &str,
    ) -> Result<u64> {
        let filename = filename.trim();
        if filename.is_empty() {
            return Err(VfsError::BlankName.into());
        }
        // fail on a missing drive before anything is written
        self.vfs.drive(path.drive())?;

        self.blobs.put_blob(path, filename, payload)?;
        let size_kb = self
            .vfs
            .write_file(path, filename, data_url::payload_size(payload))?;
        info!(path = %path, filename, mime_type, size_kb, "saved file");
        Ok(size_kb)
    }

    /// Payload of a file, or `None` if it was never saved with content.
    pub fn open_file(&self, path: &VfsPath, filename: &str) -> Option<String> {
        self.blobs.get_blob(path, filename.trim())
    }

    /// Catalogues an upload and places it on a drive.
    ///
    /// The library record is written before the file. The two steps are
    /// independent: if placing the file fails, the record is kept.
    pub fn upload(
        &self,
        path: &VfsPath,
        name: &str,
        payload: &str,
        mime_type: &str,
        description: Option<&str>,
    ) -> Result<MediaRecord> {
        let kind = UploadKind::classify(name, mime_type).ok_or_else(|| {
            SessionError::UnsupportedUpload {
                name: name.to_string(),
                mime_type: mime_type.to_string(),
            }
        })?;
        if name.trim().is_empty() {
            return Err(VfsError::BlankName.into());
        }
        // nothing is written to an uninitialized or unknown drive
        self.vfs.drive(path.drive())?;

        let record = match kind {
            UploadKind::Image => MediaRecord::Image(
                self.library
                    .save_image(name, payload, mime_type, description)?,
            ),
            UploadKind::Text => {
                MediaRecord::Text(self.library.save_text(name, payload, mime_type)?)
            }
            UploadKind::Code { language } => {
                MediaRecord::Text(self.library.save_code(name, payload, &language)?)
            }
        };

        if let Err(e) = self.save_file_to_path(path, name, payload, mime_type) {
            warn!(
                id = record.id(),
                error = %e,
                "upload recorded in the library but not placed on the drive"
            );
            return Err(e);
        }
        Ok(record)
    }

    pub fn list_library(&self, shelf: Shelf) -> Vec<MediaRecord> {
        self.library.list_all(shelf)
    }

    pub fn get_by_id(&self, shelf: Shelf, id: u64) -> Option<MediaRecord> {
        self.library.get_by_id(shelf, id)
    }
}
