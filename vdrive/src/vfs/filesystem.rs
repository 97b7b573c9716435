use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::path::{DriveLetter, VfsPath};
use super::tree::{Directory, Drive, FileSystemDocument, Listing, seeded_system_drive};
use crate::store::{self, Store, StoreError};

/// Store key of the serialized forest.
pub const FS_DOCUMENT_KEY: &str = "filesystem_data";
/// Store key of the one-shot "drives were set up" flag.
pub const SETUP_FLAG_KEY: &str = "filesystem_setup_done";
pub const MAX_DRIVES: usize = DriveLetter::ALL.len();

#[derive(Error, Debug)]
pub enum VfsError {
    #[error("File system is not set up yet")]
    NotInitialized,

    #[error("File system is already set up")]
    AlreadyInitialized,

    #[error("Drive count must be between 1 and 5, got {0}")]
    InvalidDriveCount(usize),

    #[error("Expected {expected} drive capacities, got {got}")]
    CapacityMismatch { expected: usize, got: usize },

    #[error("Drive {0}: needs a capacity above zero")]
    InvalidCapacity(DriveLetter),

    #[error("Unknown drive: {0}")]
    UnknownDrive(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Name must not be blank")]
    BlankName,

    #[error("Folder already exists: {0}")]
    DuplicateFolder(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, VfsError>;

/// Size of a payload in KB, rounded up so non-empty files never show as 0.
pub fn size_in_kb(size_bytes: u64) -> u64 {
    size_bytes.div_ceil(1024)
}

/// MB charged against a drive for a file of `size_kb`, rounded up.
pub fn kb_to_mb(size_kb: u64) -> u64 {
    size_kb.div_ceil(1024)
}

/// Drive tree persisted as one document.
///
/// Nothing is cached: every call reads the current document from the store
/// and every mutation writes the whole document back, so several handles on
/// the same store always agree on what exists.
#[derive(Clone)]
pub struct VirtualFileSystem {
    store: Arc<dyn Store>,
}

impl VirtualFileSystem {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn is_setup_done(&self) -> bool {
        self.store.get(SETUP_FLAG_KEY).is_some()
    }

    pub fn is_initialized(&self) -> bool {
        self.load().is_some()
    }

    fn load(&self) -> Option<FileSystemDocument> {
        store::read_document(self.store.as_ref(), FS_DOCUMENT_KEY)
    }

    fn save(&self, document: &FileSystemDocument) -> Result<()> {
        store::write_document(self.store.as_ref(), FS_DOCUMENT_KEY, document)?;
        Ok(())
    }

    pub fn document(&self) -> Result<FileSystemDocument> {
        self.load().ok_or(VfsError::NotInitialized)
    }

    /// Creates `drive_count` drives lettered from C. Drive C gets the system
    /// folders; the others start empty.
    ///
    /// Refuses to run a second time. Use [`VirtualFileSystem::reset`] to wipe
    /// an existing tree first.
    pub fn initialize(&self, drive_count: usize, capacities: &[u64]) -> Result<FileSystemDocument> {
        if self.is_setup_done() {
            return Err(VfsError::AlreadyInitialized);
        }
        if !(1..=MAX_DRIVES).contains(&drive_count) {
            return Err(VfsError::InvalidDriveCount(drive_count));
        }
        if capacities.len() != drive_count {
            return Err(VfsError::CapacityMismatch {
                expected: drive_count,
                got: capacities.len(),
            });
        }

        let mut document = FileSystemDocument::new();
        for (letter, &capacity) in DriveLetter::ALL.iter().zip(capacities) {
            if capacity == 0 {
                return Err(VfsError::InvalidCapacity(*letter));
            }
            let drive = match letter {
                DriveLetter::C => seeded_system_drive(capacity),
                _ => Drive::new(*letter, capacity),
            };
            document.insert(*letter, drive);
        }

        // the flag goes last so a failed setup can be retried
        self.save(&document)?;
        self.store.set(SETUP_FLAG_KEY, "true")?;
        info!(drives = drive_count, "file system set up");
        Ok(document)
    }

    /// Deletes the whole tree and the setup flag.
    pub fn reset(&self) -> Result<()> {
        self.store.remove(SETUP_FLAG_KEY)?;
        self.store.remove(FS_DOCUMENT_KEY)?;
        warn!("file system reset, all drives removed");
        Ok(())
    }

    pub fn drives(&self) -> Result<Vec<(DriveLetter, Drive)>> {
        Ok(self.document()?.into_iter().collect())
    }

    pub fn drive(&self, letter: DriveLetter) -> Result<Drive> {
        self.document()?
            .remove(&letter)
            .ok_or_else(|| VfsError::NotFound(letter.display_name()))
    }

    /// Walks the folders of `path`, failing at the first missing one.
    pub fn resolve(&self, path: &VfsPath) -> Result<Directory> {
        let mut document = self.document()?;
        let drive = document
            .remove(&path.drive())
            .ok_or_else(|| VfsError::NotFound(path.to_string()))?;
        let mut current = drive.root;
        for segment in path.segments() {
            current = current
                .folders
                .get(segment)
                .cloned()
                .ok_or_else(|| VfsError::NotFound(path.to_string()))?;
        }
        Ok(current)
    }

    pub fn list_children(&self, path: &VfsPath) -> Result<Listing> {
        Ok(self.resolve(path)?.listing())
    }

    /// Adds an empty folder under `parent` and returns its path.
    ///
    /// A file of the same name does not count as a conflict.
    pub fn create_folder(&self, parent: &VfsPath, name: &str) -> Result<VfsPath> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VfsError::BlankName);
        }
        let target = parent.join(name)?;

        let mut document = self.document()?;
        let directory = document
            .get_mut(&parent.drive())
            .and_then(|drive| {
                drive
                    .root
                    .descend_mut(parent.segments().iter().map(String::as_str))
            })
            .ok_or_else(|| VfsError::NotFound(parent.to_string()))?;

        if directory.folders.contains_key(name) {
            return Err(VfsError::DuplicateFolder(target.to_string()));
        }
        directory.folders.insert(name, Directory::new());

        self.save(&document)?;
        debug!(path = %target, "created folder");
        Ok(target)
    }

    /// Records `filename` with its size under `path`, creating missing folders.
    ///
    /// The drive is charged `ceil(KB / 1024)` MB on every write, overwrites
    /// included. Capacity is not enforced.
    pub fn write_file(&self, path: &VfsPath, filename: &str, size_bytes: u64) -> Result<u64> {
        let filename = filename.trim();
        if filename.is_empty() {
            return Err(VfsError::BlankName);
        }

        let mut document = self.document()?;
        let drive = document
            .get_mut(&path.drive())
            .ok_or_else(|| VfsError::NotFound(path.drive().display_name()))?;

        let size_kb = size_in_kb(size_bytes);
        drive
            .root
            .descend_or_create(path.segments().iter().map(String::as_str))
            .files
            .insert(filename, size_kb);
        drive.used_memory += kb_to_mb(size_kb);

        if drive.is_overcommitted() {
            warn!(
                drive = %path.drive(),
                used = drive.used_memory,
                total = drive.total_memory,
                "drive capacity exceeded"
            );
        }

        self.save(&document)?;
        debug!(path = %path, filename, size_kb, "wrote file entry");
        Ok(size_kb)
    }
}
