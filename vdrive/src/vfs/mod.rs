//! The simulated drive → folder → file tree.

mod filesystem;
mod path;
mod tree;

pub use filesystem::{
    FS_DOCUMENT_KEY, MAX_DRIVES, Result, SETUP_FLAG_KEY, VfsError, VirtualFileSystem, kb_to_mb,
    size_in_kb,
};
pub use path::{DriveLetter, VfsPath};
pub use tree::{
    Directory, Drive, FileInfo, FileSystemDocument, Listing, NameMap, SYSTEM_SEED_USED_MB,
};
