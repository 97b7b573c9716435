//! Core library behind the vdrive desktop storage. The crate models a small
//! simulated file system of lettered drives, folders and sized file entries,
//! keeps the payload of each saved file as a separate blob, and catalogues
//! uploads in a media library with stable numeric ids. Everything is
//! persisted as whole JSON documents through a pluggable key-value store.

/// File payloads kept outside the drive tree.
pub mod blob;
/// Media library of uploaded images, texts and code.
pub mod library;
/// High level operations shared by every front end.
pub mod session;
/// Key-value persistence backends.
pub mod store;
/// The drive → folder → file tree.
pub mod vfs;

pub use session::{Session, SessionError};
