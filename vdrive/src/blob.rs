//! Payloads of files placed in the tree, stored next to it under their own keys.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::store::{Result, Store};
use crate::vfs::{DriveLetter, VfsPath};

/// Store key of one file payload.
///
/// Rendered as `file:{drive}:{folder}/{folder}/{filename}` with `%`, `/`
/// and `:` escaped inside names, so two different locations never share a
/// key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobKey {
    drive: DriveLetter,
    segments: Vec<String>,
    filename: String,
}

impl BlobKey {
    pub fn new(path: &VfsPath, filename: &str) -> Self {
        Self {
            drive: path.drive(),
            segments: path.segments().to_vec(),
            filename: filename.to_string(),
        }
    }

    /// The `file_{drive}_{path}_{filename}` form older saves used.
    ///
    /// It is ambiguous: a file named `a_b` in `x` and a file `b` in `x_a`
    /// render the same. Only kept to document the layout change.
    pub fn legacy(&self) -> String {
        format!(
            "file_{}_{}_{}",
            self.drive,
            self.segments.join("\\"),
            self.filename
        )
    }
}

fn escape(name: &str) -> String {
    name.replace('%', "%25")
        .replace('/', "%2F")
        .replace(':', "%3A")
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file:{}:", self.drive)?;
        for segment in &self.segments {
            write!(f, "{}/", escape(segment))?;
        }
        write!(f, "{}", escape(&self.filename))
    }
}

#[derive(Clone)]
pub struct BlobStore {
    store: Arc<dyn Store>,
}

impl BlobStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Overwrites any payload already stored for this location.
    pub fn put_blob(&self, path: &VfsPath, filename: &str, payload: &str) -> Result<()> {
        let key = BlobKey::new(path, filename).to_string();
        self.store.set(&key, payload)?;
        debug!(key = %key, bytes = payload.len(), "stored blob");
        Ok(())
    }

    pub fn get_blob(&self, path: &VfsPath, filename: &str) -> Option<String> {
        self.store.get(&BlobKey::new(path, filename).to_string())
    }

    pub fn remove_blob(&self, path: &VfsPath, filename: &str) -> Result<()> {
        self.store.remove(&BlobKey::new(path, filename).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn blobs() -> BlobStore {
        BlobStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_key_format() {
        let path = VfsPath::parse(r"C:\Users\Name").unwrap();
        assert_eq!(BlobKey::new(&path, "notes.txt").to_string(), "file:C:Users/Name/notes.txt");
        assert_eq!(
            BlobKey::new(&VfsPath::root(DriveLetter::D), "a/b:c%").to_string(),
            "file:D:a%2Fb%3Ac%25"
        );
    }

    #[test]
    fn test_keys_do_not_collide_where_legacy_keys_do() {
        let x = VfsPath::parse(r"C:\x").unwrap();
        let x_a = VfsPath::parse(r"C:\x_a").unwrap();
        let first = BlobKey::new(&x, "a_b");
        let second = BlobKey::new(&x_a, "b");

        assert_eq!(first.legacy(), second.legacy());
        assert_ne!(first.to_string(), second.to_string());

        let nested = VfsPath::parse(r"C:\x\a").unwrap();
        let slash_file = BlobKey::new(&x, "a/b");
        assert_ne!(slash_file.to_string(), BlobKey::new(&nested, "b").to_string());
    }

    #[test]
    fn test_round_trip_text_and_data_url() {
        let blobs = blobs();
        let path = VfsPath::parse(r"C:\Docs").unwrap();
        let text = "line one\nline two ünïcödé\n";
        let data_url = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR4nGNgYGBgAAAABQABpfZFQAAAAABJRU5ErkJggg==";

        blobs.put_blob(&path, "notes.txt", text).unwrap();
        blobs.put_blob(&path, "pixel.png", data_url).unwrap();

        assert_eq!(blobs.get_blob(&path, "notes.txt").as_deref(), Some(text));
        assert_eq!(blobs.get_blob(&path, "pixel.png").as_deref(), Some(data_url));
    }

    #[test]
    fn test_overwrite_and_remove() {
        let blobs = blobs();
        let root = VfsPath::root(DriveLetter::C);
        assert_eq!(blobs.get_blob(&root, "a.txt"), None);

        blobs.put_blob(&root, "a.txt", "v1").unwrap();
        blobs.put_blob(&root, "a.txt", "v2").unwrap();
        assert_eq!(blobs.get_blob(&root, "a.txt").as_deref(), Some("v2"));

        blobs.remove_blob(&root, "a.txt").unwrap();
        assert_eq!(blobs.get_blob(&root, "a.txt"), None);
    }
}
