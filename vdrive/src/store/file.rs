use std::fs::{self, File};
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::{Result, Store, StoreError};

const TEMP_SUFFIX: &str = ".tmp";

/// Store backed by a directory, one file per key.
///
/// Files are named by the SHA-256 of their key, so key length and alphabet
/// never run into file name limits. Each file starts with the key as a JSON
/// string on its own line, followed by the value.
///
/// Values are written to a temporary file first and renamed into place, so a
/// reader sees either the old or the new document.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    quota: Option<usize>,
}

impl FileStore {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root, quota: None })
    }

    /// Byte limit over all stored files, headers included. `0` means unlimited.
    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = if quota == 0 { None } else { Some(quota) };
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stored keys, sorted. Reads only the header line of each file.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)?.flatten() {
            if entry.file_name().to_string_lossy().ends_with(TEMP_SUFFIX) {
                continue;
            }
            let mut header = String::new();
            BufReader::new(File::open(entry.path())?).read_line(&mut header)?;
            match serde_json::from_str::<String>(header.trim_end_matches('\n')) {
                Ok(key) => keys.push(key),
                Err(e) => warn!(file = %entry.path().display(), error = %e, "skipping unreadable entry"),
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(file_name(key))
    }

    fn usage_excluding(&self, key: &str) -> Result<usize> {
        let skip = file_name(key);
        let mut total = 0;
        for entry in fs::read_dir(&self.root)?.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name == skip || name.ends_with(TEMP_SUFFIX) {
                continue;
            }
            total += entry.metadata()?.len() as usize;
        }
        Ok(total)
    }
}

fn file_name(key: &str) -> String {
    format!("{:x}", Sha256::digest(key.as_bytes()))
}

fn header(key: &str) -> Result<String> {
    Ok(serde_json::to_string(key)?)
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let raw = match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(key, error = %e, "failed to read stored value");
                return None;
            }
        };
        let (stored_key, value) = raw.split_once('\n')?;
        if serde_json::from_str::<String>(stored_key).ok().as_deref() != Some(key) {
            warn!(key, "stored entry belongs to another key");
            return None;
        }
        Some(value.to_string())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let header = header(key)?;
        if let Some(limit) = self.quota {
            let needed = self.usage_excluding(key)? + header.len() + 1 + value.len();
            if needed > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }

        let target = self.path_for(key);
        let mut temp = target.clone().into_os_string();
        temp.push(TEMP_SUFFIX);
        let temp = PathBuf::from(temp);

        fs::write(&temp, format!("{header}\n{value}"))?;
        fs::rename(&temp, &target)?;
        debug!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names_are_fixed_length_digests() {
        for key in ["filesystem_data", "file:C:Users/notes.txt", "a%b.c", "Документы"] {
            let name = file_name(key);
            assert_eq!(name.len(), 64);
            assert!(name.bytes().all(|b| b.is_ascii_hexdigit()));
        }
        assert_ne!(file_name("a"), file_name("b"));
    }

    #[test]
    fn test_long_non_ascii_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        let folders = ["Документы", "Отчёты", "Квартальные", "2025"].repeat(8).join("/");
        let key = format!("file:C:{folders}/квартальный_отчёт.txt");
        assert!(key.len() > 255);

        store.set(&key, "line one\nline two").unwrap();
        assert_eq!(store.get(&key).as_deref(), Some("line one\nline two"));
        assert_eq!(store.keys().unwrap(), vec![key.clone()]);
        store.remove(&key).unwrap();
        assert_eq!(store.get(&key), None);
    }

    #[test]
    fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert_eq!(store.get("file:C:notes.txt"), None);
        store.set("file:C:notes.txt", "hello").unwrap();
        assert_eq!(store.get("file:C:notes.txt").as_deref(), Some("hello"));
        assert_eq!(store.keys().unwrap(), vec!["file:C:notes.txt".to_string()]);

        store.remove("file:C:notes.txt").unwrap();
        assert_eq!(store.get("file:C:notes.txt"), None);
        store.remove("file:C:notes.txt").unwrap();
    }

    #[test]
    fn test_reopen_sees_previous_writes() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::open(dir.path())
            .unwrap()
            .set("filesystem_setup_done", "true")
            .unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("filesystem_setup_done").as_deref(), Some("true"));
    }

    #[test]
    fn test_quota() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap().with_quota(20);

        store.set("a", "0123456789").unwrap();
        let err = store.set("b", "0123456789").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
        assert_eq!(store.get("b"), None);

        // overwriting an existing key only counts its new size: 4 header bytes + 16
        store.set("a", "0123456789012345").unwrap();
        assert!(store.set("a", "01234567890123456").is_err());
    }
}
