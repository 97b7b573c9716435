use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::path::DriveLetter;

/// Name-keyed map that remembers insertion order, also across serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> NameMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Replaces the value in place if the name exists, appends otherwise.
    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        let name = name.into();
        match self.get_mut(&name) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get_or_insert_with(&mut self, name: &str, make: impl FnOnce() -> V) -> &mut V {
        let index = match self.entries.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.entries.push((name.to_string(), make()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<V> Default for NameMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for NameMap<V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = NameMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for NameMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct NameMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for NameMapVisitor<V> {
    type Value = NameMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of names")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = NameMap::new();
        while let Some((name, value)) = access.next_entry::<String, V>()? {
            map.insert(name, value);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for NameMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(NameMapVisitor(PhantomData))
    }
}

/// A drive root or a folder. File values are sizes in KB.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    #[serde(default)]
    pub folders: NameMap<Directory>,
    #[serde(default)]
    pub files: NameMap<u64>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self, name: &str) -> Option<&Directory> {
        self.folders.get(name)
    }

    pub fn descend<'a, I>(&self, segments: I) -> Option<&Directory>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut current = self;
        for segment in segments {
            current = current.folders.get(segment)?;
        }
        Some(current)
    }

    pub fn descend_mut<'a, I>(&mut self, segments: I) -> Option<&mut Directory>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut current = self;
        for segment in segments {
            current = current.folders.get_mut(segment)?;
        }
        Some(current)
    }

    /// Like [`Directory::descend_mut`] but creates missing folders on the way.
    pub fn descend_or_create<'a, I>(&mut self, segments: I) -> &mut Directory
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut current = self;
        for segment in segments {
            current = current.folders.get_or_insert_with(segment, Directory::new);
        }
        current
    }

    pub fn listing(&self) -> Listing {
        Listing {
            folders: self.folders.keys().map(str::to_string).collect(),
            files: self
                .files
                .iter()
                .map(|(name, size_kb)| FileInfo {
                    name: name.to_string(),
                    size_kb: *size_kb,
                })
                .collect(),
        }
    }

    /// Renders the subtree with box-drawing connectors, children sorted by name.
    pub fn render_tree(&self, name: &str, max_depth: usize) -> Vec<String> {
        let mut lines = vec![name.to_string()];
        self.render_children(0, max_depth, "", &mut lines);
        lines
    }

    fn render_children(&self, depth: usize, max_depth: usize, prefix: &str, lines: &mut Vec<String>) {
        if depth >= max_depth {
            return;
        }

        let mut children: Vec<(&str, Option<&Directory>)> = self
            .folders
            .iter()
            .map(|(name, dir)| (name, Some(dir)))
            .chain(self.files.keys().map(|name| (name, None)))
            .collect();
        children.sort_by(|a, b| a.0.cmp(b.0));

        let total = children.len();
        for (index, (name, dir)) in children.into_iter().enumerate() {
            let is_last = index == total - 1;
            let connector = if is_last { "└── " } else { "├── " };
            let suffix = if dir.is_some() { "\\" } else { "" };
            lines.push(format!("{prefix}{connector}{name}{suffix}"));

            if let Some(dir) = dir {
                let new_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
                dir.render_children(depth + 1, max_depth, &new_prefix, lines);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub size_kb: u64,
}

/// Contents of one directory, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub folders: Vec<String>,
    pub files: Vec<FileInfo>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drive {
    pub name: String,
    /// Declared capacity in MB.
    pub total_memory: u64,
    /// Charged capacity in MB. Only ever grows.
    pub used_memory: u64,
    #[serde(flatten)]
    pub root: Directory,
}

impl Drive {
    pub fn new(letter: DriveLetter, total_memory: u64) -> Self {
        Self {
            name: letter.display_name(),
            total_memory,
            used_memory: 0,
            root: Directory::new(),
        }
    }

    pub fn free_memory(&self) -> u64 {
        self.total_memory.saturating_sub(self.used_memory)
    }

    pub fn is_overcommitted(&self) -> bool {
        self.used_memory > self.total_memory
    }
}

/// The whole persisted forest.
pub type FileSystemDocument = BTreeMap<DriveLetter, Drive>;

/// Builds drive C with its fixed system folders.
pub(crate) fn seeded_system_drive(total_memory: u64) -> Drive {
    let system32 = Directory {
        folders: NameMap::new(),
        files: [("kernel.exe", 256), ("drivers.dll", 512), ("config.sys", 64)]
            .into_iter()
            .collect(),
    };
    let windows = Directory {
        folders: [("System32", system32), ("Temp", Directory::new())]
            .into_iter()
            .collect(),
        files: [("bootmgr", 128)].into_iter().collect(),
    };
    let program_files = Directory {
        folders: NameMap::new(),
        files: [("program.exe", 1024)].into_iter().collect(),
    };

    let mut drive = Drive::new(DriveLetter::C, total_memory);
    drive.root.folders.insert("Windows", windows);
    drive.root.folders.insert("Program Files", program_files);
    drive.used_memory = SYSTEM_SEED_USED_MB;
    drive
}

/// Capacity charged to drive C by the system seed, in MB.
pub const SYSTEM_SEED_USED_MB: u64 = 2048;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_map_keeps_insertion_order() {
        let mut map = NameMap::new();
        map.insert("zeta", 1);
        map.insert("alpha", 2);
        map.insert("mid", 3);
        assert_eq!(map.insert("alpha", 20), Some(2));
        assert_eq!(map.keys().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"zeta":1,"alpha":20,"mid":3}"#);
        let back: NameMap<u64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.keys().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_drive_document_shape() {
        let drive = Drive::new(DriveLetter::D, 512);
        let mut doc = FileSystemDocument::new();
        doc.insert(DriveLetter::D, drive);

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "D": {"name": "D:", "totalMemory": 512, "usedMemory": 0, "folders": {}, "files": {}}
            })
        );
        let back: FileSystemDocument = serde_json::from_value(value).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_descend_or_create() {
        let mut root = Directory::new();
        root.descend_or_create(["a", "b"]).files.insert("f", 1);
        assert_eq!(root.descend(["a", "b"]).unwrap().files.get("f"), Some(&1));
        assert!(root.descend(["a", "c"]).is_none());
    }

    #[test]
    fn test_render_tree() {
        let drive = seeded_system_drive(1024);
        let lines = drive.root.render_tree("C:", 2);
        assert_eq!(
            lines,
            [
                "C:",
                "├── Program Files\\",
                "│   └── program.exe",
                "└── Windows\\",
                "    ├── System32\\",
                "    ├── Temp\\",
                "    └── bootmgr",
            ]
        );
    }
}
