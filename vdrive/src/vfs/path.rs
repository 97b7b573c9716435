use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::VfsError;

/// Letter of one of the (at most five) drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DriveLetter {
    C,
    D,
    E,
    F,
    G,
}

impl DriveLetter {
    pub const ALL: [DriveLetter; 5] = [
        DriveLetter::C,
        DriveLetter::D,
        DriveLetter::E,
        DriveLetter::F,
        DriveLetter::G,
    ];

    pub fn as_char(self) -> char {
        match self {
            DriveLetter::C => 'C',
            DriveLetter::D => 'D',
            DriveLetter::E => 'E',
            DriveLetter::F => 'F',
            DriveLetter::G => 'G',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(DriveLetter::C),
            'D' => Some(DriveLetter::D),
            'E' => Some(DriveLetter::E),
            'F' => Some(DriveLetter::F),
            'G' => Some(DriveLetter::G),
            _ => None,
        }
    }

    /// Display name as shown in the drive list, e.g. `C:`.
    pub fn display_name(self) -> String {
        format!("{}:", self.as_char())
    }
}

impl fmt::Display for DriveLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for DriveLetter {
    type Err = VfsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches(':');
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                DriveLetter::from_char(c).ok_or_else(|| VfsError::UnknownDrive(s.to_string()))
            }
            _ => Err(VfsError::UnknownDrive(s.to_string())),
        }
    }
}

/// Absolute location of a directory: a drive plus folder names.
///
/// Parsed from `C:\Users\Name` (the colon is optional and `/` works as a
/// separator too) and displayed with backslashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VfsPath {
    drive: DriveLetter,
    segments: Vec<String>,
}

impl VfsPath {
    pub fn root(drive: DriveLetter) -> Self {
        Self {
            drive,
            segments: Vec::new(),
        }
    }

    pub fn new<I, S>(drive: DriveLetter, segments: I) -> Result<Self, VfsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut path = Self::root(drive);
        for segment in segments {
            path = path.join(segment)?;
        }
        Ok(path)
    }

    pub fn parse(input: &str) -> Result<Self, VfsError> {
        let input = input.trim();
        let mut parts = input.split(['\\', '/']);
        let drive_part = parts.next().unwrap_or_default();
        if drive_part.is_empty() {
            return Err(VfsError::InvalidPath(input.to_string()));
        }
        let drive = drive_part.parse::<DriveLetter>()?;
        let segments = parts.filter(|p| !p.trim().is_empty()).map(str::trim);
        Self::new(drive, segments).map_err(|_| VfsError::InvalidPath(input.to_string()))
    }

    pub fn drive(&self) -> DriveLetter {
        self.drive
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Appends one folder name. Empty names, `.` and `..` are refused.
    pub fn join<S: Into<String>>(&self, name: S) -> Result<Self, VfsError> {
        let name = name.into();
        validate_segment(&name)?;
        let mut segments = self.segments.clone();
        segments.push(name);
        Ok(Self {
            drive: self.drive,
            segments,
        })
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            drive: self.drive,
            segments: rest.to_vec(),
        })
    }

    /// Folder part without the drive, joined with backslashes. Empty at the root.
    pub fn folder_string(&self) -> String {
        self.segments.join("\\")
    }
}

fn validate_segment(name: &str) -> Result<(), VfsError> {
    if name.trim().is_empty() {
        return Err(VfsError::BlankName);
    }
    if name == "." || name == ".." {
        return Err(VfsError::InvalidPath(name.to_string()));
    }
    Ok(())
}

impl fmt::Display for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:\\{}", self.drive, self.folder_string())
    }
}

impl FromStr for VfsPath {
    type Err = VfsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VfsPath::parse(s)
    }
}
