use arbor_store::ObjectKind;
use serde::{Deserialize, Serialize};

/// File mode (git "attributes") of a tree entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryMode {
    /// Subtree / directory (0o040000).
    Directory,
    /// Normal file (0o100644).
    Regular,
    /// Executable file (0o100755).
    Executable,
    /// Symbolic link (0o120000).
    Symlink,
    /// Gitlink to a commit in another repository (0o160000).
    Submodule,
}

impl EntryMode {
    /// Every recognized mode, in mode-bit order.
    pub const ALL: [EntryMode; 5] = [
        Self::Directory,
        Self::Regular,
        Self::Executable,
        Self::Symlink,
        Self::Submodule,
    ];

    /// Octal mode value.
    pub fn mode_bits(&self) -> u32 {
        match self {
            Self::Directory => 0o040000,
            Self::Regular => 0o100644,
            Self::Executable => 0o100755,
            Self::Symlink => 0o120000,
            Self::Submodule => 0o160000,
        }
    }

    /// Parse from an octal mode value.
    pub fn from_mode_bits(bits: u32) -> Option<Self> {
        match bits {
            0o040000 => Some(Self::Directory),
            0o100644 => Some(Self::Regular),
            0o100755 => Some(Self::Executable),
            0o120000 => Some(Self::Symlink),
            0o160000 => Some(Self::Submodule),
            _ => None,
        }
    }

    /// Mode as written in the canonical tree encoding: octal, no leading zeros.
    pub fn canonical_text(&self) -> String {
        format!("{:o}", self.mode_bits())
    }

    /// Parse mode text from the canonical tree encoding.
    ///
    /// Only the exact canonical spelling is accepted, so `040000` (with a
    /// leading zero) and unknown modes are both rejected.
    pub fn from_canonical_text(text: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(text).ok()?;
        if text.is_empty() || !text.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return None;
        }
        let bits = u32::from_str_radix(text, 8).ok()?;
        let mode = Self::from_mode_bits(bits)?;
        (mode.canonical_text() == text).then_some(mode)
    }

    /// Kind of object an entry with this mode refers to.
    pub fn object_kind(&self) -> ObjectKind {
        match self {
            Self::Directory => ObjectKind::Tree,
            Self::Submodule => ObjectKind::Commit,
            Self::Regular | Self::Executable | Self::Symlink => ObjectKind::Blob,
        }
    }

    /// Returns `true` for subtree entries.
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory)
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06o}", self.mode_bits())
    }
}
