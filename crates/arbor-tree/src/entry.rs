use std::cmp::Ordering;
use std::fmt;

use arbor_types::ObjectId;
use serde::Serialize;

use crate::error::{InvalidEntryReason, TreeError, TreeResult};
use crate::mode::EntryMode;

/// A single entry in a tree object.
///
/// Entries are plain values: cloning one out of a tree and editing the clone
/// never affects the tree. Edits to an entry that lives in a tree go through
/// [`EntryMut`](crate::EntryMut) so the tree can react.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TreeEntry {
    id: ObjectId,
    name: String,
    mode: EntryMode,
}

impl TreeEntry {
    /// Create an entry from raw attribute bits (e.g. `0o100644`).
    pub fn new(id: ObjectId, name: impl Into<String>, attributes: u32) -> TreeResult<Self> {
        let name = name.into();
        let mode = EntryMode::from_mode_bits(attributes).ok_or_else(|| {
            TreeError::invalid_entry(name.clone(), InvalidEntryReason::UnknownMode(attributes))
        })?;
        Self::with_mode(id, name, mode)
    }

    /// Create an entry with an already-typed mode.
    pub fn with_mode(id: ObjectId, name: impl Into<String>, mode: EntryMode) -> TreeResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { id, name, mode })
    }

    /// Id of the referenced object.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    /// Raw attribute bits of the entry's mode.
    pub fn attributes(&self) -> u32 {
        self.mode.mode_bits()
    }

    /// Does this entry refer to a subtree?
    pub fn is_directory(&self) -> bool {
        self.mode.is_directory()
    }

    pub fn is_submodule(&self) -> bool {
        self.mode == EntryMode::Submodule
    }

    pub fn set_id(&mut self, id: ObjectId) {
        self.id = id;
    }

    /// Rename the entry. The entry is unchanged if the name is invalid.
    pub fn set_name(&mut self, name: impl Into<String>) -> TreeResult<()> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    /// Change the entry's attribute bits. Unrecognized bits are rejected.
    pub fn set_attributes(&mut self, attributes: u32) -> TreeResult<()> {
        let mode = EntryMode::from_mode_bits(attributes).ok_or_else(|| {
            TreeError::invalid_entry(self.name.clone(), InvalidEntryReason::UnknownMode(attributes))
        })?;
        self.mode = mode;
        Ok(())
    }

    pub fn set_mode(&mut self, mode: EntryMode) {
        self.mode = mode;
    }

    /// Compare in canonical tree order.
    ///
    /// Names compare byte-wise, with directory names compared as if they
    /// ended in `/`. So a file `foo.txt` sorts before a directory `foo`,
    /// which sorts before a file `foo0`.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        canonical_cmp(&self.name, self.mode.is_directory(), &other.name, other.mode.is_directory())
    }
}

impl fmt::Display for TreeEntry {
    /// `git ls-tree` layout: `<mode> <kind> <id>\t<name>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}\t{}",
            self.mode,
            self.mode.object_kind(),
            self.id,
            self.name
        )
    }
}

pub(crate) fn canonical_cmp(a: &str, a_dir: bool, b: &str, b_dir: bool) -> Ordering {
    let a_key = a.bytes().chain(a_dir.then_some(b'/'));
    let b_key = b.bytes().chain(b_dir.then_some(b'/'));
    a_key.cmp(b_key)
}

/// Validate an entry name.
pub(crate) fn validate_name(name: &str) -> TreeResult<()> {
    let reason = if name.is_empty() {
        InvalidEntryReason::EmptyName
    } else if name.contains('/') {
        InvalidEntryReason::PathSeparator
    } else if name.contains('\0') {
        InvalidEntryReason::NulByte
    } else if name == "." || name == ".." {
        InvalidEntryReason::ReservedName
    } else {
        return Ok(());
    };
    Err(TreeError::invalid_entry(name, reason))
}
