//! Canonical binary encoding of tree entries.
//!
//! ```text
//! for each entry, in canonical order:
//!   <mode, octal ASCII, no leading zeros> 0x20 <name bytes> 0x00 <20 raw id bytes>
//! ```
//!
//! There is no header, count, or trailing delimiter. The object header
//! (`"tree <len>\0"`) is added by the hasher, not stored here.

use std::cmp::Ordering;
use std::collections::HashSet;

use arbor_types::{ObjectId, OBJECT_ID_LEN};

use crate::entry::TreeEntry;
use crate::error::DecodeError;
use crate::mode::EntryMode;

/// Encode entries that are already in canonical order.
pub fn encode(entries: &[TreeEntry]) -> Vec<u8> {
    let capacity: usize = entries
        .iter()
        .map(|e| 8 + e.name().len() + OBJECT_ID_LEN)
        .sum();
    let mut out = Vec::with_capacity(capacity);
    for entry in entries {
        out.extend_from_slice(entry.mode().canonical_text().as_bytes());
        out.push(b' ');
        out.extend_from_slice(entry.name().as_bytes());
        out.push(0);
        out.extend_from_slice(entry.id().as_bytes());
    }
    out
}

/// Decode a canonical encoding.
///
/// Rejects anything [`encode`] would not have produced: unknown or
/// non-canonical mode text, invalid names, truncated ids, and entries that
/// are out of order or share a name.
pub fn decode(data: &[u8]) -> Result<Vec<TreeEntry>, DecodeError> {
    let mut entries: Vec<TreeEntry> = Vec::new();
    let mut names: HashSet<String> = HashSet::new();
    let mut pos = 0;

    while pos < data.len() {
        let start = pos;
        let rest = &data[pos..];

        let space = rest
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| DecodeError::new(start, "missing space after mode"))?;
        let mode = EntryMode::from_canonical_text(&rest[..space]).ok_or_else(|| {
            DecodeError::new(
                start,
                format!("bad mode {:?}", String::from_utf8_lossy(&rest[..space])),
            )
        })?;

        let after_mode = &rest[space + 1..];
        let nul = after_mode
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| DecodeError::new(start, "missing NUL after name"))?;
        let name = std::str::from_utf8(&after_mode[..nul])
            .map_err(|_| DecodeError::new(start, "name is not valid UTF-8"))?;

        let id_bytes = &after_mode[nul + 1..];
        if id_bytes.len() < OBJECT_ID_LEN {
            return Err(DecodeError::new(start, "truncated object id"));
        }
        let id = ObjectId::from_slice(&id_bytes[..OBJECT_ID_LEN])
            .map_err(|e| DecodeError::new(start, e.to_string()))?;

        let entry = TreeEntry::with_mode(id, name, mode)
            .map_err(|e| DecodeError::new(start, e.to_string()))?;

        if let Some(prev) = entries.last() {
            if prev.canonical_cmp(&entry) != Ordering::Less {
                return Err(DecodeError::new(
                    start,
                    format!("entry {:?} is out of order", entry.name()),
                ));
            }
        }
        if !names.insert(entry.name().to_owned()) {
            return Err(DecodeError::new(
                start,
                format!("duplicate entry {:?}", entry.name()),
            ));
        }

        entries.push(entry);
        pos += space + 1 + nul + 1 + OBJECT_ID_LEN;
    }

    Ok(entries)
}
