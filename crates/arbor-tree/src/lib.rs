//! Tree objects for Arbor.
//!
//! A tree is a directory listing: a set of named entries, each pointing at a
//! blob, another tree, or a submodule commit. Trees are persisted to an
//! [`ObjectStore`](arbor_store::ObjectStore) in git's canonical encoding, so
//! the id of a saved tree is the same one `git write-tree` would produce.
//!
//! # Key Types
//!
//! - [`Tree`] -- mutable, sorted entry set with load/save
//! - [`TreeEntry`] -- `(id, name, mode)` value
//! - [`EntryMut`] -- edits an entry in place and keeps the tree consistent
//! - [`Identity`] -- unsaved, saved, or modified since last save
//!
//! # Invariants
//!
//! 1. Entries are always in canonical order (directories sort as `name/`).
//! 2. Names are unique within a tree; adding an existing name fails.
//! 3. A tree reports an id only while its entries match that stored object.
//! 4. Empty trees are never written.

pub mod codec;
pub mod entry;
pub mod error;
pub mod handle;
pub mod mode;
pub mod tree;
pub mod walk;

pub use entry::TreeEntry;
pub use error::{DecodeError, InvalidEntryReason, TreeError, TreeResult};
pub use handle::EntryMut;
pub use mode::EntryMode;
pub use tree::{EntryKey, Identity, PendingSave, Tree};
pub use walk::{find_path, walk};
