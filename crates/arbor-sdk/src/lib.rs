//! High-level SDK for Arbor.
//!
//! Provides a single handle, [`Arbor`], over an object store. Every tree
//! operation is offered three ways: blocking, as a future, and with a
//! completion callback. All three run the same core logic from
//! `arbor-tree`.

pub mod error;
pub mod repository;
pub mod selector;

pub use error::{SdkError, SdkResult};
pub use repository::Arbor;
pub use selector::EntrySelector;

// Re-export key types
pub use arbor_types::ObjectId;
pub use arbor_store::{Blob, InMemoryObjectStore, ObjectStore, StoreConfig};
pub use arbor_tree::{EntryMode, EntryMut, Identity, Tree, TreeEntry, TreeError};
