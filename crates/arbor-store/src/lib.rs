//! Content-addressed object storage for Arbor.
//!
//! This crate defines the hash-keyed object store that tree objects are read
//! from and written to, analogous to git's `.git/objects/` directory. Every
//! object is stored as an immutable `(kind, bytes)` record identified by the
//! framed SHA-1 hash of its content.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Writes are idempotent: writing an existing object is a no-op success.
//! 3. Concurrent reads are always safe (objects are immutable).
//! 4. The store never interprets object contents -- it is a pure key-value store.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod config;
pub mod error;
pub mod memory;
pub mod object;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use object::{Blob, ObjectKind, StoredObject};
pub use traits::ObjectStore;
