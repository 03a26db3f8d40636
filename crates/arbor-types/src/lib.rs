//! Foundation types for Arbor.
//!
//! This crate provides the identifier type shared by every other Arbor crate.
//! Objects (trees, blobs, commits) are addressed by the SHA-1 hash of their
//! canonical serialized form, exactly as git addresses loose objects.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- 20-byte content-addressed identifier
//! - [`TypeError`] -- malformed identifier input

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::{ObjectId, OBJECT_ID_HEX_LEN, OBJECT_ID_LEN};
