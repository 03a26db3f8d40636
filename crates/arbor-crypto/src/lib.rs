//! Content hashing for Arbor.
//!
//! Object ids are computed the way git computes them: the object kind and
//! payload length are framed in front of the payload (`"<kind> <len>\0"`) and
//! the whole is hashed with SHA-1. The framing doubles as domain separation,
//! so a blob and a tree with identical payload bytes never share an id.
//!
//! All hashing wraps the `sha1` crate; there is no custom cryptography.

pub mod hasher;

pub use hasher::ContentHasher;
