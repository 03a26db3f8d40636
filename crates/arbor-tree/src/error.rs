use arbor_store::{ObjectKind, StoreError};
use arbor_types::{ObjectId, TypeError};

/// Why a tree entry was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidEntryReason {
    #[error("name is empty")]
    EmptyName,

    #[error("name contains a path separator")]
    PathSeparator,

    #[error("name contains a NUL byte")]
    NulByte,

    #[error("name is reserved")]
    ReservedName,

    #[error("unrecognized attributes {0:o}")]
    UnknownMode(u32),

    #[error("an entry with this name already exists")]
    DuplicateName,
}

/// A canonical tree encoding that failed to decode.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("malformed tree data at byte {offset}: {reason}")]
pub struct DecodeError {
    /// Byte offset of the record that failed.
    pub offset: usize,
    pub reason: String,
}

impl DecodeError {
    pub(crate) fn new(offset: usize, reason: impl Into<String>) -> Self {
        Self {
            offset,
            reason: reason.into(),
        }
    }
}

/// Errors from tree operations.
///
/// Every operation validates before it applies: when one of these is
/// returned, the tree is exactly as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// An object id could not be parsed.
    #[error("malformed object id: {0}")]
    MalformedId(#[from] TypeError),

    /// Bad name, bad attributes, or a name already present in the tree.
    #[error("invalid tree entry {name:?}: {reason}")]
    InvalidEntry {
        name: String,
        reason: InvalidEntryReason,
    },

    #[error("entry index {index} out of range for tree with {len} entries")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("no entry named {0:?}")]
    EntryNotFound(String),

    /// Empty trees are never persisted.
    #[error("cannot save a tree with no entries")]
    EmptyTree,

    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("object {id} is a {actual}, not a tree")]
    WrongObjectType { id: ObjectId, actual: ObjectKind },

    /// A stored tree whose bytes are not a canonical tree encoding.
    #[error("corrupt tree object {id}: {source}")]
    CorruptObject {
        id: ObjectId,
        #[source]
        source: DecodeError,
    },

    /// Bytes handed in directly (not from a store) failed to decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("failed to read {id} from store: {source}")]
    StoreRead {
        id: ObjectId,
        #[source]
        source: StoreError,
    },

    #[error("failed to write tree to store: {0}")]
    StoreWrite(#[source] StoreError),
}

impl TreeError {
    pub(crate) fn invalid_entry(name: impl Into<String>, reason: InvalidEntryReason) -> Self {
        Self::InvalidEntry {
            name: name.into(),
            reason,
        }
    }
}

/// Result alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
