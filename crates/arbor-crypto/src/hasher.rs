use arbor_types::ObjectId;
use sha1::{Digest, Sha1};

/// Framed SHA-1 content hasher.
///
/// Each hasher carries an object kind tag (`"blob"`, `"tree"`, ...) that is
/// written, together with the payload length, in front of every hash
/// computation: `SHA-1("<kind> <len>\0" || data)`. This is git's loose object
/// framing, so ids produced here match the ids git assigns to the same
/// content.
pub struct ContentHasher {
    kind: &'static str,
}

impl ContentHasher {
    /// Hasher for blob objects.
    pub const BLOB: Self = Self { kind: "blob" };
    /// Hasher for tree objects.
    pub const TREE: Self = Self { kind: "tree" };
    /// Hasher for commit objects.
    pub const COMMIT: Self = Self { kind: "commit" };
    /// Hasher for annotated tag objects.
    pub const TAG: Self = Self { kind: "tag" };

    /// Create a hasher with a custom kind tag.
    pub const fn new(kind: &'static str) -> Self {
        Self { kind }
    }

    /// Hash a payload with kind/length framing.
    pub fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = Sha1::new();
        hasher.update(self.header(data.len()));
        hasher.update(data);
        ObjectId::from_hash(hasher.finalize().into())
    }

    /// Verify that data produces the expected object ID.
    pub fn verify(&self, data: &[u8], expected: &ObjectId) -> bool {
        self.hash(data) == *expected
    }

    /// Raw SHA-1 hash without framing (for low-level use).
    pub fn raw_hash(data: &[u8]) -> [u8; 20] {
        Sha1::digest(data).into()
    }

    /// The kind tag used by this hasher.
    pub fn kind(&self) -> &str {
        self.kind
    }

    fn header(&self, len: usize) -> Vec<u8> {
        format!("{} {}\0", self.kind, len).into_bytes()
    }
}
