use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Length of a raw object id in bytes.
pub const OBJECT_ID_LEN: usize = 20;

/// Length of a hex-encoded object id.
pub const OBJECT_ID_HEX_LEN: usize = OBJECT_ID_LEN * 2;

/// Content-addressed identifier for any stored object.
///
/// An `ObjectId` is the SHA-1 hash of an object's framed content (see
/// `arbor_crypto::ContentHasher`). Identical content always produces the same
/// `ObjectId`, making objects deduplicatable and verifiable.
///
/// Ordering is byte-wise, which is also the lexical order of the hex form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Create an `ObjectId` from a pre-computed hash.
    pub const fn from_hash(hash: [u8; OBJECT_ID_LEN]) -> Self {
        Self(hash)
    }

    /// Create an `ObjectId` from a raw byte slice of exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; OBJECT_ID_LEN] =
            bytes.try_into().map_err(|_| TypeError::InvalidLength {
                expected: OBJECT_ID_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// The null object ID (all zeros). Represents "no object".
    pub const fn null() -> Self {
        Self([0u8; OBJECT_ID_LEN])
    }

    /// Returns `true` if this is the null object ID.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; OBJECT_ID_LEN]
    }

    /// The raw 20-byte hash.
    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_LEN] {
        &self.0
    }

    /// Lower-case hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Abbreviated hex representation (first 7 characters, as git prints).
    pub fn short_hex(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(7);
        hex
    }

    /// Parse from a 40-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(format!("{s:?}: {e}")))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; OBJECT_ID_LEN]> for ObjectId {
    fn from(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<ObjectId> for [u8; OBJECT_ID_LEN] {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EMPTY_BLOB: &str = "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391";

    #[test]
    fn hex_roundtrip() {
        let id = ObjectId::from_hex(EMPTY_BLOB).unwrap();
        assert_eq!(id.to_hex(), EMPTY_BLOB);
        assert_eq!(id.as_bytes()[0], 0xe6);
    }

    #[test]
    fn upper_case_hex_is_accepted_and_displayed_lower() {
        let id = ObjectId::from_hex(&EMPTY_BLOB.to_uppercase()).unwrap();
        assert_eq!(id.to_string(), EMPTY_BLOB);
    }

    #[test]
    fn rejects_bad_alphabet() {
        let err = ObjectId::from_hex("zz9de29bb2d1d6434b8b29ae775ad8c2e48c5391").unwrap_err();
        assert!(matches!(err, TypeError::InvalidHex(_)));
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(
            ObjectId::from_hex("abcd").unwrap_err(),
            TypeError::InvalidLength {
                expected: 20,
                actual: 2
            }
        );
        // 64 hex chars: a SHA-256 sized id is not an ObjectId.
        let long = "ab".repeat(32);
        assert!(matches!(
            ObjectId::from_hex(&long),
            Err(TypeError::InvalidLength { actual: 32, .. })
        ));
        assert!(ObjectId::from_hex("").is_err());
        assert!(matches!(ObjectId::from_hex("abc"), Err(TypeError::InvalidHex(_))));
    }

    #[test]
    fn from_slice_checks_length() {
        assert!(ObjectId::from_slice(&[7u8; 20]).is_ok());
        assert_eq!(
            ObjectId::from_slice(&[7u8; 19]).unwrap_err(),
            TypeError::InvalidLength {
                expected: 20,
                actual: 19
            }
        );
    }

    #[test]
    fn null_is_all_zeros() {
        let null = ObjectId::null();
        assert!(null.is_null());
        assert_eq!(null.as_bytes(), &[0u8; 20]);
        assert!(!ObjectId::from_hex(EMPTY_BLOB).unwrap().is_null());
    }

    #[test]
    fn short_hex_is_7_chars() {
        let id = ObjectId::from_hex(EMPTY_BLOB).unwrap();
        assert_eq!(id.short_hex(), "e69de29");
        assert_eq!(format!("{id:?}"), "ObjectId(e69de29)");
    }

    #[test]
    fn from_str_parses() {
        let id: ObjectId = EMPTY_BLOB.parse().unwrap();
        assert_eq!(id, ObjectId::from_hex(EMPTY_BLOB).unwrap());
    }

    #[test]
    fn serde_uses_hex_string() {
        let id = ObjectId::from_hex(EMPTY_BLOB).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{EMPTY_BLOB}\""));
        let parsed: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
        assert!(serde_json::from_str::<ObjectId>("\"nope\"").is_err());
    }

    #[test]
    fn ordering_is_bytewise() {
        let id1 = ObjectId::from_hash([0; 20]);
        let id2 = ObjectId::from_hash([1; 20]);
        assert!(id1 < id2);
    }

    proptest! {
        #[test]
        fn any_bytes_roundtrip_through_hex(bytes in proptest::array::uniform20(any::<u8>())) {
            let id = ObjectId::from_hash(bytes);
            let hex = id.to_hex();
            prop_assert_eq!(hex.len(), OBJECT_ID_HEX_LEN);
            prop_assert_eq!(ObjectId::from_hex(&hex).unwrap(), id);
        }

        #[test]
        fn hex_order_matches_byte_order(a in proptest::array::uniform20(any::<u8>()),
                                        b in proptest::array::uniform20(any::<u8>())) {
            let (x, y) = (ObjectId::from_hash(a), ObjectId::from_hash(b));
            prop_assert_eq!(x.cmp(&y), x.to_hex().cmp(&y.to_hex()));
        }
    }
}
