use std::fmt;

use crate::U256;
use serde::{Deserialize, Serialize};
use sha256::digest;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Hash(U256);

/// Digest capability: turns a byte string into a [`Hash`].
///
/// Transaction ids and addresses are both derived through it, so an
/// implementation must be deterministic and collision resistant.
pub trait Hasher {
    fn hash_bytes(&self, bytes: &[u8]) -> Hash;
}

/// Plain SHA-256, the hasher used when none is injected.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256;

impl Hasher for Sha256 {
    fn hash_bytes(&self, bytes: &[u8]) -> Hash {
        let hash = digest(bytes);
        let mut hash_array = [0u8; 32];
        hex::decode_to_slice(hash, &mut hash_array).expect("BUG: sha256 digest is 32 bytes");
        Hash::from_bytes(hash_array)
    }
}

// canonical encoding of anything serde can serialize: CBOR via
// ciborium, fields in declaration order
pub fn canonical_bytes<T: Serialize>(data: &T) -> Vec<u8> {
    let mut serialized: Vec<u8> = vec![];
    if let Err(e) = ciborium::into_writer(data, &mut serialized) {
        panic!(
            "Failed to serialize data: {:?}. \
            This should not happen",
            e
        );
    }
    serialized
}

impl Hash {
    // hash anything that can be serde Serialized via ciborium
    pub fn hash<T: Serialize>(data: &T) -> Self {
        Self::hash_with(&Sha256, data)
    }

    pub fn hash_with<H: Hasher + ?Sized, T: Serialize>(hasher: &H, data: &T) -> Self {
        hasher.hash_bytes(&canonical_bytes(data))
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Hash(U256::from(bytes))
    }

    // convert to bytes
    pub fn as_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        self.0.to_little_endian(&mut bytes);
        bytes
    }

    // zero hash
    pub fn zero() -> Self {
        Hash(U256::zero())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}
