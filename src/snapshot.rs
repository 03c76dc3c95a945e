//! Opaque, immutable captures of target state.
//!
//! A snapshot is the serialized form of a target's complete state. Holding
//! bytes rather than a live value guarantees the snapshot is independent of
//! any later mutation of the target.

use crate::error::{HistoryError, Result};
use crate::types::{ContentHash, SnapshotEncoding};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// Immutable capture of a target's state at one instant.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    encoding: SnapshotEncoding,
    bytes: Vec<u8>,
    checksum: u32,
    hash: ContentHash,
}

impl Snapshot {
    /// Serialize `state` into a new snapshot.
    pub fn encode<S: Serialize + ?Sized>(state: &S, encoding: SnapshotEncoding) -> Result<Self> {
        let bytes = match encoding {
            SnapshotEncoding::Json => serde_json::to_vec(state)?,
            SnapshotEncoding::MessagePack => rmp_serde::to_vec_named(state)?,
        };

        Ok(Self {
            encoding,
            checksum: crc32fast::hash(&bytes),
            hash: ContentHash::from_bytes(&bytes),
            bytes,
        })
    }

    /// Decode the captured state.
    ///
    /// The checksum is verified first, so a corrupted snapshot is never
    /// handed to a target.
    pub fn decode<S: DeserializeOwned>(&self) -> Result<S> {
        self.verify()?;

        match self.encoding {
            SnapshotEncoding::Json => serde_json::from_slice(&self.bytes)
                .map_err(|e| HistoryError::Deserialization(e.to_string())),
            SnapshotEncoding::MessagePack => Ok(rmp_serde::from_slice(&self.bytes)?),
        }
    }

    /// Check the stored checksum against the bytes.
    pub fn verify(&self) -> Result<()> {
        let computed = crc32fast::hash(&self.bytes);
        if computed != self.checksum {
            return Err(HistoryError::ChecksumMismatch {
                expected: self.checksum,
                got: computed,
            });
        }
        Ok(())
    }

    pub fn encoding(&self) -> SnapshotEncoding {
        self.encoding
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Content hash of the encoded state. Equal states captured with the
    /// same encoding hash identically.
    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("encoding", &self.encoding)
            .field("len", &self.bytes.len())
            .field("hash", &self.hash)
            .finish()
    }
}
