//! On-disk framing for cache entries.
//!
//! Payloads are bincode-encoded, lz4-compressed, and wrapped in an envelope
//! carrying magic bytes, a format version and an MD5 checksum of the
//! compressed data. Anything that fails to unwrap cleanly is corrupt.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

use crate::constants::{ENTRY_FORMAT_VERSION, ENTRY_MAGIC};
use crate::utils::CacheError;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    magic: [u8; 4],
    format_version: u32,
    checksum: [u8; 16],
    original_size: u64,
    data: Vec<u8>,
}

/// Reasons an entry could not be unwrapped
#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("undecodable data: {0}")]
    Codec(#[from] bincode::Error),

    #[error("decompression failed: {0}")]
    Decompress(#[source] io::Error),

    #[error("bad magic bytes {0:?}")]
    BadMagic([u8; 4]),

    #[error("format version {found}, expected {expected}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("payload is {found} bytes, header says {expected}")]
    SizeMismatch { expected: u64, found: u64 },
}

// Varint integers keep entries small; trailing garbage counts as corruption
fn codec() -> impl Options {
    bincode::DefaultOptions::new().reject_trailing_bytes()
}

/// Serialize and frame a payload
pub fn encode<T>(payload: &T) -> Result<Vec<u8>, CacheError>
where
    T: Serialize + ?Sized,
{
    let serialized = codec().serialize(payload)?;
    let compressed = lz4::block::compress(&serialized, None, true).map_err(CacheError::Compress)?;

    let envelope = Envelope {
        magic: ENTRY_MAGIC,
        format_version: ENTRY_FORMAT_VERSION,
        checksum: md5::compute(&compressed).0,
        original_size: serialized.len() as u64,
        data: compressed,
    };

    Ok(codec().serialize(&envelope)?)
}

/// Unwrap and deserialize a payload
pub fn decode<T>(bytes: &[u8]) -> Result<T, EnvelopeError>
where
    T: DeserializeOwned,
{
    let envelope: Envelope = codec().deserialize(bytes)?;

    if envelope.magic != ENTRY_MAGIC {
        return Err(EnvelopeError::BadMagic(envelope.magic));
    }
    if envelope.format_version != ENTRY_FORMAT_VERSION {
        return Err(EnvelopeError::VersionMismatch {
            expected: ENTRY_FORMAT_VERSION,
            found: envelope.format_version,
        });
    }
    if md5::compute(&envelope.data).0 != envelope.checksum {
        return Err(EnvelopeError::ChecksumMismatch);
    }

    let decompressed =
        lz4::block::decompress(&envelope.data, None).map_err(EnvelopeError::Decompress)?;
    if decompressed.len() as u64 != envelope.original_size {
        return Err(EnvelopeError::SizeMismatch {
            expected: envelope.original_size,
            found: decompressed.len() as u64,
        });
    }

    Ok(codec().deserialize(&decompressed)?)
}
