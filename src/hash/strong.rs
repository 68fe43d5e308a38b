//! Strong block checksums
//!
//! Weak-hash hits are confirmed with a cryptographic-grade digest truncated
//! to the signature's configured length: MD4 (16 bytes) for the `*_MD4`
//! flavors, BLAKE2b-256 (32 bytes) for the `*_BLAKE2B` flavors.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use md4::Md4;

use crate::error::{Error, Result};

type Blake2b256 = Blake2b<U32>;

/// Maximum truncation length of an MD4 strong checksum
pub const MD4_MAX_LEN: u32 = 16;

/// Maximum truncation length of a BLAKE2b-256 strong checksum
pub const BLAKE2B_MAX_LEN: u32 = 32;

/// The strong-hash half of a checksum pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrongHash {
    Md4,
    Blake2b,
}

impl StrongHash {
    /// Digest length of the underlying hash, the upper bound for truncation
    pub fn max_len(self) -> u32 {
        match self {
            StrongHash::Md4 => MD4_MAX_LEN,
            StrongHash::Blake2b => BLAKE2B_MAX_LEN,
        }
    }

    /// Hash `data` and return the first `len` digest bytes
    pub fn sum(self, data: &[u8], len: u32) -> Result<Vec<u8>> {
        let max = self.max_len();
        if len > max {
            return Err(Error::config(format!(
                "strong checksum size {len} exceeds maximum {max}"
            )));
        }

        let mut digest = match self {
            StrongHash::Md4 => Md4::digest(data).to_vec(),
            StrongHash::Blake2b => Blake2b256::digest(data).to_vec(),
        };
        digest.truncate(len as usize);
        Ok(digest)
    }
}
