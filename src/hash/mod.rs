//! Checksum flavors and the tagged façade over them
//!
//! A signature commits to one of four (weak, strong) checksum pairings,
//! identified on the wire by a 32-bit magic. [`Checksum`] bundles the
//! rolling weak hash with the strong-hash routine for one flavor so the
//! signature builder and the delta scanner can stay algorithm-agnostic.

pub mod rabinkarp;
pub mod rollsum;
pub mod strong;

pub use rabinkarp::RabinKarp;
pub use rollsum::Rollsum;
pub use strong::StrongHash;

use crate::error::{Error, Result};

/// The four (weak, strong) checksum pairings and their wire magics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumType {
    /// Adler-like rolling hash + MD4 (`0x72730136`)
    RollsumMd4,
    /// Adler-like rolling hash + BLAKE2b-256 (`0x72730137`)
    RollsumBlake2b,
    /// Rabin-Karp rolling hash + MD4 (`0x72730146`)
    RabinKarpMd4,
    /// Rabin-Karp rolling hash + BLAKE2b-256 (`0x72730147`)
    RabinKarpBlake2b,
}

impl ChecksumType {
    /// The magic written in the signature header
    pub const fn magic(self) -> u32 {
        match self {
            ChecksumType::RollsumMd4 => 0x7273_0136,
            ChecksumType::RollsumBlake2b => 0x7273_0137,
            ChecksumType::RabinKarpMd4 => 0x7273_0146,
            ChecksumType::RabinKarpBlake2b => 0x7273_0147,
        }
    }

    /// Resolve a signature-header magic
    pub fn from_magic(magic: u32) -> Result<Self> {
        match magic {
            0x7273_0136 => Ok(ChecksumType::RollsumMd4),
            0x7273_0137 => Ok(ChecksumType::RollsumBlake2b),
            0x7273_0146 => Ok(ChecksumType::RabinKarpMd4),
            0x7273_0147 => Ok(ChecksumType::RabinKarpBlake2b),
            other => Err(Error::config(format!(
                "unknown checksum type {other:#010x}"
            ))),
        }
    }

    /// The strong-hash half of this pairing
    pub fn strong_hash(self) -> StrongHash {
        match self {
            ChecksumType::RollsumMd4 | ChecksumType::RabinKarpMd4 => StrongHash::Md4,
            ChecksumType::RollsumBlake2b | ChecksumType::RabinKarpBlake2b => StrongHash::Blake2b,
        }
    }

    /// Largest permitted strong-checksum truncation for this pairing
    pub fn max_strong_len(self) -> u32 {
        self.strong_hash().max_len()
    }
}

/// Weak-hash state for one flavor
#[derive(Debug, Clone)]
enum WeakSum {
    Rollsum(Rollsum),
    RabinKarp(RabinKarp),
}

/// Rolling weak hash plus strong-hash routine for one [`ChecksumType`]
#[derive(Debug, Clone)]
pub struct Checksum {
    kind: ChecksumType,
    weak: WeakSum,
}

impl Checksum {
    /// Create a façade with a fresh weak-hash state
    pub fn new(kind: ChecksumType) -> Self {
        let weak = match kind {
            ChecksumType::RollsumMd4 | ChecksumType::RollsumBlake2b => {
                WeakSum::Rollsum(Rollsum::new())
            }
            ChecksumType::RabinKarpMd4 | ChecksumType::RabinKarpBlake2b => {
                WeakSum::RabinKarp(RabinKarp::new())
            }
        };
        Self { kind, weak }
    }

    /// The flavor this façade dispatches to
    pub fn checksum_type(&self) -> ChecksumType {
        self.kind
    }

    /// Add one byte to the newest end of the rolling window
    pub fn rollin(&mut self, byte: u8) {
        match &mut self.weak {
            WeakSum::Rollsum(sum) => sum.rollin(byte),
            WeakSum::RabinKarp(sum) => sum.rollin(byte),
        }
    }

    /// Remove one byte from the oldest end of the rolling window
    pub fn rollout(&mut self, byte: u8) {
        match &mut self.weak {
            WeakSum::Rollsum(sum) => sum.rollout(byte),
            WeakSum::RabinKarp(sum) => sum.rollout(byte),
        }
    }

    /// Current weak digest of the rolling window
    pub fn digest(&self) -> u32 {
        match &self.weak {
            WeakSum::Rollsum(sum) => sum.digest(),
            WeakSum::RabinKarp(sum) => sum.digest(),
        }
    }

    /// Number of bytes in the rolling window
    pub fn count(&self) -> u64 {
        match &self.weak {
            WeakSum::Rollsum(sum) => sum.count(),
            WeakSum::RabinKarp(sum) => sum.count(),
        }
    }

    /// Reset the rolling window to its fresh state
    pub fn reset(&mut self) {
        match &mut self.weak {
            WeakSum::Rollsum(sum) => sum.reset(),
            WeakSum::RabinKarp(sum) => sum.reset(),
        }
    }

    /// Weak digest of `data` on its own, independent of the rolling window
    pub fn weak_sum(&self, data: &[u8]) -> u32 {
        match self.kind {
            ChecksumType::RollsumMd4 | ChecksumType::RollsumBlake2b => {
                let mut sum = Rollsum::new();
                sum.update(data);
                sum.digest()
            }
            ChecksumType::RabinKarpMd4 | ChecksumType::RabinKarpBlake2b => {
                let mut sum = RabinKarp::new();
                sum.update(data);
                sum.digest()
            }
        }
    }

    /// Strong digest of `data`, truncated to `len` bytes
    pub fn strong_sum(&self, data: &[u8], len: u32) -> Result<Vec<u8>> {
        self.kind.strong_hash().sum(data, len)
    }
}
