//! Rabin-Karp rolling checksum
//!
//! The weak checksum used by the `RABINKARP_*` signature flavors. The hash
//! of a window `b_0 .. b_{n-1}` is
//! `SEED * MULT^n + b_0 * MULT^{n-1} + ... + b_{n-1}` in u32 wrapping
//! arithmetic. The non-zero seed encodes the window length, so zero blocks
//! of different lengths hash differently. Rolling a byte out divides the
//! tracked multiplier by `MULT` via its multiplicative inverse mod 2^32.

/// Initial hash value; makes the window length part of the hash.
pub const SEED: u32 = 1;

/// Hash multiplier: the product of two large primes, with a bit pattern
/// that suits an LCG-style mix.
pub const MULTIPLIER: u32 = 0x0810_4225;

/// Multiplicative inverse of [`MULTIPLIER`] mod 2^32.
pub const MULTIPLIER_INVERSE: u32 = 0x98F0_09AD;

/// Seed correction applied when rolling a byte out: `(MULTIPLIER - 1) * SEED`.
pub const ADJUSTMENT: u32 = 0x0810_4224;

/// Rolling checksum state. A fresh instance digests to `0x00000001`.
#[derive(Debug, Clone)]
pub struct RabinKarp {
    hash: u32,
    multiplier: u32,
    count: u64,
}

impl Default for RabinKarp {
    fn default() -> Self {
        Self::new()
    }
}

impl RabinKarp {
    /// Create a checksum with seeded state
    pub fn new() -> Self {
        Self {
            hash: SEED,
            multiplier: 1,
            count: 0,
        }
    }

    /// Add a whole buffer to the window
    pub fn update(&mut self, buf: &[u8]) {
        self.count += buf.len() as u64;
        for &byte in buf {
            self.hash = self.hash.wrapping_mul(MULTIPLIER).wrapping_add(byte as u32);
            self.multiplier = self.multiplier.wrapping_mul(MULTIPLIER);
        }
    }

    /// Slide the window by one byte: remove `out` from the oldest end and
    /// add `inb` to the newest. The window length is unchanged.
    pub fn rotate(&mut self, out: u8, inb: u8) {
        self.hash = self
            .hash
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(inb as u32)
            .wrapping_sub(self.multiplier.wrapping_mul((out as u32).wrapping_add(ADJUSTMENT)));
    }

    /// Add one byte to the newest end of the window
    pub fn rollin(&mut self, inb: u8) {
        self.hash = self.hash.wrapping_mul(MULTIPLIER).wrapping_add(inb as u32);
        self.count += 1;
        self.multiplier = self.multiplier.wrapping_mul(MULTIPLIER);
    }

    /// Remove one byte from the oldest end of the window
    pub fn rollout(&mut self, out: u8) {
        self.count -= 1;
        self.multiplier = self.multiplier.wrapping_mul(MULTIPLIER_INVERSE);
        self.hash = self
            .hash
            .wrapping_sub(self.multiplier.wrapping_mul((out as u32).wrapping_add(ADJUSTMENT)));
    }

    /// Current digest
    pub fn digest(&self) -> u32 {
        self.hash
    }

    /// Number of bytes currently in the window
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Reset to the seeded state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
