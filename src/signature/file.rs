//! Signature wire format
//!
//! ```text
//! checksum_type : u32 BE
//! block_size    : u32 BE
//! strong_len    : u32 BE
//! entries until EOF:
//!   weak   : u32 BE
//!   strong : strong_len bytes
//! ```
//!
//! A short final block is still emitted; its checksums cover the short
//! data. The delta scanner only ever probes full-size windows, so such an
//! entry never matches, but the format stays symmetric with the original
//! stream.

use std::io::{self, BufReader, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::Signature;
use crate::error::{Error, Result};
use crate::hash::{Checksum, ChecksumType};

/// Chunk `input` into `block_size` blocks and write the signature stream.
///
/// Fails with a `Config` error when `block_size` or `strong_len` is zero,
/// or when `strong_len` exceeds the strong hash's digest length.
pub fn write_signature<R: Read, W: Write>(
    mut input: R,
    mut output: W,
    checksum_type: ChecksumType,
    block_size: u32,
    strong_len: u32,
) -> Result<()> {
    if block_size == 0 {
        return Err(Error::config("block size must be at least 1"));
    }
    if strong_len == 0 {
        return Err(Error::config("strong checksum size must be at least 1"));
    }
    let max = checksum_type.max_strong_len();
    if strong_len > max {
        return Err(Error::config(format!(
            "strong checksum size {strong_len} exceeds maximum {max} for checksum type {:#010x}",
            checksum_type.magic()
        )));
    }

    let checksum = Checksum::new(checksum_type);

    output
        .write_u32::<BigEndian>(checksum_type.magic())
        .map_err(|e| Error::io("writing signature header", e))?;
    output
        .write_u32::<BigEndian>(block_size)
        .map_err(|e| Error::io("writing signature header", e))?;
    output
        .write_u32::<BigEndian>(strong_len)
        .map_err(|e| Error::io("writing signature header", e))?;

    let mut block = vec![0u8; block_size as usize];
    let mut blocks = 0u64;
    loop {
        let filled = read_fill(&mut input, &mut block)
            .map_err(|e| Error::io("reading original stream", e))?;
        if filled == 0 {
            break;
        }

        let data = &block[..filled];
        let weak = checksum.weak_sum(data);
        let strong = checksum.strong_sum(data, strong_len)?;

        output
            .write_u32::<BigEndian>(weak)
            .map_err(|e| Error::io("writing signature entry", e))?;
        output
            .write_all(&strong)
            .map_err(|e| Error::io("writing signature entry", e))?;
        blocks += 1;
    }

    output
        .flush()
        .map_err(|e| Error::io("flushing signature output", e))?;

    tracing::debug!(blocks, block_size, strong_len, "Signature written");
    Ok(())
}

/// Parse a signature stream into its in-memory form.
///
/// EOF before an entry ends the block list; EOF inside an entry is a
/// `Format` error.
pub fn read_signature<R: Read>(input: R) -> Result<Signature> {
    let mut input = BufReader::new(input);

    let magic = read_header_u32(&mut input, "checksum type")?;
    let checksum_type = ChecksumType::from_magic(magic)?;
    let block_size = read_header_u32(&mut input, "block size")?;
    let strong_len = read_header_u32(&mut input, "strong checksum size")?;

    if block_size == 0 {
        return Err(Error::format("signature header has zero block size"));
    }
    if strong_len == 0 {
        return Err(Error::format(
            "signature header has zero strong checksum size",
        ));
    }
    let max = checksum_type.max_strong_len();
    if strong_len > max {
        return Err(Error::config(format!(
            "strong checksum size {strong_len} exceeds maximum {max} for checksum type {magic:#010x}"
        )));
    }

    let mut signature = Signature::new(checksum_type, block_size, strong_len);
    let mut strong = vec![0u8; strong_len as usize];
    loop {
        let mut weak = [0u8; 4];
        let filled =
            read_fill(&mut input, &mut weak).map_err(|e| Error::io("reading signature", e))?;
        if filled == 0 {
            break;
        }
        if filled < weak.len() {
            return Err(Error::format("signature truncated inside a weak checksum"));
        }

        input.read_exact(&mut strong).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                Error::format("signature truncated inside a strong checksum")
            } else {
                Error::io("reading signature", e)
            }
        })?;

        signature.add_block(u32::from_be_bytes(weak), &strong);
    }

    tracing::debug!(blocks = signature.block_count(), "Signature loaded");
    Ok(signature)
}

fn read_header_u32<R: Read>(input: &mut R, field: &str) -> Result<u32> {
    input.read_u32::<BigEndian>().map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::format(format!("signature truncated inside the {field} field"))
        } else {
            Error::io("reading signature header", e)
        }
    })
}

/// Read until `buf` is full or the stream ends; returns the bytes read.
fn read_fill<R: Read>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
