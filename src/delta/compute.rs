//! The delta scanner
//!
//! Reads the new stream one byte at a time through a `block_size` rolling
//! window. Whenever the window's weak checksum appears in the signature's
//! index, the window contents are confirmed against the stored strong
//! checksum; a confirmed hit becomes a COPY command and the window restarts
//! from empty, so matches never overlap. Bytes that slide out of the window
//! unmatched accumulate in a bounded pending literal, flushed whenever it
//! fills, loses contiguity with the next evicted byte, or a COPY is about
//! to be emitted.

use std::io::{self, BufReader, Read, Write};

use byteorder::{BigEndian, WriteBytesExt};

use super::{command, DELTA_MAGIC};
use crate::error::{Error, Result};
use crate::hash::Checksum;
use crate::signature::Signature;
use crate::window::Window;

/// Unmatched bytes waiting to become a LITERAL command.
///
/// `position` is the new-stream offset of the first buffered byte; the
/// buffer only ever holds a contiguous run, so `position + data.len()` is
/// the offset the next byte must have to join it.
struct PendingLiteral {
    position: u64,
    data: Vec<u8>,
}

impl PendingLiteral {
    fn with_capacity(max_len: usize) -> Self {
        Self {
            position: 0,
            data: Vec::with_capacity(max_len),
        }
    }

    /// Emit the buffered run as a LITERAL command and restart empty
    fn flush<W: Write>(&mut self, output: &mut W) -> Result<()> {
        if !self.data.is_empty() {
            command::write_literal(output, &self.data)?;
            self.data.clear();
        }
        Ok(())
    }
}

/// Scan `input` against `signature` and write the delta stream.
///
/// `max_literal_len` bounds how many bytes a single LITERAL command may
/// carry (and therefore the literal buffer); it must be at least 1.
pub fn write_delta<R: Read, W: Write>(
    signature: &Signature,
    input: R,
    mut output: W,
    max_literal_len: u32,
) -> Result<()> {
    if max_literal_len == 0 {
        return Err(Error::config("maximum literal size must be at least 1"));
    }

    output
        .write_u32::<BigEndian>(DELTA_MAGIC)
        .map_err(|e| Error::io("writing delta magic", e))?;

    let block_size = signature.block_size() as u64;
    let max_literal = max_literal_len as usize;

    let mut input = BufReader::new(input);
    let mut window = Window::new(signature.block_size() as usize);
    let mut checksum = Checksum::new(signature.checksum_type());
    let mut literal = PendingLiteral::with_capacity(max_literal);

    // Offset of the most recently read byte; wraps to 0 on the first read.
    let mut position = u64::MAX;
    let mut matches = 0u64;

    while let Some(next_byte) = read_byte(&mut input)? {
        position = position.wrapping_add(1);

        checksum.rollin(next_byte);
        let evicted = window.push(next_byte);

        if checksum.count() < block_size {
            continue;
        }

        if let Some(first_byte) = evicted {
            // The window overflowed by one byte: the evicted byte either
            // joins the pending literal or is superseded by a later COPY.
            let evict_position = position - block_size;
            if literal.data.len() >= max_literal
                || (!literal.data.is_empty()
                    && literal.position + literal.data.len() as u64 != evict_position)
            {
                literal.flush(&mut output)?;
            }
            if literal.data.is_empty() {
                literal.position = evict_position;
            }
            literal.data.push(first_byte);

            checksum.rollout(first_byte);
        }

        if let Some(index) = signature.find_block(checksum.digest()) {
            let strong = checksum.strong_sum(window.as_slice(), signature.strong_len())?;
            if strong.as_slice() == signature.strong_sum(index) {
                literal.flush(&mut output)?;
                command::write_copy(&mut output, index as u64 * block_size, block_size)?;
                matches += 1;

                window.reset();
                checksum.reset();
            }
        }
    }

    // Tail: the pending literal followed by whatever never matched out of
    // the window, re-chunked to the literal bound.
    let mut tail = std::mem::take(&mut literal.data);
    tail.extend_from_slice(window.as_slice());
    for chunk in tail.chunks(max_literal) {
        command::write_literal(&mut output, chunk)?;
    }

    command::write_end(&mut output)?;
    output
        .flush()
        .map_err(|e| Error::io("flushing delta output", e))?;

    tracing::debug!(
        bytes = position.wrapping_add(1),
        matches,
        "Delta written"
    );
    Ok(())
}

fn read_byte<R: Read>(input: &mut R) -> Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match input.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::io("reading new stream", e)),
        }
    }
}
