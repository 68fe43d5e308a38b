//! Delta application
//!
//! Replays a delta stream against a seekable basis (the original), writing
//! the reconstructed new stream. LITERAL payloads are streamed straight
//! from the delta; COPY commands seek the basis and stream from there. The
//! delta is trusted: no content verification happens here.

use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ReadBytesExt};

use crate::delta::{DELTA_MAGIC, MIN_COPY, MIN_PARAM_LITERAL, MIN_RESERVED};
use crate::error::{Error, Result};

/// Apply `delta` to `basis`, writing the new stream to `output`.
///
/// Returns once the END command has been consumed; anything trailing it in
/// the delta stream is left unread.
pub fn patch<B: Read + Seek, W: Write, D: Read>(
    basis: &mut B,
    mut output: W,
    delta: D,
) -> Result<()> {
    let mut delta = BufReader::new(delta);

    let magic = delta.read_u32::<BigEndian>().map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::format("delta truncated inside the magic word")
        } else {
            Error::io("reading delta magic", e)
        }
    })?;
    if magic != DELTA_MAGIC {
        return Err(Error::format(format!(
            "invalid delta magic {magic:#010x}, expected {DELTA_MAGIC:#010x}"
        )));
    }

    let mut commands = 0u64;
    loop {
        let code = delta.read_u8().map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                Error::format("delta truncated before the end command")
            } else {
                Error::io("reading delta command", e)
            }
        })?;
        commands += 1;

        if code == 0 {
            output
                .flush()
                .map_err(|e| Error::io("flushing patch output", e))?;
            tracing::debug!(commands, "Patch applied");
            return Ok(());
        }
        if code >= MIN_RESERVED {
            return Err(Error::format(format!(
                "reserved delta command code {code}"
            )));
        }

        if code < MIN_COPY {
            let length = if code < MIN_PARAM_LITERAL {
                code as u64
            } else {
                read_param(&mut delta, code - MIN_PARAM_LITERAL)?
            };
            stream_exact(&mut delta, &mut output, length, "literal data")?;
        } else {
            let offset = code - MIN_COPY;
            let position = read_param(&mut delta, offset / 4)?;
            let length = read_param(&mut delta, offset % 4)?;

            basis
                .seek(SeekFrom::Start(position))
                .map_err(|e| Error::io("seeking the basis", e))?;
            stream_exact(basis, &mut output, length, "a copy command's source range")?;
        }
    }
}

/// Parameter width for a command-code offset
fn param_size(offset: u8) -> u8 {
    match offset {
        0 => 1,
        1 => 2,
        2 => 4,
        _ => 8,
    }
}

fn read_param<D: Read>(delta: &mut D, offset: u8) -> Result<u64> {
    let result = match param_size(offset) {
        1 => delta.read_u8().map(u64::from),
        2 => delta.read_u16::<BigEndian>().map(u64::from),
        4 => delta.read_u32::<BigEndian>().map(u64::from),
        _ => delta.read_u64::<BigEndian>(),
    };
    result.map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::format("delta truncated inside a command parameter")
        } else {
            Error::io("reading a command parameter", e)
        }
    })
}

/// Stream exactly `length` bytes from `reader` to `writer`
fn stream_exact<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    length: u64,
    what: &str,
) -> Result<()> {
    let copied = io::copy(&mut reader.by_ref().take(length), writer)?;
    if copied < length {
        return Err(Error::format(format!(
            "stream ended inside {what}: expected {length} bytes, got {copied}"
        )));
    }
    Ok(())
}
