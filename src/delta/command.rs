//! Delta command encoder

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use super::{MIN_COPY, MIN_PARAM_LITERAL};
use crate::error::{Error, Result};

/// Smallest power-of-two byte width that fits `value`
fn param_width(value: u64) -> u8 {
    if value >> 32 > 0 {
        8
    } else if value >> 16 > 0 {
        4
    } else if value >> 8 > 0 {
        2
    } else {
        1
    }
}

/// Command-code offset for a parameter width
fn width_offset(width: u8) -> u8 {
    match width {
        1 => 0,
        2 => 1,
        4 => 2,
        _ => 3,
    }
}

fn write_param<W: Write>(output: &mut W, value: u64, width: u8) -> Result<()> {
    match width {
        1 => output.write_u8(value as u8)?,
        2 => output.write_u16::<BigEndian>(value as u16)?,
        4 => output.write_u32::<BigEndian>(value as u32)?,
        8 => output.write_u64::<BigEndian>(value)?,
        other => return Err(Error::internal(format!("invalid parameter width {other}"))),
    }
    Ok(())
}

/// Write a LITERAL command carrying `data` inline.
///
/// Lengths up to 64 are folded into the command code; longer literals use a
/// parameterized code followed by the length.
pub(crate) fn write_literal<W: Write>(output: &mut W, data: &[u8]) -> Result<()> {
    if data.is_empty() {
        return Err(Error::format("empty literal command"));
    }

    let length = data.len() as u64;
    if length < MIN_PARAM_LITERAL as u64 {
        output.write_u8(length as u8)?;
    } else {
        let width = param_width(length);
        output.write_u8(MIN_PARAM_LITERAL + width_offset(width))?;
        write_param(output, length, width)?;
    }
    output.write_all(data)?;
    Ok(())
}

/// Write a COPY command for `length` bytes at `position` in the original
pub(crate) fn write_copy<W: Write>(output: &mut W, position: u64, length: u64) -> Result<()> {
    let position_width = param_width(position);
    let length_width = param_width(length);

    output.write_u8(MIN_COPY + 4 * width_offset(position_width) + width_offset(length_width))?;
    write_param(output, position, position_width)?;
    write_param(output, length, length_width)?;
    Ok(())
}

/// Write the END command
pub(crate) fn write_end<W: Write>(output: &mut W) -> Result<()> {
    output.write_u8(0)?;
    Ok(())
}
