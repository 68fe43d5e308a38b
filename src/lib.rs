//! rdelta - Remote Differential Compression
//!
//! An implementation of the rsync-family signature/delta/patch codec: a
//! compact **signature** of an original byte stream (one weak and one
//! strong checksum per fixed-size block), a **delta** describing a new
//! stream as COPY/LITERAL commands against that signature, and a
//! **patcher** that replays the delta over the original to reproduce the
//! new stream.
//!
//! ```no_run
//! use std::io::Cursor;
//! use rdelta::{patch, read_signature, write_delta, write_signature, ChecksumType};
//!
//! # fn main() -> rdelta::Result<()> {
//! let original = b"the original contents".to_vec();
//! let new = b"the updated contents".to_vec();
//!
//! let mut signature = Vec::new();
//! write_signature(&original[..], &mut signature, ChecksumType::RabinKarpBlake2b, 2048, 32)?;
//!
//! let mut delta = Vec::new();
//! write_delta(&read_signature(&signature[..])?, &new[..], &mut delta, 4096)?;
//!
//! let mut rebuilt = Vec::new();
//! patch(&mut Cursor::new(original), &mut rebuilt, &delta[..])?;
//! assert_eq!(rebuilt, new);
//! # Ok(())
//! # }
//! ```

pub mod delta;
pub mod error;
pub mod hash;
pub mod patch;
pub mod signature;
pub mod window;

pub use delta::{write_delta, DELTA_MAGIC};
pub use error::{Error, Result};
pub use hash::{Checksum, ChecksumType};
pub use patch::patch;
pub use signature::{read_signature, write_signature, Signature};
