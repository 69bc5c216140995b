//! # Unpacker Movie
//!
//! Reads SWF movies far enough to hand the unpacker its inputs: the ABC
//! blocks, the `SymbolClass` links and the `DefineBinaryData` payloads.
//! Uncompressed (`FWS`) and zlib (`CWS`) bodies are supported.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod builder;
pub mod error;
pub mod header;
pub mod input;
pub mod movie;
mod stream;
pub mod tag;

pub use builder::MovieBuilder;
pub use error::{MovieError, Result};
pub use header::{Compression, Header, Rect};
pub use input::Input;
pub use movie::{FRAME1, Movie};
pub use tag::{BinaryData, DoAbc, Tag};
