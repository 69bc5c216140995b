//! # Unpacker Core
//!
//! Recovers the order in which a packed movie's constructor concatenates its
//! embedded binaries, then writes those binaries in that order.
//!
//! The packed class hides every string behind calls to one-character
//! accessor methods:
//!
//! 1. [`Keymap`]: the alphabet, the first string constant pushed by the
//!    static initializer
//! 2. [`CharMap`]: accessor name to the keymap byte it returns
//! 3. [`StringChainWalker`]: reads accessor call chains back as strings
//! 4. [`OrderResolver`]: collects the name following each `writeBytes` chain
//!    in the constructor
//!
//! [`Unpacker`] runs the pipeline on a decoded [`unpacker_movie::Movie`].

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod charmap;
pub mod error;
pub mod keymap;
pub mod order;
pub mod unpacker;
pub mod walker;

pub use charmap::{CharMap, is_char_accessor};
pub use error::{Result, UnpackError};
pub use keymap::Keymap;
pub use order::{DEFAULT_TARGET, OrderResolver, ResolveOptions, ResourceOrder};
pub use unpacker::Unpacker;
pub use walker::{CallUnit, StringChainWalker};
