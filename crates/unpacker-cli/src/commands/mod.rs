//! CLI command implementations.

pub mod unpack;
