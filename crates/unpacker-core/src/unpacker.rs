//! Movie unpacker

use std::collections::HashMap;
use std::io::Write;

use unpacker_abc::AbcFile;
use unpacker_movie::{DoAbc, Movie};

use crate::charmap::CharMap;
use crate::error::{Result, UnpackError};
use crate::keymap::Keymap;
use crate::order::{OrderResolver, ResolveOptions, ResourceOrder};

/// Resolves the resource order of a movie and writes the resources
#[derive(Debug)]
pub struct Unpacker<'a> {
    movie: &'a Movie,
    frame1: &'a DoAbc,
    options: ResolveOptions,
    keymap: Keymap,
    chars: CharMap,
    order: ResourceOrder,
    binaries: HashMap<&'a str, &'a [u8]>,
}

impl<'a> Unpacker<'a> {
    /// Select the `frame1` block of `movie`
    pub fn new(movie: &'a Movie) -> Result<Self> {
        let frame1 = movie.frame1().ok_or(UnpackError::MissingFrame1)?;
        Ok(Self {
            movie,
            frame1,
            options: ResolveOptions::default(),
            keymap: Keymap::default(),
            chars: CharMap::default(),
            order: ResourceOrder::default(),
            binaries: HashMap::new(),
        })
    }

    /// Replace the resolution options
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// The `frame1` block
    pub fn frame1(&self) -> &'a DoAbc {
        self.frame1
    }

    fn abc(&self) -> &'a AbcFile {
        &self.frame1.abc
    }

    /// Keymap found by the last [`Self::resolve_order`]
    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// Char accessors found by the last [`Self::resolve_order`]
    pub fn char_map(&self) -> &CharMap {
        &self.chars
    }

    /// Order found by the last [`Self::resolve_order`]
    pub fn order(&self) -> &ResourceOrder {
        &self.order
    }

    /// Stripped resource names with their payloads
    pub fn binaries(&self) -> &HashMap<&'a str, &'a [u8]> {
        &self.binaries
    }

    /// Recover the resource order from the packed class
    pub fn resolve_order(&mut self) -> Result<&ResourceOrder> {
        let abc = self.abc();
        let class = abc.class(self.options.class_index)?;

        let cinit = abc.method(class.cinit())?.instructions()?;
        let keymap = Keymap::extract(&cinit, &abc.constants)?;
        if keymap.is_empty() && self.options.strict {
            return Err(UnpackError::MissingKeymap);
        }

        let chars = CharMap::build(class.itraits(), &abc.methods, &keymap)?;

        let iinit = abc.method(class.iinit())?.instructions()?;
        let order = OrderResolver::from_options(&self.options).resolve(&iinit, &chars)?;
        tracing::info!(order = %order, "resolved order");

        self.keymap = keymap;
        self.chars = chars;
        self.order = order;
        Ok(&self.order)
    }

    /// Index the movie's linked binaries by name.
    ///
    /// The symbol prefix up to the first `_` is removed.
    pub fn resolve_binaries(&mut self) {
        self.binaries = self
            .movie
            .binaries()
            .map(|(symbol, data)| (strip_prefix(symbol), data))
            .collect();
        tracing::debug!(binaries = self.binaries.len(), "resolved binaries");
    }

    /// Write the payloads in order.
    ///
    /// Stops at the first name without a payload and returns it.
    pub fn write_binaries(&self, out: &mut dyn Write) -> Result<Option<&str>> {
        for name in &self.order {
            match self.binaries.get(name.as_str()) {
                Some(data) => out.write_all(data)?,
                None => return Ok(Some(name.as_str())),
            }
        }
        out.flush()?;
        Ok(None)
    }

    /// Resolve everything and write the payloads
    pub fn unpack(&mut self, out: &mut dyn Write) -> Result<Option<&str>> {
        self.resolve_order()?;
        self.resolve_binaries();
        self.write_binaries(out)
    }
}

/// Class name without its package-like prefix
fn strip_prefix(symbol: &str) -> &str {
    symbol.split_once('_').map_or(symbol, |(_, name)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_prefix() {
        assert_eq!(strip_prefix("Transformice_icons"), "icons");
        assert_eq!(strip_prefix("a_b_c"), "b_c");
        assert_eq!(strip_prefix("plain"), "plain");
        assert_eq!(strip_prefix("_lead"), "lead");
    }
}
