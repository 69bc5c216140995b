//! Char accessor table

use std::collections::HashMap;

use unpacker_abc::{Method, MultinameIndex, Opcode, Trait};

use crate::error::Result;
use crate::keymap::Keymap;

/// Shape of a char accessor: takes `...rest` and uses exactly two stack slots
pub fn is_char_accessor(method: &Method) -> bool {
    method.need_rest() && method.max_stack() == 2
}

/// Maps the name of each char accessor to the byte it returns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharMap {
    chars: HashMap<MultinameIndex, u8>,
}

impl CharMap {
    /// Collect the char accessors among a class's instance traits.
    ///
    /// An empty keymap yields an empty map.
    pub fn build(traits: &[Trait], methods: &[Method], keymap: &Keymap) -> Result<Self> {
        let mut chars = HashMap::new();
        if keymap.is_empty() {
            return Ok(Self { chars });
        }

        for t in traits {
            let Some(index) = t.as_method() else {
                continue;
            };
            let Some(method) = methods.get(index.0 as usize) else {
                tracing::trace!(method = index.0, "trait names a missing method");
                continue;
            };
            if !is_char_accessor(method) {
                continue;
            }

            let instructions = method.instructions()?;
            let Some(push) = instructions.iter().find(|i| i.is(Opcode::PushByte)) else {
                continue;
            };
            let byte = keymap.get(push.operand(0).unwrap_or(0) as u8)?;
            chars.insert(t.name, byte);
        }

        tracing::debug!(accessors = chars.len(), "resolved char accessors");
        Ok(Self { chars })
    }

    /// Byte returned by the accessor called `name`
    #[inline]
    pub fn get(&self, name: MultinameIndex) -> Option<u8> {
        self.chars.get(&name).copied()
    }

    /// Number of accessors
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether no accessor was found
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

impl FromIterator<(MultinameIndex, u8)> for CharMap {
    fn from_iter<I: IntoIterator<Item = (MultinameIndex, u8)>>(iter: I) -> Self {
        Self {
            chars: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnpackError;
    use unpacker_abc::{CodeBuilder, MethodIndex, TraitKind};

    fn accessor(byte: u8) -> Method {
        let mut code = CodeBuilder::new();
        code.get_local_0().push_scope().push_byte(byte).return_value();
        Method::builder()
            .need_rest(true)
            .body(2, code.into_bytes())
            .build()
    }

    fn traits(count: u32) -> Vec<Trait> {
        (0..count)
            .map(|i| Trait::method(MultinameIndex(10 + i), MethodIndex(i)))
            .collect()
    }

    #[test]
    fn test_fingerprint() {
        assert!(is_char_accessor(&accessor(0)));

        let no_rest = Method::builder().body(2, Vec::new()).build();
        assert!(!is_char_accessor(&no_rest));

        let wide = Method::builder().need_rest(true).body(3, Vec::new()).build();
        assert!(!is_char_accessor(&wide));

        let native = Method::builder().need_rest(true).build();
        assert!(!is_char_accessor(&native));
    }

    #[test]
    fn test_build() {
        let keymap = Keymap::new("wrteBys");
        let methods = vec![accessor(0), accessor(6), accessor(1)];

        let chars = CharMap::build(&traits(3), &methods, &keymap).unwrap();
        assert_eq!(chars.len(), 3);
        assert_eq!(chars.get(MultinameIndex(10)), Some(b'w'));
        assert_eq!(chars.get(MultinameIndex(11)), Some(b's'));
        assert_eq!(chars.get(MultinameIndex(12)), Some(b'r'));
        assert_eq!(chars.get(MultinameIndex(13)), None);

        // deterministic
        assert_eq!(CharMap::build(&traits(3), &methods, &keymap).unwrap(), chars);
    }

    #[test]
    fn test_non_accessors_excluded() {
        let keymap = Keymap::new("ab");
        let mut wide = accessor(1);
        if let Some(body) = wide.body.as_mut() {
            body.max_stack = 3;
        }
        let methods = vec![
            accessor(0),
            wide,
            Method::builder().body(2, Vec::new()).build(),
            // accessor shape without a pushbyte
            Method::builder().need_rest(true).body(2, vec![0x47]).build(),
            accessor(1),
        ];

        let mut traits = traits(5);
        // a getter over an accessor-shaped method does not count
        traits[4].kind = TraitKind::Getter {
            disp_id: 0,
            method: MethodIndex(4),
        };

        let chars = CharMap::build(&traits, &methods, &keymap).unwrap();
        assert_eq!(chars.len(), 1);
        assert_eq!(chars.get(MultinameIndex(10)), Some(b'a'));
    }

    #[test]
    fn test_missing_method_skipped() {
        let keymap = Keymap::new("ab");
        let chars = CharMap::build(&traits(2), &[accessor(1)], &keymap).unwrap();
        assert_eq!(chars.len(), 1);
    }

    #[test]
    fn test_keymap_index_out_of_range() {
        let keymap = Keymap::new("ab");
        let result = CharMap::build(&traits(1), &[accessor(2)], &keymap);
        assert!(matches!(
            result,
            Err(UnpackError::KeymapIndex { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_empty_keymap() {
        let chars = CharMap::build(&traits(1), &[accessor(0)], &Keymap::default()).unwrap();
        assert!(chars.is_empty());
    }
}
