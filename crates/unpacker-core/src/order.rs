//! Resource order resolution

use std::fmt;

use serde::{Deserialize, Serialize};
use unpacker_abc::{Instruction, Opcode};

use crate::charmap::CharMap;
use crate::error::Result;
use crate::walker::StringChainWalker;

/// Call literal that precedes every resource name
pub const DEFAULT_TARGET: &str = "writeBytes";

/// Knobs for order resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// Class holding the accessors, keymap and constructor
    pub class_index: usize,
    /// Call literal that precedes each resource name
    pub target: String,
    /// Fail on a missing keymap or an unmapped call instead of degrading
    pub strict: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            class_index: 0,
            target: DEFAULT_TARGET.to_owned(),
            strict: false,
        }
    }
}

/// Resource names in the order their payloads are written
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceOrder(Vec<String>);

impl ResourceOrder {
    /// Number of names
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was found
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names in order
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Names as a slice
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a ResourceOrder {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<String>> for ResourceOrder {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl fmt::Display for ResourceOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
        }
        f.write_str("]")
    }
}

/// Scans a constructor for `<target>` chains and decodes the chain after each
#[derive(Debug, Clone)]
pub struct OrderResolver<'a> {
    target: &'a str,
    strict: bool,
}

impl<'a> OrderResolver<'a> {
    /// Create a resolver for `target`
    pub fn new(target: &'a str) -> Self {
        Self {
            target,
            strict: false,
        }
    }

    /// Resolver configured from options
    pub fn from_options(options: &'a ResolveOptions) -> Self {
        Self::new(&options.target).strict(options.strict)
    }

    /// Reject unmapped calls in resource names
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Walk the constructor body after its `constructsuper`
    pub fn resolve(&self, instructions: &[Instruction], chars: &CharMap) -> Result<ResourceOrder> {
        let mut walker = StringChainWalker::new(instructions, chars).strict(self.strict);
        let mut order = Vec::new();

        if !walker.seek_past(Opcode::ConstructSuper) {
            tracing::warn!("constructsuper not found in instance initializer");
            return Ok(ResourceOrder(order));
        }

        while walker.next_string() {
            if !walker.match_target(self.target.as_bytes()) {
                continue;
            }
            walker.next_string();
            let name = String::from_utf8(walker.build()?)?;
            tracing::debug!(name = %name, "resource");
            order.push(name);
        }

        Ok(ResourceOrder(order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnpackError;
    use crate::walker::tests::{chain, chars};
    use unpacker_abc::{CodeBuilder, decode_code};

    fn constructor(body: impl FnOnce(&mut CodeBuilder)) -> Vec<Instruction> {
        let mut code = CodeBuilder::new();
        code.get_local_0().push_scope().get_local_0().construct_super(0);
        body(&mut code);
        code.return_void();
        decode_code(code.as_bytes()).unwrap()
    }

    fn write(code: &mut CodeBuilder, name: &str) {
        code.get_local_0();
        chain(code, "writeBytes");
        chain(code, name);
        code.call_property(500, 1).pop();
    }

    fn resolve(instructions: &[Instruction]) -> Vec<String> {
        OrderResolver::new(DEFAULT_TARGET)
            .resolve(instructions, &chars())
            .unwrap()
            .as_slice()
            .to_vec()
    }

    #[test]
    fn test_single_resource() {
        let instructions = constructor(|code| write(code, "alpha"));
        assert_eq!(resolve(&instructions), vec!["alpha"]);
    }

    #[test]
    fn test_resources_in_call_order() {
        let instructions = constructor(|code| {
            write(code, "icons");
            chain(code, "unrelated");
            code.pop().push_byte(4).pop();
            write(code, "sounds");
        });
        assert_eq!(resolve(&instructions), vec!["icons", "sounds"]);
    }

    #[test]
    fn test_no_construct_super() {
        let mut code = CodeBuilder::new();
        chain(&mut code, "writeBytes");
        chain(&mut code, "alpha");
        let instructions = decode_code(code.as_bytes()).unwrap();
        assert!(resolve(&instructions).is_empty());
    }

    #[test]
    fn test_chains_before_construct_super_ignored() {
        let mut code = CodeBuilder::new();
        chain(&mut code, "writeBytes");
        chain(&mut code, "early");
        code.get_local_0().construct_super(0);
        write(&mut code, "late");
        let instructions = decode_code(code.as_bytes()).unwrap();
        assert_eq!(resolve(&instructions), vec!["late"]);
    }

    #[test]
    fn test_no_target() {
        let instructions = constructor(|code| {
            chain(code, "writeByte");
            chain(code, "alpha");
            code.pop();
        });
        assert!(resolve(&instructions).is_empty());
    }

    #[test]
    fn test_unmapped_in_name() {
        let instructions = constructor(|code| write(code, "b?c"));
        assert_eq!(resolve(&instructions), vec!["bc"]);

        let strict = OrderResolver::new(DEFAULT_TARGET)
            .strict(true)
            .resolve(&instructions, &chars());
        assert!(matches!(strict, Err(UnpackError::UnmappedAccessor { .. })));
    }

    #[test]
    fn test_custom_target() {
        let instructions = constructor(|code| {
            chain(code, "load");
            chain(code, "maps");
            code.pop();
        });
        let options = ResolveOptions {
            target: "load".into(),
            ..ResolveOptions::default()
        };
        let order = OrderResolver::from_options(&options)
            .resolve(&instructions, &chars())
            .unwrap();
        assert_eq!(order.to_string(), "[maps]");
    }

    #[test]
    fn test_order_json() {
        let order = ResourceOrder::from(vec!["icons".to_owned(), "sounds".to_owned()]);
        assert_eq!(
            serde_json::to_string(&order).unwrap(),
            r#"["icons","sounds"]"#
        );
    }
}
