//! Pattern-based partial conversion.
//!
//! A `ConversionPattern` matches one operation kind and either replaces
//! the operation (through the `ConversionRewriter`) or declines. Patterns
//! are collected in a `PatternSet` keyed by root operation name; the
//! driver walks every function body, offers each op to its patterns in
//! registration order and checks the result against a
//! `ConversionTarget`.

pub mod driver;
pub mod rewriter;
pub mod type_converter;

use std::collections::HashMap;

use crate::ir::{Module, OpId, Operation, ValueId};

pub use driver::{apply_partial_conversion, ConversionStats};
pub use rewriter::ConversionRewriter;
pub use type_converter::TypeConverter;

/// A pattern did not apply to the operation it was offered.
///
/// Declining is ordinary control flow: the driver tries the next
/// pattern, and an op nobody converts is left for legality checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declined;

pub type MatchResult = Result<(), Declined>;

/// One rewrite rule.
pub trait ConversionPattern {
    /// Name of the operation kind this pattern is rooted at.
    fn root(&self) -> &'static str;

    /// Name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Replace `op` or decline.
    ///
    /// `operands` are the op's operands after remapping through earlier
    /// replacements; `rewriter.op()` still shows the original ones. On
    /// success the pattern must have replaced the root.
    fn match_and_rewrite(
        &self,
        op: OpId,
        operands: &[ValueId],
        rewriter: &mut ConversionRewriter<'_>,
    ) -> MatchResult;
}

/// Patterns indexed by root operation name.
#[derive(Default)]
pub struct PatternSet {
    patterns: Vec<Box<dyn ConversionPattern>>,
    by_root: HashMap<&'static str, Vec<usize>>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<P: ConversionPattern + 'static>(&mut self, pattern: P) -> &mut Self {
        let index = self.patterns.len();
        self.by_root.entry(pattern.root()).or_default().push(index);
        self.patterns.push(Box::new(pattern));
        self
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns rooted at `name`, in registration order.
    pub fn for_root<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a dyn ConversionPattern> + 'a {
        self.by_root
            .get(name)
            .map(|indices| indices.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&i| self.patterns[i].as_ref())
    }
}

type LegalityFn = Box<dyn Fn(&Module, &Operation) -> bool>;

/// Which operations may remain after conversion.
///
/// Ops of an illegal dialect are always illegal. Ops with a dynamic
/// legality callback are legal iff the callback says so. Everything else
/// is legal.
#[derive(Default)]
pub struct ConversionTarget {
    illegal_dialects: Vec<&'static str>,
    dynamic: HashMap<&'static str, LegalityFn>,
}

impl ConversionTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_illegal_dialect(&mut self, dialect: &'static str) -> &mut Self {
        self.illegal_dialects.push(dialect);
        self
    }

    pub fn add_dynamically_legal_op(
        &mut self,
        name: &'static str,
        legal: impl Fn(&Module, &Operation) -> bool + 'static,
    ) -> &mut Self {
        self.dynamic.insert(name, Box::new(legal));
        self
    }

    pub fn is_legal(&self, module: &Module, op: &Operation) -> bool {
        if self.illegal_dialects.contains(&op.kind.dialect()) {
            return false;
        }
        match self.dynamic.get(op.name()) {
            Some(legal) => legal(module, op),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests;
