//! Partial conversion driver.
//!
//! 1. Convert function signatures with the type converter.
//! 2. Walk each function body in order and offer every op to the
//!    patterns rooted at its name; the first success wins.
//! 3. Remap operands of surviving ops onto replacement values.
//! 4. Report every op the target still considers illegal.

use std::collections::HashMap;

use super::rewriter::RewriteState;
use super::{ConversionRewriter, ConversionTarget, PatternSet, TypeConverter};
use crate::diagnostic::Diagnostic;
use crate::ir::{FuncId, Module, OpId, ValueId};

/// Counters reported by a successful conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    /// Operations replaced by a pattern.
    pub converted_ops: usize,
    /// Pattern attempts that declined.
    pub declined: usize,
    /// Functions whose signature changed.
    pub converted_signatures: usize,
}

/// Original value -> replacement value. Chains are followed on lookup.
#[derive(Default)]
struct ValueMapping {
    map: HashMap<ValueId, ValueId>,
}

impl ValueMapping {
    fn map(&mut self, from: ValueId, to: ValueId) {
        if from != to {
            self.map.insert(from, to);
        }
    }

    fn lookup(&self, mut v: ValueId) -> ValueId {
        while let Some(&next) = self.map.get(&v) {
            v = next;
        }
        v
    }
}

/// Run `patterns` over every function body of `module`.
///
/// Ops no pattern converts stay in place. The conversion fails, with one
/// diagnostic per op, if any op left behind is illegal for `target`.
pub fn apply_partial_conversion(
    module: &mut Module,
    patterns: &PatternSet,
    converter: &TypeConverter,
    target: &ConversionTarget,
) -> Result<ConversionStats, Vec<Diagnostic>> {
    let mut stats = ConversionStats::default();
    let mut mapping = ValueMapping::default();

    let defined: Vec<FuncId> = module
        .func_ids()
        .filter(|f| !module.func(*f).is_declaration())
        .collect();

    for &func in &defined {
        if convert_signature(module, func, converter, &mut mapping) {
            stats.converted_signatures += 1;
        }
    }

    for &func in &defined {
        let ops = module.body_ops(func).to_vec();
        for op in ops {
            if module.op(op).erased {
                continue;
            }
            if rewrite_op(module, func, op, patterns, &mut mapping, &mut stats) {
                stats.converted_ops += 1;
            }
        }
    }

    for &func in &defined {
        for op in module.body_ops(func).to_vec() {
            let operands = module
                .op(op)
                .operands
                .iter()
                .map(|v| mapping.lookup(*v))
                .collect();
            module.op_mut(op).operands = operands;
        }
    }

    let mut errors = Vec::new();
    for &func in &defined {
        for &op in module.body_ops(func) {
            let operation = module.op(op);
            if target.is_legal(module, operation) {
                continue;
            }
            errors.push(
                Diagnostic::error(
                    format!("failed to legalize operation '{}'", operation.name()),
                    operation.span,
                )
                .with_note(format!("in function @{}", module.func(func).name))
                .with_note(module.display_op(op).to_string()),
            );
        }
    }

    tracing::debug!(
        converted = stats.converted_ops,
        declined = stats.declined,
        signatures = stats.converted_signatures,
        illegal = errors.len(),
        "partial conversion finished"
    );

    if errors.is_empty() {
        Ok(stats)
    } else {
        Err(errors)
    }
}

/// Convert argument and result types of `func`. Returns true if anything
/// changed.
fn convert_signature(
    module: &mut Module,
    func: FuncId,
    converter: &TypeConverter,
    mapping: &mut ValueMapping,
) -> bool {
    let mut changed = false;
    let arg_types = module.func(func).arg_types.clone();
    for (index, ty) in arg_types.iter().enumerate() {
        let converted = converter.convert_type(ty);
        if converted != *ty {
            let old = module.func(func).args[index];
            let new = module.replace_func_arg(func, index, converted);
            mapping.map(old, new);
            changed = true;
        }
    }
    let result_types: Vec<_> = module
        .func(func)
        .result_types
        .iter()
        .map(|ty| converter.convert_type(ty))
        .collect();
    if result_types != module.func(func).result_types {
        module.func_mut(func).result_types = result_types;
        changed = true;
    }
    changed
}

/// Offer `op` to its patterns. Returns true if one of them replaced it.
fn rewrite_op(
    module: &mut Module,
    func: FuncId,
    op: OpId,
    patterns: &PatternSet,
    mapping: &mut ValueMapping,
    stats: &mut ConversionStats,
) -> bool {
    let name = module.op(op).name();
    let operands: Vec<ValueId> = module
        .op(op)
        .operands
        .iter()
        .map(|v| mapping.lookup(*v))
        .collect();

    for pattern in patterns.for_root(name) {
        let mut rewriter = ConversionRewriter::new(module, op);
        let result = pattern.match_and_rewrite(op, &operands, &mut rewriter);
        let state = rewriter.finish();
        match result {
            Ok(()) => {
                tracing::debug!(op = name, pattern = pattern.name(), "rewrote");
                commit(module, func, op, state, mapping, pattern.name());
                return true;
            }
            Err(_) => {
                tracing::debug!(op = name, pattern = pattern.name(), "declined");
                stats.declined += 1;
                rollback(module, state);
            }
        }
    }
    false
}

fn commit(
    module: &mut Module,
    func: FuncId,
    op: OpId,
    state: RewriteState,
    mapping: &mut ValueMapping,
    pattern: &str,
) {
    let replacement = match state.replacement {
        Some(values) => values,
        None => panic!(
            "pattern {} matched {} without replacing it",
            pattern,
            module.op(op).name()
        ),
    };

    let f = module.func_mut(func);
    let body = match f.body.as_mut() {
        Some(body) => body,
        None => panic!("function @{} has no body", f.name),
    };
    let pos = match body.iter().position(|&o| o == op) {
        Some(pos) => pos,
        None => panic!("op {:?} is not in the body of @{}", op, f.name),
    };
    body.splice(pos..=pos, state.inserted);

    let results = module.op(op).results.clone();
    for (old, new) in results.into_iter().zip(replacement) {
        mapping.map(old, new);
    }
    module.op_mut(op).erased = true;
}

fn rollback(module: &mut Module, state: RewriteState) {
    for op in state.inserted {
        module.op_mut(op).erased = true;
    }
    module.truncate_funcs(state.funcs_before);
}
