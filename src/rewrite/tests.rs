use super::*;
use crate::ir::{Constant, Dim, OpKind, Type};
use crate::span::Span;

/// Rewrites `tensor.cast` into a call, but only for dynamically shaped results.
struct CastToCall;

impl ConversionPattern for CastToCall {
    fn root(&self) -> &'static str {
        "tensor.cast"
    }

    fn match_and_rewrite(
        &self,
        _op: OpId,
        operands: &[ValueId],
        rewriter: &mut ConversionRewriter<'_>,
    ) -> MatchResult {
        let ty = rewriter.result_type(0).clone();
        if ty.shape() != Some(&[Dim::Dynamic][..]) {
            return Err(Declined);
        }
        rewriter.replace_op_with_call("castHelper", operands.to_vec(), vec![ty]);
        Ok(())
    }
}

/// Emits a constant and a declaration, then declines.
struct DeclineAfterWork;

impl ConversionPattern for DeclineAfterWork {
    fn root(&self) -> &'static str {
        "tensor.cast"
    }

    fn match_and_rewrite(
        &self,
        _op: OpId,
        _operands: &[ValueId],
        rewriter: &mut ConversionRewriter<'_>,
    ) -> MatchResult {
        rewriter.create_value(
            OpKind::Constant(Constant::Int { value: 7, width: 32 }),
            vec![],
            Type::Int(32),
        );
        rewriter.get_or_declare_func("scratch", vec![], vec![]);
        Err(Declined)
    }
}

/// Claims success without replacing the root.
struct Forgetful;

impl ConversionPattern for Forgetful {
    fn root(&self) -> &'static str {
        "tensor.cast"
    }

    fn match_and_rewrite(
        &self,
        _op: OpId,
        _operands: &[ValueId],
        _rewriter: &mut ConversionRewriter<'_>,
    ) -> MatchResult {
        Ok(())
    }
}

fn cast_module(result_dim: Dim) -> (Module, OpId) {
    let src = Type::tensor(vec![Dim::Static(3)], Type::Int(8));
    let mut m = Module::new();
    let f = m.add_func("cast", vec![src.clone()], vec![]);
    let arg = m.func(f).args[0];
    let cast = m.append_op(
        f,
        OpKind::TensorCast,
        vec![arg],
        vec![Type::tensor(vec![result_dim], Type::Int(8))],
        Span::new(0, 5, 9),
    );
    let v = m.result(cast, 0);
    m.append_op(f, OpKind::Return, vec![v], vec![], Span::dummy());
    (m, cast)
}

#[test]
fn test_pattern_set_dispatch_by_root() {
    let mut set = PatternSet::new();
    set.add(CastToCall).add(DeclineAfterWork);
    assert_eq!(set.len(), 2);
    assert_eq!(set.for_root("tensor.cast").count(), 2);
    assert_eq!(set.for_root("tensor.dim").count(), 0);
}

#[test]
fn test_rewrite_replaces_and_remaps_uses() {
    let (mut m, cast) = cast_module(Dim::Dynamic);
    let mut set = PatternSet::new();
    set.add(CastToCall);
    let stats = apply_partial_conversion(&mut m, &set, &TypeConverter::new(), &ConversionTarget::new())
        .unwrap();
    assert_eq!(stats.converted_ops, 1);
    assert!(m.op(cast).erased);

    let f = m.lookup_func("cast").unwrap();
    let body = m.body_ops(f);
    assert_eq!(body.len(), 2);
    assert_eq!(m.op(body[0]).callee(), Some("castHelper"));
    // The return now uses the call result.
    assert_eq!(m.op(body[1]).operands, vec![m.result(body[0], 0)]);
    assert!(m.lookup_func("castHelper").is_some());
}

#[test]
fn test_declined_attempt_is_rolled_back() {
    let (mut m, cast) = cast_module(Dim::Static(3));
    let mut set = PatternSet::new();
    set.add(DeclineAfterWork).add(CastToCall);
    let stats = apply_partial_conversion(&mut m, &set, &TypeConverter::new(), &ConversionTarget::new())
        .unwrap();
    assert_eq!(stats.converted_ops, 0);
    assert_eq!(stats.declined, 2);
    assert!(!m.op(cast).erased);
    assert!(m.lookup_func("scratch").is_none());
    let f = m.lookup_func("cast").unwrap();
    assert_eq!(m.body_ops(f).len(), 2);
}

#[test]
fn test_first_successful_pattern_wins() {
    let (mut m, _) = cast_module(Dim::Dynamic);
    let mut set = PatternSet::new();
    set.add(DeclineAfterWork).add(CastToCall);
    let stats = apply_partial_conversion(&mut m, &set, &TypeConverter::new(), &ConversionTarget::new())
        .unwrap();
    assert_eq!(stats.converted_ops, 1);
    assert_eq!(stats.declined, 1);
    assert!(m.lookup_func("scratch").is_none());
    assert!(m.lookup_func("castHelper").is_some());
}

#[test]
#[should_panic(expected = "without replacing it")]
fn test_success_without_replacement_panics() {
    let (mut m, _) = cast_module(Dim::Dynamic);
    let mut set = PatternSet::new();
    set.add(Forgetful);
    let _ = apply_partial_conversion(&mut m, &set, &TypeConverter::new(), &ConversionTarget::new());
}

#[test]
fn test_illegal_leftovers_are_reported() {
    let (mut m, _) = cast_module(Dim::Static(3));
    let mut target = ConversionTarget::new();
    target.add_illegal_dialect("tensor");
    let errors = apply_partial_conversion(&mut m, &PatternSet::new(), &TypeConverter::new(), &target)
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "failed to legalize operation 'tensor.cast'");
    assert_eq!(errors[0].span, Span::new(0, 5, 9));
    assert_eq!(errors[0].notes[0], "in function @cast");
}

#[test]
fn test_dynamic_legality() {
    let (mut m, _) = cast_module(Dim::Static(3));
    let mut target = ConversionTarget::new();
    target.add_dynamically_legal_op("func.return", |_, op| op.operands.is_empty());
    let errors = apply_partial_conversion(&mut m, &PatternSet::new(), &TypeConverter::new(), &target)
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("func.return"));
}

#[test]
fn test_signature_conversion() {
    let (mut m, cast) = cast_module(Dim::Static(3));
    let mut tc = TypeConverter::new();
    tc.add_conversion(|ty| match ty {
        Type::Tensor(t) if t.shape == vec![Dim::Static(3)] => Some(Type::Ptr),
        _ => None,
    });
    let stats = apply_partial_conversion(&mut m, &PatternSet::new(), &tc, &ConversionTarget::new())
        .unwrap();
    assert_eq!(stats.converted_signatures, 1);
    let f = m.lookup_func("cast").unwrap();
    let new_arg = m.func(f).args[0];
    assert_eq!(m.value_type(new_arg), &Type::Ptr);
    assert_eq!(m.func(f).arg_types, vec![Type::Ptr]);
    // Unconverted users are remapped onto the new argument.
    assert_eq!(m.op(cast).operands, vec![new_arg]);
}
