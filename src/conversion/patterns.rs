//! Conversion rules for sparse tensor primitives.

use super::codes::Action;
use super::runtime::{
    gen_new_call, gen_ptr_call, indices_accessor, pointers_accessor, values_accessor, SPARSE_DIM_SIZE,
};
use crate::ir::{OpId, OpKind, Type, ValueId};
use crate::rewrite::{ConversionPattern, ConversionRewriter, Declined, MatchResult};

/// Re-emits returns with converted operands.
pub struct ReturnConverter;

impl ConversionPattern for ReturnConverter {
    fn root(&self) -> &'static str {
        "func.return"
    }

    fn match_and_rewrite(
        &self,
        _op: OpId,
        operands: &[ValueId],
        rewriter: &mut ConversionRewriter<'_>,
    ) -> MatchResult {
        rewriter.replace_op_with_new(OpKind::Return, operands.to_vec(), vec![]);
        Ok(())
    }
}

/// `tensor.dim` on an opaque handle becomes `sparseDimSize`.
pub struct DimSizeConverter;

impl ConversionPattern for DimSizeConverter {
    fn root(&self) -> &'static str {
        "tensor.dim"
    }

    fn match_and_rewrite(
        &self,
        _op: OpId,
        operands: &[ValueId],
        rewriter: &mut ConversionRewriter<'_>,
    ) -> MatchResult {
        // Dense sources, or sources not converted yet, are not ours.
        if !rewriter.value_type(operands[0]).is_ptr() {
            return Err(Declined);
        }
        let res = rewriter.result_type(0).clone();
        rewriter.replace_op_with_call(SPARSE_DIM_SIZE, operands.to_vec(), vec![res]);
        Ok(())
    }
}

/// `sparse_tensor.new` becomes `newSparseTensor` with action 0.
pub struct NewConverter;

impl ConversionPattern for NewConverter {
    fn root(&self) -> &'static str {
        "sparse_tensor.new"
    }

    fn match_and_rewrite(
        &self,
        _op: OpId,
        operands: &[ValueId],
        rewriter: &mut ConversionRewriter<'_>,
    ) -> MatchResult {
        let enc = rewriter.result_type(0).sparse_encoding().cloned().ok_or(Declined)?;
        gen_new_call(rewriter, &enc, Action::FromMetadata, operands[0]);
        Ok(())
    }
}

/// Dense to sparse `sparse_tensor.convert`: expose the dense buffer and
/// hand it to `newSparseTensor` with action 1.
pub struct ConvertConverter;

impl ConversionPattern for ConvertConverter {
    fn root(&self) -> &'static str {
        "sparse_tensor.convert"
    }

    fn match_and_rewrite(
        &self,
        _op: OpId,
        operands: &[ValueId],
        rewriter: &mut ConversionRewriter<'_>,
    ) -> MatchResult {
        let enc_dst = rewriter.result_type(0).sparse_encoding().cloned().ok_or(Declined)?;
        let source = rewriter.op().operands[0];
        // TODO: sparse => sparse and sparse => dense.
        if rewriter.value_type(source).is_sparse_tensor() {
            return Err(Declined);
        }
        let ptr = gen_ptr_call(rewriter, operands[0]).ok_or(Declined)?;
        gen_new_call(rewriter, &enc_dst, Action::FromData, ptr);
        Ok(())
    }
}

/// Replace the root with `accessor(operands)` where the accessor is picked
/// by the element type of the root's buffer result.
fn rewrite_accessor(
    rewriter: &mut ConversionRewriter<'_>,
    operands: &[ValueId],
    accessor: fn(&Type) -> Option<&'static str>,
) -> MatchResult {
    let res = rewriter.result_type(0).clone();
    let name = res.element_type().and_then(accessor).ok_or(Declined)?;
    rewriter.replace_op_with_call(name, operands.to_vec(), vec![res]);
    Ok(())
}

/// `sparse_tensor.pointers` becomes `sparsePointers{,64,32,16,8}`.
pub struct ToPointersConverter;

impl ConversionPattern for ToPointersConverter {
    fn root(&self) -> &'static str {
        "sparse_tensor.pointers"
    }

    fn match_and_rewrite(
        &self,
        _op: OpId,
        operands: &[ValueId],
        rewriter: &mut ConversionRewriter<'_>,
    ) -> MatchResult {
        rewrite_accessor(rewriter, operands, pointers_accessor)
    }
}

/// `sparse_tensor.indices` becomes `sparseIndices{,64,32,16,8}`.
pub struct ToIndicesConverter;

impl ConversionPattern for ToIndicesConverter {
    fn root(&self) -> &'static str {
        "sparse_tensor.indices"
    }

    fn match_and_rewrite(
        &self,
        _op: OpId,
        operands: &[ValueId],
        rewriter: &mut ConversionRewriter<'_>,
    ) -> MatchResult {
        rewrite_accessor(rewriter, operands, indices_accessor)
    }
}

/// `sparse_tensor.values` becomes `sparseValues{F64,F32,I64,I32,I16,I8}`.
pub struct ToValuesConverter;

impl ConversionPattern for ToValuesConverter {
    fn root(&self) -> &'static str {
        "sparse_tensor.values"
    }

    fn match_and_rewrite(
        &self,
        _op: OpId,
        operands: &[ValueId],
        rewriter: &mut ConversionRewriter<'_>,
    ) -> MatchResult {
        rewrite_accessor(rewriter, operands, values_accessor)
    }
}

/// Folds `sparse_tensor.tensor` into the handle its arrays were read from.
///
/// Every operand produced by a runtime call must have been queried from
/// the same opaque handle; operands not produced by a call are ignored.
/// Mixing handles would alias distinct runtime tensors, so it declines.
pub struct ToTensorConverter;

impl ConversionPattern for ToTensorConverter {
    fn root(&self) -> &'static str {
        "sparse_tensor.tensor"
    }

    fn match_and_rewrite(
        &self,
        _op: OpId,
        operands: &[ValueId],
        rewriter: &mut ConversionRewriter<'_>,
    ) -> MatchResult {
        let module = rewriter.module();
        let mut ptr: Option<ValueId> = None;
        for &operand in operands {
            let Some(def) = module.defining_op(operand) else {
                continue;
            };
            let call = module.op(def);
            if call.callee().is_none() {
                continue;
            }
            let arg = *call.operands.first().ok_or(Declined)?;
            if !module.value_type(arg).is_ptr() {
                return Err(Declined);
            }
            match ptr {
                None => ptr = Some(arg),
                Some(p) if p != arg => return Err(Declined),
                Some(_) => {}
            }
        }
        let ptr = ptr.ok_or(Declined)?;
        rewriter.replace_op(vec![ptr]);
        Ok(())
    }
}
