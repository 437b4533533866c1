//! Sparse tensor primitives → calls into the sparse runtime support library.
//!
//! Tensors carrying a sparsity encoding become opaque `!llvm.ptr<i8>`
//! handles. `sparse_tensor.new` and dense-to-sparse `sparse_tensor.convert`
//! become calls to `newSparseTensor`, array queries become typed accessor
//! calls, and `sparse_tensor.tensor` folds back into the handle its arrays
//! were read from.
//!
//! Converting to library calls keeps the lowering simple; the runtime is
//! free to pick any storage scheme behind the handle.

pub mod codes;
pub mod constants;
pub mod patterns;
pub mod runtime;

use crate::diagnostic::Diagnostic;
use crate::ir::{Module, Type};
use crate::rewrite::{
    apply_partial_conversion, ConversionStats, ConversionTarget, PatternSet, TypeConverter,
};

pub use codes::{Action, OverheadType, PrimaryType};
pub use patterns::{
    ConvertConverter, DimSizeConverter, NewConverter, ReturnConverter, ToIndicesConverter,
    ToPointersConverter, ToTensorConverter, ToValuesConverter,
};

/// Register the sparse tensor conversion rules.
pub fn populate_sparse_tensor_conversion_patterns(patterns: &mut PatternSet) {
    patterns
        .add(ReturnConverter)
        .add(DimSizeConverter)
        .add(NewConverter)
        .add(ConvertConverter)
        .add(ToPointersConverter)
        .add(ToIndicesConverter)
        .add(ToValuesConverter)
        .add(ToTensorConverter);
}

/// Maps every sparse tensor type to the opaque handle type.
pub fn sparse_tensor_type_converter() -> TypeConverter {
    let mut converter = TypeConverter::new();
    converter.add_conversion(|ty| ty.is_sparse_tensor().then_some(Type::Ptr));
    converter
}

/// After conversion no `sparse_tensor` op may remain, returns must only
/// carry converted types, and `tensor.dim` must not query a sparse tensor
/// or a handle.
pub fn sparse_conversion_target() -> ConversionTarget {
    let mut target = ConversionTarget::new();
    target
        .add_illegal_dialect("sparse_tensor")
        .add_dynamically_legal_op("func.return", |module, op| {
            op.operands
                .iter()
                .all(|v| !module.value_type(*v).is_sparse_tensor())
        })
        .add_dynamically_legal_op("tensor.dim", |module, op| {
            let source = module.value_type(op.operands[0]);
            !source.is_sparse_tensor() && !source.is_ptr()
        });
    target
}

/// Convert all sparse tensor primitives of `module` into runtime calls.
pub fn convert_sparse_tensors(module: &mut Module) -> Result<ConversionStats, Vec<Diagnostic>> {
    let mut patterns = PatternSet::new();
    populate_sparse_tensor_conversion_patterns(&mut patterns);
    apply_partial_conversion(
        module,
        &patterns,
        &sparse_tensor_type_converter(),
        &sparse_conversion_target(),
    )
}
