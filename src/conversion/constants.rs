use crate::ir::{Constant, Dim, OpKind, Type, ValueId};
use crate::rewrite::ConversionRewriter;

/// Materialize `values` as a `width`-bit integer tensor constant.
///
/// The constant is cast from `tensor<N x iW>` to `tensor<? x iW>` so that
/// runtime signatures stay the same across tensor ranks.
pub fn materialize_int_array(rewriter: &mut ConversionRewriter<'_>, width: u32, values: &[u64]) -> ValueId {
    let element = Type::Int(width);
    let static_ty = Type::tensor(vec![Dim::Static(values.len() as u64)], element.clone());
    let dynamic_ty = Type::tensor(vec![Dim::Dynamic], element);
    let elts = rewriter.create_value(
        OpKind::Constant(Constant::Dense {
            width,
            values: values.to_vec(),
        }),
        vec![],
        static_ty,
    );
    rewriter.create_value(OpKind::TensorCast, vec![elts], dynamic_ty)
}

/// Materialize a scalar `width`-bit integer constant.
pub fn materialize_int(rewriter: &mut ConversionRewriter<'_>, width: u32, value: i64) -> ValueId {
    rewriter.create_value(
        OpKind::Constant(Constant::Int { value, width }),
        vec![],
        Type::Int(width),
    )
}
