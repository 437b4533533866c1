//! Calls into the sparse runtime support library.
//!
//! The runtime owns all sparse storage. Compiled code only receives an
//! opaque `!llvm.ptr<i8>` handle from `newSparseTensor` and passes it back
//! to the accessors below.

use super::codes::{
    dim_level_type_encoding, overhead_type_encoding, primary_type_encoding, Action,
};
use super::constants::{materialize_int, materialize_int_array};
use crate::ir::{OpKind, SparseTensorEncoding, Type, ValueId};
use crate::rewrite::ConversionRewriter;

pub const NEW_SPARSE_TENSOR: &str = "newSparseTensor";
pub const SPARSE_DIM_SIZE: &str = "sparseDimSize";

/// A runtime entry point as the conversion emits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoint {
    pub name: &'static str,
    pub signature: &'static str,
}

const fn entry(name: &'static str, signature: &'static str) -> EntryPoint {
    EntryPoint { name, signature }
}

/// Every entry point the conversion can reference.
pub const RUNTIME_ENTRY_POINTS: &[EntryPoint] = &[
    entry(
        NEW_SPARSE_TENSOR,
        "(tensor<?xi8>, tensor<?xi64>, tensor<?xi64>, i64, i64, i64, i32, !llvm.ptr<i8>) -> !llvm.ptr<i8>",
    ),
    entry(SPARSE_DIM_SIZE, "(!llvm.ptr<i8>, index) -> index"),
    entry("getPtrF64", "(memref<*xf64>) -> !llvm.ptr<i8>"),
    entry("getPtrF32", "(memref<*xf32>) -> !llvm.ptr<i8>"),
    entry("getPtrI64", "(memref<*xi64>) -> !llvm.ptr<i8>"),
    entry("getPtrI32", "(memref<*xi32>) -> !llvm.ptr<i8>"),
    entry("getPtrI16", "(memref<*xi16>) -> !llvm.ptr<i8>"),
    entry("getPtrI8", "(memref<*xi8>) -> !llvm.ptr<i8>"),
    entry("sparsePointers", "(!llvm.ptr<i8>, index) -> memref<?xindex>"),
    entry("sparsePointers64", "(!llvm.ptr<i8>, index) -> memref<?xi64>"),
    entry("sparsePointers32", "(!llvm.ptr<i8>, index) -> memref<?xi32>"),
    entry("sparsePointers16", "(!llvm.ptr<i8>, index) -> memref<?xi16>"),
    entry("sparsePointers8", "(!llvm.ptr<i8>, index) -> memref<?xi8>"),
    entry("sparseIndices", "(!llvm.ptr<i8>, index) -> memref<?xindex>"),
    entry("sparseIndices64", "(!llvm.ptr<i8>, index) -> memref<?xi64>"),
    entry("sparseIndices32", "(!llvm.ptr<i8>, index) -> memref<?xi32>"),
    entry("sparseIndices16", "(!llvm.ptr<i8>, index) -> memref<?xi16>"),
    entry("sparseIndices8", "(!llvm.ptr<i8>, index) -> memref<?xi8>"),
    entry("sparseValuesF64", "(!llvm.ptr<i8>) -> memref<?xf64>"),
    entry("sparseValuesF32", "(!llvm.ptr<i8>) -> memref<?xf32>"),
    entry("sparseValuesI64", "(!llvm.ptr<i8>) -> memref<?xi64>"),
    entry("sparseValuesI32", "(!llvm.ptr<i8>) -> memref<?xi32>"),
    entry("sparseValuesI16", "(!llvm.ptr<i8>) -> memref<?xi16>"),
    entry("sparseValuesI8", "(!llvm.ptr<i8>) -> memref<?xi8>"),
];

/// `getPtr*` accessor exposing a dense buffer of `element`s as a raw pointer.
pub fn ptr_accessor(element: &Type) -> Option<&'static str> {
    match element {
        Type::F64 => Some("getPtrF64"),
        Type::F32 => Some("getPtrF32"),
        Type::Int(64) => Some("getPtrI64"),
        Type::Int(32) => Some("getPtrI32"),
        Type::Int(16) => Some("getPtrI16"),
        Type::Int(8) => Some("getPtrI8"),
        _ => None,
    }
}

/// Pointer-array accessor for an overhead element type.
pub fn pointers_accessor(element: &Type) -> Option<&'static str> {
    match element {
        Type::Index => Some("sparsePointers"),
        Type::Int(64) => Some("sparsePointers64"),
        Type::Int(32) => Some("sparsePointers32"),
        Type::Int(16) => Some("sparsePointers16"),
        Type::Int(8) => Some("sparsePointers8"),
        _ => None,
    }
}

/// Index-array accessor for an overhead element type.
pub fn indices_accessor(element: &Type) -> Option<&'static str> {
    match element {
        Type::Index => Some("sparseIndices"),
        Type::Int(64) => Some("sparseIndices64"),
        Type::Int(32) => Some("sparseIndices32"),
        Type::Int(16) => Some("sparseIndices16"),
        Type::Int(8) => Some("sparseIndices8"),
        _ => None,
    }
}

/// Values-array accessor for a primary element type.
pub fn values_accessor(element: &Type) -> Option<&'static str> {
    match element {
        Type::F64 => Some("sparseValuesF64"),
        Type::F32 => Some("sparseValuesF32"),
        Type::Int(64) => Some("sparseValuesI64"),
        Type::Int(32) => Some("sparseValuesI32"),
        Type::Int(16) => Some("sparseValuesI16"),
        Type::Int(8) => Some("sparseValuesI8"),
        _ => None,
    }
}

/// The encoded argument block of `newSparseTensor`, before the pointer.
///
/// Materialization order is fixed by the runtime signature: level types,
/// dimension sizes, permutation, pointer overhead, index overhead,
/// primary type, action, pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTensorParams {
    pub dim_level_types: Vec<u64>,
    /// Static extents, 0 where only known at runtime.
    pub dim_sizes: Vec<u64>,
    /// `permutation[ordering(i)] == i`.
    pub permutation: Vec<u64>,
    pub pointer_overhead: u32,
    pub index_overhead: u32,
    pub primary: u32,
    pub action: Action,
}

impl NewTensorParams {
    /// Encode `enc` for a tensor of type `tensor`.
    ///
    /// Panics if the level list does not match the tensor rank, if the
    /// dimension ordering is not a permutation, or if the element type has
    /// no primary encoding: all of these are guaranteed upstream.
    pub fn new(enc: &SparseTensorEncoding, tensor: &Type, action: Action) -> Self {
        let shape = match tensor.shape() {
            Some(shape) => shape,
            None => panic!("newSparseTensor result {} is not a ranked tensor", tensor),
        };
        let sz = enc.dim_level_type.len();
        assert_eq!(
            shape.len(),
            sz,
            "{} dimension level types for a rank {} tensor",
            sz,
            shape.len()
        );

        let dim_level_types = enc
            .dim_level_type
            .iter()
            .map(|dlt| u64::from(dim_level_type_encoding(*dlt)))
            .collect();

        let dim_sizes = shape.iter().map(|d| d.size().unwrap_or(0)).collect();

        let mut permutation = vec![0u64; sz];
        match &enc.dim_ordering {
            Some(ordering) => {
                assert!(
                    ordering.is_permutation() && ordering.num_results() == sz,
                    "dimension ordering {} is not a permutation of rank {}",
                    ordering,
                    sz
                );
                for i in 0..sz {
                    permutation[ordering.dim_position(i)] = i as u64;
                }
            }
            None => {
                for (i, p) in permutation.iter_mut().enumerate() {
                    *p = i as u64;
                }
            }
        }

        let element = tensor.element_type().unwrap_or(&Type::Index);
        let primary = primary_type_encoding(element);
        assert!(
            primary != 0,
            "unsupported element type {} for a sparse tensor",
            element
        );

        Self {
            dim_level_types,
            dim_sizes,
            permutation,
            pointer_overhead: overhead_type_encoding(enc.pointer_bit_width),
            index_overhead: overhead_type_encoding(enc.index_bit_width),
            primary,
            action,
        }
    }

    /// Emit the constants and return the full argument list, ending in `ptr`.
    pub fn materialize(&self, rewriter: &mut ConversionRewriter<'_>, ptr: ValueId) -> Vec<ValueId> {
        vec![
            materialize_int_array(rewriter, 8, &self.dim_level_types),
            materialize_int_array(rewriter, 64, &self.dim_sizes),
            materialize_int_array(rewriter, 64, &self.permutation),
            materialize_int(rewriter, 64, i64::from(self.pointer_overhead)),
            materialize_int(rewriter, 64, i64::from(self.index_overhead)),
            materialize_int(rewriter, 64, i64::from(self.primary)),
            materialize_int(rewriter, 32, self.action as i64),
            ptr,
        ]
    }
}

/// Replace the root with a `newSparseTensor` call materializing a sparse
/// tensor described by `enc`.
pub fn gen_new_call(
    rewriter: &mut ConversionRewriter<'_>,
    enc: &SparseTensorEncoding,
    action: Action,
    ptr: ValueId,
) {
    let params = NewTensorParams::new(enc, rewriter.result_type(0), action);
    let args = params.materialize(rewriter, ptr);
    rewriter.replace_op_with_call(NEW_SPARSE_TENSOR, args, vec![Type::Ptr]);
}

/// Expose the dense buffer behind `val` as a raw pointer, typed after the
/// root's result element type.
///
/// Returns `None`, without emitting anything, when the element type has
/// no `getPtr*` accessor.
pub fn gen_ptr_call(rewriter: &mut ConversionRewriter<'_>, val: ValueId) -> Option<ValueId> {
    let result = rewriter.result_type(0).clone();
    let element = result.element_type()?.clone();
    let name = ptr_accessor(&element)?;
    let shape = result.shape()?.to_vec();

    let buffer = rewriter.create_value(
        OpKind::BufferCast,
        vec![val],
        Type::memref(shape, element.clone()),
    );
    let unranked = rewriter.create_value(
        OpKind::MemRefCast,
        vec![buffer],
        Type::unranked_memref(element),
    );
    let call = rewriter.create_call(name, vec![unranked], vec![Type::Ptr]);
    Some(rewriter.module().result(call, 0))
}
