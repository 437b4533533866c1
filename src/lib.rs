pub mod conversion;
pub mod diagnostic;
pub mod ir;
pub mod rewrite;
pub mod span;
pub mod target;

// Re-exports: the pass entry points
pub use conversion::{
    convert_sparse_tensors, populate_sparse_tensor_conversion_patterns,
    sparse_conversion_target, sparse_tensor_type_converter,
};
pub use diagnostic::{render_diagnostics, Diagnostic};
pub use rewrite::ConversionStats;
