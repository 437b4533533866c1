use std::process;

use clap::Args;
use sparse_lowering::convert_sparse_tensors;
use sparse_lowering::ir::{
    Constant, Dim, DimLevelType, DimOrdering, Module, OpKind, SparseTensorEncoding, Type,
};
use sparse_lowering::span::Span;

#[derive(Args)]
pub struct DemoArgs {
    /// Add a sparse-to-sparse conversion, which has no lowering
    #[arg(long)]
    pub unsupported: bool,
}

/// CSR-like `tensor<?x?xf64>` with 32-bit overheads.
fn csr() -> Type {
    let enc = SparseTensorEncoding::new(vec![DimLevelType::Dense, DimLevelType::Compressed])
        .with_bit_widths(32, 32);
    Type::sparse_tensor(vec![Dim::Dynamic, Dim::Dynamic], Type::F64, enc)
}

fn sample_module(unsupported: bool) -> Module {
    let mut m = Module::new();
    let s = Span::dummy();

    let load = m.add_func("load_csr", vec![Type::Ptr], vec![csr(), Type::Index]);
    let src = m.func(load).args[0];
    let new = m.append_op(load, OpKind::SparseNew, vec![src], vec![csr()], s);
    let t = m.result(new, 0);
    let c1 = m.append_op(load, OpKind::Constant(Constant::Index(1)), vec![], vec![Type::Index], s);
    let c1 = m.result(c1, 0);
    let dim = m.append_op(load, OpKind::TensorDim, vec![t, c1], vec![Type::Index], s);
    let cols = m.result(dim, 0);
    m.append_op(load, OpKind::Return, vec![t, cols], vec![], s);

    let dense = Type::tensor(vec![Dim::Static(8), Dim::Static(8)], Type::F64);
    let sparsify = m.add_func("sparsify", vec![dense], vec![csr()]);
    let d = m.func(sparsify).args[0];
    let conv = m.append_op(sparsify, OpKind::SparseConvert, vec![d], vec![csr()], s);
    let t = m.result(conv, 0);
    m.append_op(sparsify, OpKind::Return, vec![t], vec![], s);

    if unsupported {
        let csc = Type::sparse_tensor(
            vec![Dim::Dynamic, Dim::Dynamic],
            Type::F64,
            SparseTensorEncoding::new(vec![DimLevelType::Dense, DimLevelType::Compressed])
                .with_ordering(DimOrdering::new(vec![1, 0])),
        );
        let f = m.add_func("transpose", vec![csr()], vec![csc.clone()]);
        let a = m.func(f).args[0];
        let conv = m.append_op(f, OpKind::SparseConvert, vec![a], vec![csc], s);
        let t = m.result(conv, 0);
        m.append_op(f, OpKind::Return, vec![t], vec![], s);
    }
    m
}

pub fn cmd_demo(args: DemoArgs) {
    let mut module = sample_module(args.unsupported);
    println!("// input\n{}\n", module);

    match convert_sparse_tensors(&mut module) {
        Ok(stats) => {
            println!("// lowered\n{}", module);
            eprintln!(
                "converted {} ops and {} signatures",
                stats.converted_ops, stats.converted_signatures
            );
        }
        Err(errors) => {
            for diag in &errors {
                eprintln!("error: {}", diag.message);
                for note in &diag.notes {
                    eprintln!("  note: {}", note);
                }
            }
            process::exit(1);
        }
    }
}
