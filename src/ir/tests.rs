use super::*;

fn csr() -> SparseTensorEncoding {
    SparseTensorEncoding::new(vec![DimLevelType::Dense, DimLevelType::Compressed])
}

#[test]
fn test_type_display() {
    assert_eq!(Type::Index.to_string(), "index");
    assert_eq!(Type::Int(8).to_string(), "i8");
    assert_eq!(Type::F32.to_string(), "f32");
    assert_eq!(Type::Ptr.to_string(), "!llvm.ptr<i8>");
    assert_eq!(
        Type::tensor(vec![Dim::Static(4), Dim::Dynamic], Type::F64).to_string(),
        "tensor<4x?xf64>"
    );
    assert_eq!(
        Type::memref(vec![Dim::Dynamic], Type::Index).to_string(),
        "memref<?xindex>"
    );
    assert_eq!(Type::unranked_memref(Type::F32).to_string(), "memref<*xf32>");
}

#[test]
fn test_sparse_tensor_display() {
    let enc = csr()
        .with_ordering(DimOrdering::new(vec![1, 0]))
        .with_bit_widths(32, 16);
    let ty = Type::sparse_tensor(vec![Dim::Static(8), Dim::Static(8)], Type::F32, enc);
    assert_eq!(
        ty.to_string(),
        "tensor<8x8xf32, #sparse<[dense, compressed], ordering = (d0, d1) -> (d1, d0), ptr = 32, idx = 16>>"
    );
}

#[test]
fn test_sparse_encoding_accessor() {
    let dense = Type::tensor(vec![Dim::Static(2)], Type::F32);
    assert!(dense.sparse_encoding().is_none());
    assert!(!Type::Ptr.is_sparse_tensor());

    let sparse = Type::sparse_tensor(vec![Dim::Static(2), Dim::Static(3)], Type::F32, csr());
    assert_eq!(sparse.sparse_encoding(), Some(&csr()));
    assert_eq!(sparse.element_type(), Some(&Type::F32));
}

#[test]
fn test_dim_ordering_permutation() {
    assert!(DimOrdering::identity(3).is_permutation());
    assert!(DimOrdering::new(vec![2, 0, 1]).is_permutation());
    assert!(!DimOrdering::new(vec![0, 0, 1]).is_permutation());
    assert!(!DimOrdering::new(vec![0, 3, 1]).is_permutation());
    assert!(DimOrdering::new(vec![]).is_permutation());
}

#[test]
fn test_encoding_verify() {
    assert!(csr().verify(2).is_ok());
    assert!(csr().verify(3).is_err());

    let bad_order = csr().with_ordering(DimOrdering::new(vec![1, 1]));
    let err = bad_order.verify(2).unwrap_err();
    assert!(err.message.contains("not a permutation"));

    let short_order = csr().with_ordering(DimOrdering::new(vec![0]));
    assert!(short_order.verify(2).is_err());

    let bad_width = csr().with_bit_widths(12, 0);
    assert!(bad_width.verify(2).unwrap_err().message.contains("pointer bit width"));
}

#[test]
fn test_op_names_and_dialects() {
    assert_eq!(OpKind::SparseNew.name(), "sparse_tensor.new");
    assert_eq!(OpKind::SparseNew.dialect(), "sparse_tensor");
    assert_eq!(OpKind::TensorDim.dialect(), "tensor");
    assert_eq!(
        OpKind::Call {
            callee: "f".to_string()
        }
        .dialect(),
        "func"
    );
}

#[test]
fn test_get_or_declare_func_is_idempotent() {
    let mut m = Module::new();
    let first = m.get_or_declare_func("sparseDimSize", vec![Type::Ptr, Type::Index], vec![Type::Index]);
    let second = m.get_or_declare_func("sparseDimSize", vec![Type::Ptr], vec![Type::Index]);
    assert_eq!(first, second);
    assert_eq!(m.num_funcs(), 1);
    assert!(m.func(first).is_declaration());
    assert_eq!(m.func(first).visibility, Visibility::Private);
    // The first declaration's signature wins.
    assert_eq!(m.func(first).arg_types.len(), 2);
}

#[test]
fn test_truncate_funcs_forgets_symbols() {
    let mut m = Module::new();
    m.add_func("main", vec![], vec![]);
    m.get_or_declare_func("getPtrF64", vec![], vec![Type::Ptr]);
    m.truncate_funcs(1);
    assert_eq!(m.num_funcs(), 1);
    assert!(m.lookup_func("getPtrF64").is_none());
    assert!(m.lookup_func("main").is_some());
}

#[test]
fn test_defining_op() {
    let mut m = Module::new();
    let f = m.add_func("main", vec![Type::Ptr], vec![]);
    let arg = m.func(f).args[0];
    let c = m.append_op(
        f,
        OpKind::Constant(Constant::Index(0)),
        vec![],
        vec![Type::Index],
        Span::dummy(),
    );
    let v = m.result(c, 0);
    assert_eq!(m.defining_op(v), Some(c));
    assert_eq!(m.defining_op(arg), None);
    assert_eq!(m.value_type(v), &Type::Index);
    assert_eq!(m.body_ops(f), &[c]);
}

#[test]
#[should_panic(expected = "cannot append to declaration")]
fn test_append_to_declaration_panics() {
    let mut m = Module::new();
    let f = m.get_or_declare_func("ext", vec![], vec![]);
    m.append_op(f, OpKind::Return, vec![], vec![], Span::dummy());
}

#[test]
fn test_module_display() {
    let mut m = Module::new();
    m.get_or_declare_func("sparseDimSize", vec![Type::Ptr, Type::Index], vec![Type::Index]);
    let f = m.add_func("dim", vec![Type::Ptr], vec![Type::Index]);
    let arg = m.func(f).args[0];
    let c = m.append_op(
        f,
        OpKind::Constant(Constant::Index(1)),
        vec![],
        vec![Type::Index],
        Span::dummy(),
    );
    let idx = m.result(c, 0);
    let call = m.append_op(
        f,
        OpKind::Call {
            callee: "sparseDimSize".to_string(),
        },
        vec![arg, idx],
        vec![Type::Index],
        Span::dummy(),
    );
    let size = m.result(call, 0);
    m.append_op(f, OpKind::Return, vec![size], vec![], Span::dummy());

    let expected = "\
module {
  func.func private @sparseDimSize(!llvm.ptr<i8>, index) -> index
  func.func @dim(%2: !llvm.ptr<i8>) -> index {
    %3 = arith.constant 1 : index
    %4 = func.call @sparseDimSize(%2, %3) : (!llvm.ptr<i8>, index) -> index
    func.return %4 : index
  }
}";
    assert_eq!(m.to_string(), expected);
}

#[test]
fn test_dense_constant_display() {
    let mut m = Module::new();
    let f = m.add_func("k", vec![], vec![]);
    let c = m.append_op(
        f,
        OpKind::Constant(Constant::Dense {
            width: 8,
            values: vec![1, 0],
        }),
        vec![],
        vec![Type::tensor(vec![Dim::Static(2)], Type::Int(8))],
        Span::dummy(),
    );
    assert_eq!(
        m.display_op(c).to_string(),
        "%0 = arith.constant dense<[1, 0]> : tensor<2xi8>"
    );
}
