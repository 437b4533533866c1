//! Value types: scalars, the opaque runtime handle, tensors and buffers.

use std::fmt;

use super::encoding::SparseTensorEncoding;

/// One dimension of a shaped type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dim {
    Static(u64),
    /// Size known only at runtime (printed `?`).
    Dynamic,
}

impl Dim {
    /// Static extent, or `None` for a dynamic dimension.
    pub fn size(self) -> Option<u64> {
        match self {
            Dim::Static(n) => Some(n),
            Dim::Dynamic => None,
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Static(n) => write!(f, "{}", n),
            Dim::Dynamic => write!(f, "?"),
        }
    }
}

/// Ranked tensor type, optionally annotated with a sparsity encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TensorType {
    pub shape: Vec<Dim>,
    pub element: Box<Type>,
    pub encoding: Option<SparseTensorEncoding>,
}

impl TensorType {
    pub fn rank(&self) -> usize {
        self.shape.len()
    }
}

/// Ranked buffer type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemRefType {
    pub shape: Vec<Dim>,
    pub element: Box<Type>,
}

/// IR value type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Target-native index integer.
    Index,
    /// Signless integer of the given bit width.
    Int(u32),
    F16,
    BF16,
    F32,
    F64,
    /// Opaque `!llvm.ptr<i8>`; the handle type of runtime-owned tensors.
    Ptr,
    Tensor(TensorType),
    MemRef(MemRefType),
    /// `memref<*xT>`: buffer view of statically unknown rank.
    UnrankedMemRef(Box<Type>),
}

impl Type {
    pub fn tensor(shape: Vec<Dim>, element: Type) -> Self {
        Type::Tensor(TensorType {
            shape,
            element: Box::new(element),
            encoding: None,
        })
    }

    pub fn sparse_tensor(shape: Vec<Dim>, element: Type, encoding: SparseTensorEncoding) -> Self {
        Type::Tensor(TensorType {
            shape,
            element: Box::new(element),
            encoding: Some(encoding),
        })
    }

    pub fn memref(shape: Vec<Dim>, element: Type) -> Self {
        Type::MemRef(MemRefType {
            shape,
            element: Box::new(element),
        })
    }

    pub fn unranked_memref(element: Type) -> Self {
        Type::UnrankedMemRef(Box::new(element))
    }

    /// The sparsity encoding, if this is a tensor type that carries one.
    pub fn sparse_encoding(&self) -> Option<&SparseTensorEncoding> {
        match self {
            Type::Tensor(t) => t.encoding.as_ref(),
            _ => None,
        }
    }

    pub fn is_sparse_tensor(&self) -> bool {
        self.sparse_encoding().is_some()
    }

    pub fn is_ptr(&self) -> bool {
        matches!(self, Type::Ptr)
    }

    pub fn is_integer(&self, width: u32) -> bool {
        matches!(self, Type::Int(w) if *w == width)
    }

    /// Element type of a shaped type (tensor or buffer).
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Tensor(t) => Some(&*t.element),
            Type::MemRef(m) => Some(&*m.element),
            Type::UnrankedMemRef(e) => Some(&**e),
            _ => None,
        }
    }

    /// Shape of a ranked shaped type.
    pub fn shape(&self) -> Option<&[Dim]> {
        match self {
            Type::Tensor(t) => Some(&t.shape),
            Type::MemRef(m) => Some(&m.shape),
            _ => None,
        }
    }
}

fn write_shape(f: &mut fmt::Formatter<'_>, shape: &[Dim]) -> fmt::Result {
    for dim in shape {
        write!(f, "{}x", dim)?;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Index => write!(f, "index"),
            Type::Int(w) => write!(f, "i{}", w),
            Type::F16 => write!(f, "f16"),
            Type::BF16 => write!(f, "bf16"),
            Type::F32 => write!(f, "f32"),
            Type::F64 => write!(f, "f64"),
            Type::Ptr => write!(f, "!llvm.ptr<i8>"),
            Type::Tensor(t) => {
                write!(f, "tensor<")?;
                write_shape(f, &t.shape)?;
                write!(f, "{}", t.element)?;
                if let Some(enc) = &t.encoding {
                    write!(f, ", {}", enc)?;
                }
                write!(f, ">")
            }
            Type::MemRef(m) => {
                write!(f, "memref<")?;
                write_shape(f, &m.shape)?;
                write!(f, "{}>", m.element)
            }
            Type::UnrankedMemRef(e) => write!(f, "memref<*x{}>", e),
        }
    }
}
