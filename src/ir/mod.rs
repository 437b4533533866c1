//! Arena IR for sparse tensor programs.
//!
//! A `Module` owns three arenas (values, operations, functions) and a
//! symbol table. Functions hold a single block: an ordered list of
//! `OpId`s. Values are SSA: defined once, either as a function argument
//! or as an operation result.
//!
//! Rewrites never mutate an operation's kind or results. An op that is
//! replaced is marked erased and dropped from its block; its results are
//! remapped to the replacement values by the conversion driver.

pub mod display;
pub mod encoding;
pub mod types;

use std::collections::HashMap;

use crate::span::Span;

pub use encoding::{DimLevelType, DimOrdering, SparseTensorEncoding};
pub use types::{Dim, MemRefType, TensorType, Type};

// ─── Ids ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FuncId(pub u32);

// ─── Operations ───────────────────────────────────────────────────

/// Compile-time constant payloads of `arith.constant`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    /// Scalar signless integer of `width` bits.
    Int { value: i64, width: u32 },
    Index(i64),
    /// `dense<[..]>` integer array of `width` bits per element.
    Dense { width: u32, values: Vec<u64> },
}

/// Operation kinds understood by the IR.
///
/// `func`, `arith`, `tensor` and `memref` ops are the target vocabulary
/// of the conversion; `sparse_tensor` ops are its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpKind {
    // ── func ──
    /// Return the operands from the enclosing function.
    Return,
    /// Direct call to a module-level function.
    Call { callee: String },

    // ── arith ──
    Constant(Constant),

    // ── tensor ──
    /// Shape-relaxing tensor cast (e.g. `tensor<3xi8>` to `tensor<?xi8>`).
    TensorCast,
    /// `tensor.dim %t, %i`: size of dimension `%i`.
    TensorDim,

    // ── memref ──
    /// View a tensor as a buffer of the same shape.
    BufferCast,
    /// Buffer view cast, including ranked to unranked.
    MemRefCast,

    // ── sparse_tensor ──
    /// Materialize a sparse tensor from a source operand.
    SparseNew,
    /// Convert between tensor formats.
    SparseConvert,
    /// Per-level pointer (position) array: operands `(tensor, dim)`.
    ToPointers,
    /// Per-level index (coordinate) array: operands `(tensor, dim)`.
    ToIndices,
    /// Stored values array: operand `(tensor)`.
    ToValues,
    /// Reassemble a sparse tensor from its constituent arrays.
    ToTensor,
}

impl OpKind {
    /// Dialect-qualified operation name.
    pub fn name(&self) -> &'static str {
        match self {
            OpKind::Return => "func.return",
            OpKind::Call { .. } => "func.call",
            OpKind::Constant(_) => "arith.constant",
            OpKind::TensorCast => "tensor.cast",
            OpKind::TensorDim => "tensor.dim",
            OpKind::BufferCast => "memref.buffer_cast",
            OpKind::MemRefCast => "memref.cast",
            OpKind::SparseNew => "sparse_tensor.new",
            OpKind::SparseConvert => "sparse_tensor.convert",
            OpKind::ToPointers => "sparse_tensor.pointers",
            OpKind::ToIndices => "sparse_tensor.indices",
            OpKind::ToValues => "sparse_tensor.values",
            OpKind::ToTensor => "sparse_tensor.tensor",
        }
    }

    pub fn dialect(&self) -> &'static str {
        let name = self.name();
        match name.split_once('.') {
            Some((dialect, _)) => dialect,
            None => name,
        }
    }
}

/// One operation in the arena.
#[derive(Debug, Clone)]
pub struct Operation {
    pub kind: OpKind,
    pub operands: Vec<ValueId>,
    pub results: Vec<ValueId>,
    pub span: Span,
    pub erased: bool,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn result(&self, index: usize) -> ValueId {
        self.results[index]
    }

    pub fn callee(&self) -> Option<&str> {
        match &self.kind {
            OpKind::Call { callee } => Some(callee),
            _ => None,
        }
    }
}

// ─── Values ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueDef {
    Arg { func: FuncId, index: usize },
    Result { op: OpId, index: usize },
}

#[derive(Debug, Clone)]
pub struct ValueData {
    pub ty: Type,
    pub def: ValueDef,
}

// ─── Functions ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone)]
pub struct Func {
    pub name: String,
    pub args: Vec<ValueId>,
    pub arg_types: Vec<Type>,
    pub result_types: Vec<Type>,
    /// `None` for an external declaration.
    pub body: Option<Vec<OpId>>,
    pub visibility: Visibility,
}

impl Func {
    pub fn is_declaration(&self) -> bool {
        self.body.is_none()
    }
}

// ─── Module ───────────────────────────────────────────────────────

/// A compilation unit.
///
/// The symbol table doubles as the registry of declared runtime entry
/// points: `get_or_declare_func` inserts at most one declaration per name.
#[derive(Debug, Clone, Default)]
pub struct Module {
    values: Vec<ValueData>,
    ops: Vec<Operation>,
    funcs: Vec<Func>,
    symbols: HashMap<String, FuncId>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    // ── values ──

    pub fn value(&self, v: ValueId) -> &ValueData {
        &self.values[v.0 as usize]
    }

    pub fn value_type(&self, v: ValueId) -> &Type {
        &self.value(v).ty
    }

    /// The operation defining `v`, or `None` for a function argument.
    pub fn defining_op(&self, v: ValueId) -> Option<OpId> {
        match self.value(v).def {
            ValueDef::Result { op, .. } => Some(op),
            ValueDef::Arg { .. } => None,
        }
    }

    fn new_value(&mut self, ty: Type, def: ValueDef) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(ValueData { ty, def });
        id
    }

    // ── operations ──

    pub fn op(&self, id: OpId) -> &Operation {
        &self.ops[id.0 as usize]
    }

    pub(crate) fn op_mut(&mut self, id: OpId) -> &mut Operation {
        &mut self.ops[id.0 as usize]
    }

    /// Shorthand for `op(id).result(index)`.
    pub fn result(&self, id: OpId, index: usize) -> ValueId {
        self.op(id).result(index)
    }

    /// Create a detached operation. It belongs to no block until it is
    /// appended or spliced in.
    pub fn create_op(
        &mut self,
        kind: OpKind,
        operands: Vec<ValueId>,
        result_types: Vec<Type>,
        span: Span,
    ) -> OpId {
        let id = OpId(self.ops.len() as u32);
        let results = result_types
            .into_iter()
            .enumerate()
            .map(|(index, ty)| self.new_value(ty, ValueDef::Result { op: id, index }))
            .collect();
        self.ops.push(Operation {
            kind,
            operands,
            results,
            span,
            erased: false,
        });
        id
    }

    /// Create an operation at the end of `func`'s body.
    pub fn append_op(
        &mut self,
        func: FuncId,
        kind: OpKind,
        operands: Vec<ValueId>,
        result_types: Vec<Type>,
        span: Span,
    ) -> OpId {
        let op = self.create_op(kind, operands, result_types, span);
        let f = &mut self.funcs[func.0 as usize];
        match f.body.as_mut() {
            Some(body) => body.push(op),
            None => panic!("cannot append to declaration '{}'", f.name),
        }
        op
    }

    // ── functions ──

    pub fn func(&self, id: FuncId) -> &Func {
        &self.funcs[id.0 as usize]
    }

    pub(crate) fn func_mut(&mut self, id: FuncId) -> &mut Func {
        &mut self.funcs[id.0 as usize]
    }

    pub fn func_ids(&self) -> impl Iterator<Item = FuncId> {
        (0..self.funcs.len() as u32).map(FuncId)
    }

    pub fn funcs(&self) -> impl Iterator<Item = &Func> {
        self.funcs.iter()
    }

    pub fn num_funcs(&self) -> usize {
        self.funcs.len()
    }

    pub fn lookup_func(&self, name: &str) -> Option<FuncId> {
        self.symbols.get(name).copied()
    }

    /// Add a public function definition with an empty body.
    pub fn add_func(&mut self, name: &str, arg_types: Vec<Type>, result_types: Vec<Type>) -> FuncId {
        self.insert_func(name, arg_types, result_types, Some(Vec::new()), Visibility::Public)
    }

    /// Return the function named `name`, declaring it as a private
    /// external function on first reference.
    pub fn get_or_declare_func(
        &mut self,
        name: &str,
        arg_types: Vec<Type>,
        result_types: Vec<Type>,
    ) -> FuncId {
        if let Some(id) = self.lookup_func(name) {
            return id;
        }
        tracing::trace!(name, "declaring runtime function");
        self.insert_func(name, arg_types, result_types, None, Visibility::Private)
    }

    fn insert_func(
        &mut self,
        name: &str,
        arg_types: Vec<Type>,
        result_types: Vec<Type>,
        body: Option<Vec<OpId>>,
        visibility: Visibility,
    ) -> FuncId {
        assert!(
            !self.symbols.contains_key(name),
            "redefinition of symbol '{}'",
            name
        );
        let id = FuncId(self.funcs.len() as u32);
        let args = arg_types
            .iter()
            .enumerate()
            .map(|(index, ty)| self.new_value(ty.clone(), ValueDef::Arg { func: id, index }))
            .collect();
        self.funcs.push(Func {
            name: name.to_string(),
            args,
            arg_types,
            result_types,
            body,
            visibility,
        });
        self.symbols.insert(name.to_string(), id);
        id
    }

    /// Give argument `index` of `func` a fresh value of type `ty`,
    /// returning the new value. The old value is left for remapping.
    pub(crate) fn replace_func_arg(&mut self, func: FuncId, index: usize, ty: Type) -> ValueId {
        let v = self.new_value(ty.clone(), ValueDef::Arg { func, index });
        let f = self.func_mut(func);
        f.args[index] = v;
        f.arg_types[index] = ty;
        v
    }

    /// Drop functions declared after the first `len`.
    pub(crate) fn truncate_funcs(&mut self, len: usize) {
        for f in self.funcs.drain(len..) {
            self.symbols.remove(&f.name);
        }
    }

    /// Live operations of `func`'s body in order.
    pub fn body_ops(&self, func: FuncId) -> &[OpId] {
        self.func(func).body.as_deref().unwrap_or(&[])
    }

    /// Live operations of every function body, in module order.
    pub fn walk_ops(&self) -> impl Iterator<Item = OpId> + '_ {
        self.func_ids()
            .flat_map(move |f| self.body_ops(f).iter().copied())
    }
}

#[cfg(test)]
mod tests;
