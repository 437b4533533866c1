use crate::ir::{FuncId, Module, OpId, OpKind, Operation, Type, ValueId};
use crate::span::Span;

/// Mutation handle given to a pattern for the duration of one attempt.
///
/// New operations are held back and spliced in front of the root only
/// when the pattern succeeds; on decline they are discarded together with
/// any functions declared during the attempt.
pub struct ConversionRewriter<'a> {
    module: &'a mut Module,
    root: OpId,
    span: Span,
    inserted: Vec<OpId>,
    replacement: Option<Vec<ValueId>>,
    funcs_before: usize,
}

/// What one pattern attempt produced.
pub(crate) struct RewriteState {
    pub inserted: Vec<OpId>,
    pub replacement: Option<Vec<ValueId>>,
    pub funcs_before: usize,
}

impl<'a> ConversionRewriter<'a> {
    pub(crate) fn new(module: &'a mut Module, root: OpId) -> Self {
        let span = module.op(root).span;
        let funcs_before = module.num_funcs();
        Self {
            module,
            root,
            span,
            inserted: Vec::new(),
            replacement: None,
            funcs_before,
        }
    }

    pub fn module(&self) -> &Module {
        &*self.module
    }

    /// The operation being rewritten, with its original operands.
    pub fn op(&self) -> &Operation {
        self.module.op(self.root)
    }

    pub fn value_type(&self, v: ValueId) -> &Type {
        self.module.value_type(v)
    }

    /// Type of the root's `index`th result.
    pub fn result_type(&self, index: usize) -> &Type {
        self.module.value_type(self.op().result(index))
    }

    /// Create an op in front of the root.
    pub fn create(&mut self, kind: OpKind, operands: Vec<ValueId>, result_types: Vec<Type>) -> OpId {
        let op = self.module.create_op(kind, operands, result_types, self.span);
        self.inserted.push(op);
        op
    }

    /// Create a single-result op in front of the root and return its value.
    pub fn create_value(&mut self, kind: OpKind, operands: Vec<ValueId>, ty: Type) -> ValueId {
        let op = self.create(kind, operands, vec![ty]);
        self.module.result(op, 0)
    }

    /// Reference a module-level function, declaring it on first use.
    pub fn get_or_declare_func(&mut self, name: &str, arg_types: Vec<Type>, result_types: Vec<Type>) -> FuncId {
        self.module.get_or_declare_func(name, arg_types, result_types)
    }

    /// Call `callee` (declared from the operand types on first use) in
    /// front of the root.
    pub fn create_call(&mut self, callee: &str, operands: Vec<ValueId>, result_types: Vec<Type>) -> OpId {
        let arg_types = operands
            .iter()
            .map(|v| self.module.value_type(*v).clone())
            .collect();
        self.get_or_declare_func(callee, arg_types, result_types.clone());
        self.create(
            OpKind::Call {
                callee: callee.to_string(),
            },
            operands,
            result_types,
        )
    }

    /// Replace every result of the root with `values`.
    pub fn replace_op(&mut self, values: Vec<ValueId>) {
        assert!(
            self.replacement.is_none(),
            "{} replaced twice",
            self.op().name()
        );
        assert_eq!(
            values.len(),
            self.op().results.len(),
            "replacement for {} has the wrong number of values",
            self.op().name()
        );
        self.replacement = Some(values);
    }

    /// Create a new op and replace the root with its results.
    pub fn replace_op_with_new(&mut self, kind: OpKind, operands: Vec<ValueId>, result_types: Vec<Type>) -> OpId {
        let op = self.create(kind, operands, result_types);
        let results = self.module.op(op).results.clone();
        self.replace_op(results);
        op
    }

    /// Replace the root with a call to `callee`.
    pub fn replace_op_with_call(&mut self, callee: &str, operands: Vec<ValueId>, result_types: Vec<Type>) -> OpId {
        let op = self.create_call(callee, operands, result_types);
        let results = self.module.op(op).results.clone();
        self.replace_op(results);
        op
    }

    pub(crate) fn finish(self) -> RewriteState {
        RewriteState {
            inserted: self.inserted,
            replacement: self.replacement,
            funcs_before: self.funcs_before,
        }
    }
}
