//! Textual form of modules, loosely following MLIR's generic syntax.

use std::fmt;

use super::{Constant, Func, Module, OpId, OpKind, Type, ValueId, Visibility};

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int { value, .. } => write!(f, "{}", value),
            Constant::Index(value) => write!(f, "{}", value),
            Constant::Dense { values, .. } => {
                let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "dense<[{}]>", items.join(", "))
            }
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `T`, `(T, U)` or `()`.
fn result_list(types: &[Type]) -> String {
    match types {
        [single] => single.to_string(),
        _ => format!("({})", join(types)),
    }
}

/// Display adapter for a single operation.
pub struct OpDisplay<'a> {
    module: &'a Module,
    op: OpId,
}

impl Module {
    pub fn display_op(&self, op: OpId) -> OpDisplay<'_> {
        OpDisplay { module: self, op }
    }

    fn types_of(&self, values: &[ValueId]) -> Vec<Type> {
        values.iter().map(|v| self.value_type(*v).clone()).collect()
    }
}

impl fmt::Display for OpDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.module.op(self.op);
        let operand_types = self.module.types_of(&op.operands);
        let result_types = self.module.types_of(&op.results);

        if !op.results.is_empty() {
            write!(f, "{} = ", join(&op.results))?;
        }
        write!(f, "{}", op.name())?;

        match &op.kind {
            OpKind::Constant(c) => write!(f, " {} : {}", c, result_list(&result_types)),
            OpKind::Call { callee } => write!(
                f,
                " @{}({}) : ({}) -> {}",
                callee,
                join(&op.operands),
                join(&operand_types),
                result_list(&result_types)
            ),
            _ => {
                if !op.operands.is_empty() {
                    write!(f, " {} : {}", join(&op.operands), join(&operand_types))?;
                    if !op.results.is_empty() {
                        write!(f, " -> {}", result_list(&result_types))?;
                    }
                } else if !op.results.is_empty() {
                    write!(f, " : {}", result_list(&result_types))?;
                }
                Ok(())
            }
        }
    }
}

fn write_signature(f: &mut fmt::Formatter<'_>, func: &Func, named_args: bool) -> fmt::Result {
    let visibility = match func.visibility {
        Visibility::Public => "",
        Visibility::Private => "private ",
    };
    write!(f, "func.func {}@{}(", visibility, func.name)?;
    let args: Vec<String> = if named_args {
        func.args
            .iter()
            .zip(&func.arg_types)
            .map(|(v, ty)| format!("{}: {}", v, ty))
            .collect()
    } else {
        func.arg_types.iter().map(|ty| ty.to_string()).collect()
    };
    write!(f, "{})", args.join(", "))?;
    if !func.result_types.is_empty() {
        write!(f, " -> {}", result_list(&func.result_types))?;
    }
    Ok(())
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "module {{")?;
        for id in self.func_ids() {
            let func = self.func(id);
            write!(f, "  ")?;
            match &func.body {
                None => {
                    write_signature(f, func, false)?;
                    writeln!(f)?;
                }
                Some(body) => {
                    write_signature(f, func, true)?;
                    writeln!(f, " {{")?;
                    for op in body {
                        writeln!(f, "    {}", self.display_op(*op))?;
                    }
                    writeln!(f, "  }}")?;
                }
            }
        }
        write!(f, "}}")
    }
}
