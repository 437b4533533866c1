//! Integer encodings shared with the sparse runtime support library.
//!
//! Every value here is part of the runtime ABI: `newSparseTensor` is
//! "overloaded" on these codes. Keep them in sync with the runtime.

use crate::ir::{DimLevelType, Type};

/// Encoding of the primary (value) element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum PrimaryType {
    F64 = 1,
    F32 = 2,
    I64 = 3,
    I32 = 4,
    I16 = 5,
    I8 = 6,
}

impl PrimaryType {
    pub const ALL: [PrimaryType; 6] = [
        PrimaryType::F64,
        PrimaryType::F32,
        PrimaryType::I64,
        PrimaryType::I32,
        PrimaryType::I16,
        PrimaryType::I8,
    ];

    /// The primary type of an element type, if the runtime supports it.
    pub fn of(ty: &Type) -> Option<Self> {
        match ty {
            Type::F64 => Some(PrimaryType::F64),
            Type::F32 => Some(PrimaryType::F32),
            Type::Int(64) => Some(PrimaryType::I64),
            Type::Int(32) => Some(PrimaryType::I32),
            Type::Int(16) => Some(PrimaryType::I16),
            Type::Int(8) => Some(PrimaryType::I8),
            _ => None,
        }
    }

    /// Name suffix used by typed runtime entry points (`getPtrF64`, ...).
    pub fn suffix(self) -> &'static str {
        match self {
            PrimaryType::F64 => "F64",
            PrimaryType::F32 => "F32",
            PrimaryType::I64 => "I64",
            PrimaryType::I32 => "I32",
            PrimaryType::I16 => "I16",
            PrimaryType::I8 => "I8",
        }
    }
}

/// Encoding of pointer/index overhead storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum OverheadType {
    /// 64-bit, and the default for any other width (including native).
    U64 = 1,
    U32 = 2,
    U16 = 3,
    U8 = 4,
}

impl OverheadType {
    pub const ALL: [OverheadType; 4] = [
        OverheadType::U64,
        OverheadType::U32,
        OverheadType::U16,
        OverheadType::U8,
    ];

    pub fn from_width(width: u32) -> Self {
        match width {
            32 => OverheadType::U32,
            16 => OverheadType::U16,
            8 => OverheadType::U8,
            _ => OverheadType::U64,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OverheadType::U64 => "u64",
            OverheadType::U32 => "u32",
            OverheadType::U16 => "u16",
            OverheadType::U8 => "u8",
        }
    }
}

/// What `newSparseTensor` does with its pointer argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Action {
    /// Construct from dimension metadata; the pointer is the source
    /// operand of `sparse_tensor.new`.
    FromMetadata = 0,
    /// Construct by absorbing the dense data behind the pointer.
    FromData = 1,
}

/// Primary type code, or 0 for an unsupported element type.
pub fn primary_type_encoding(ty: &Type) -> u32 {
    PrimaryType::of(ty).map_or(0, |p| p as u32)
}

pub fn overhead_type_encoding(width: u32) -> u32 {
    OverheadType::from_width(width) as u32
}

pub fn dim_level_type_encoding(dlt: DimLevelType) -> u32 {
    match dlt {
        DimLevelType::Dense => 0,
        DimLevelType::Compressed => 1,
        DimLevelType::Singleton => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Dim;

    #[test]
    fn test_primary_codes() {
        assert_eq!(primary_type_encoding(&Type::F64), 1);
        assert_eq!(primary_type_encoding(&Type::F32), 2);
        assert_eq!(primary_type_encoding(&Type::Int(64)), 3);
        assert_eq!(primary_type_encoding(&Type::Int(32)), 4);
        assert_eq!(primary_type_encoding(&Type::Int(16)), 5);
        assert_eq!(primary_type_encoding(&Type::Int(8)), 6);
    }

    #[test]
    fn test_unsupported_primary_is_zero() {
        for ty in [
            Type::Index,
            Type::Int(1),
            Type::Int(128),
            Type::F16,
            Type::BF16,
            Type::Ptr,
            Type::tensor(vec![Dim::Static(2)], Type::F32),
        ] {
            assert_eq!(primary_type_encoding(&ty), 0, "{}", ty);
        }
    }

    #[test]
    fn test_primary_codes_are_stable() {
        for ty in [Type::F64, Type::F32, Type::Int(64), Type::Int(32), Type::Int(16), Type::Int(8)] {
            let first = primary_type_encoding(&ty);
            assert_ne!(first, 0);
            assert_eq!(first, primary_type_encoding(&ty));
        }
    }

    #[test]
    fn test_overhead_codes() {
        assert_eq!(overhead_type_encoding(64), 1);
        assert_eq!(overhead_type_encoding(32), 2);
        assert_eq!(overhead_type_encoding(16), 3);
        assert_eq!(overhead_type_encoding(8), 4);
        // Native width and anything unexpected fall back to 64-bit.
        assert_eq!(overhead_type_encoding(0), 1);
        assert_eq!(overhead_type_encoding(12), 1);
    }

    #[test]
    fn test_dim_level_codes() {
        assert_eq!(dim_level_type_encoding(DimLevelType::Dense), 0);
        assert_eq!(dim_level_type_encoding(DimLevelType::Compressed), 1);
        assert_eq!(dim_level_type_encoding(DimLevelType::Singleton), 2);
    }

    #[test]
    fn test_action_codes() {
        assert_eq!(Action::FromMetadata as u32, 0);
        assert_eq!(Action::FromData as u32, 1);
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(PrimaryType::F64.suffix(), "F64");
        assert_eq!(PrimaryType::of(&Type::Int(8)).map(PrimaryType::suffix), Some("I8"));
    }

    #[test]
    fn test_tables_are_dense() {
        let primary: Vec<u32> = PrimaryType::ALL.iter().map(|p| *p as u32).collect();
        assert_eq!(primary, vec![1, 2, 3, 4, 5, 6]);
        let overhead: Vec<u32> = OverheadType::ALL.iter().map(|o| *o as u32).collect();
        assert_eq!(overhead, vec![1, 2, 3, 4]);
        assert_eq!(OverheadType::from_width(16).name(), "u16");
    }
}
