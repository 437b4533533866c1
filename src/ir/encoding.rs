//! Sparsity encoding attached to tensor types.
//!
//! The encoding is built upstream, together with the tensor type, and is
//! only read by the conversion. `verify` is the construction-time check;
//! the conversion asserts the same invariants instead of re-validating.

use std::fmt;

use crate::diagnostic::Diagnostic;
use crate::span::Span;

/// Per-dimension storage discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimLevelType {
    /// Every coordinate of the dimension is stored.
    Dense,
    /// Only nonzero runs are stored, with pointer and index arrays.
    Compressed,
    /// Exactly one coordinate per parent position.
    Singleton,
}

impl fmt::Display for DimLevelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimLevelType::Dense => write!(f, "dense"),
            DimLevelType::Compressed => write!(f, "compressed"),
            DimLevelType::Singleton => write!(f, "singleton"),
        }
    }
}

/// A dimension ordering `(d0, .., dn-1) -> (d[p0], .., d[pn-1])`.
///
/// `positions[i]` is the original dimension that appears at storage
/// level `i`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DimOrdering {
    positions: Vec<usize>,
}

impl DimOrdering {
    pub fn new(positions: Vec<usize>) -> Self {
        Self { positions }
    }

    pub fn identity(rank: usize) -> Self {
        Self {
            positions: (0..rank).collect(),
        }
    }

    pub fn num_results(&self) -> usize {
        self.positions.len()
    }

    /// Original dimension of the `i`th result.
    pub fn dim_position(&self, i: usize) -> usize {
        self.positions[i]
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// True when every dimension in `[0, n)` appears exactly once.
    pub fn is_permutation(&self) -> bool {
        let n = self.positions.len();
        let mut seen = vec![false; n];
        for &p in &self.positions {
            if p >= n || seen[p] {
                return false;
            }
            seen[p] = true;
        }
        true
    }
}

impl fmt::Display for DimOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = (0..self.positions.len()).map(|i| format!("d{}", i)).collect();
        let results: Vec<String> = self.positions.iter().map(|p| format!("d{}", p)).collect();
        write!(f, "({}) -> ({})", dims.join(", "), results.join(", "))
    }
}

/// Sparsity structure and overhead widths of a tensor.
///
/// A bit width of 0 selects the native index width.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SparseTensorEncoding {
    pub dim_level_type: Vec<DimLevelType>,
    pub dim_ordering: Option<DimOrdering>,
    pub pointer_bit_width: u32,
    pub index_bit_width: u32,
}

impl SparseTensorEncoding {
    pub fn new(dim_level_type: Vec<DimLevelType>) -> Self {
        Self {
            dim_level_type,
            dim_ordering: None,
            pointer_bit_width: 0,
            index_bit_width: 0,
        }
    }

    pub fn with_ordering(mut self, ordering: DimOrdering) -> Self {
        self.dim_ordering = Some(ordering);
        self
    }

    pub fn with_bit_widths(mut self, pointer: u32, index: u32) -> Self {
        self.pointer_bit_width = pointer;
        self.index_bit_width = index;
        self
    }

    pub fn rank(&self) -> usize {
        self.dim_level_type.len()
    }

    /// Check the encoding against the rank of the tensor it annotates.
    pub fn verify(&self, rank: usize) -> Result<(), Diagnostic> {
        if self.dim_level_type.len() != rank {
            return Err(Diagnostic::error(
                format!(
                    "expected {} dimension level types, found {}",
                    rank,
                    self.dim_level_type.len()
                ),
                Span::dummy(),
            ));
        }
        if let Some(ordering) = &self.dim_ordering {
            if ordering.num_results() != rank || !ordering.is_permutation() {
                return Err(Diagnostic::error(
                    format!("dimension ordering {} is not a permutation of rank {}", ordering, rank),
                    Span::dummy(),
                ));
            }
        }
        for (what, width) in [
            ("pointer", self.pointer_bit_width),
            ("index", self.index_bit_width),
        ] {
            if !matches!(width, 0 | 8 | 16 | 32 | 64) {
                return Err(Diagnostic::error(
                    format!("unexpected {} bit width: {}", what, width),
                    Span::dummy(),
                )
                .with_help("expected one of 0, 8, 16, 32, 64".to_string()));
            }
        }
        Ok(())
    }
}

impl fmt::Display for SparseTensorEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let levels: Vec<String> = self.dim_level_type.iter().map(|l| l.to_string()).collect();
        write!(f, "#sparse<[{}]", levels.join(", "))?;
        if let Some(ordering) = &self.dim_ordering {
            write!(f, ", ordering = {}", ordering)?;
        }
        write!(
            f,
            ", ptr = {}, idx = {}>",
            self.pointer_bit_width, self.index_bit_width
        )
    }
}
