//! Clause storage.
use std::ops::Range;

use rupcheck_formula::Lit;

/// Arena holding the literals of every stored clause.
///
/// All clause literals live in one growing buffer and are never freed or
/// moved, so a [`ClauseRef`] stays valid for the lifetime of the checker.
/// This is what allows the propagation index and the per-variable reason
/// records to refer to clauses by value. The watched-literal index swaps the
/// first two slots of a clause in place; lengths never change, so the length
/// can live in the reference itself instead of next to the literals.
#[derive(Default)]
pub struct ClauseAlloc {
    lit_buffer: Vec<Lit>,
    clauses: usize,
}

impl ClauseAlloc {
    /// Create an empty clause allocator.
    pub fn new() -> ClauseAlloc {
        ClauseAlloc::default()
    }

    /// Store a new clause.
    ///
    /// Clauses have a minimal size of 2. Unit clauses are consumed as
    /// assignments and the empty clause as a contradiction, so neither is
    /// ever stored.
    pub fn add_clause(&mut self, lits: &[Lit]) -> ClauseRef {
        assert!(lits.len() >= 2, "only binary and larger clauses are stored");

        let offset = self.lit_buffer.len();
        assert!(
            offset + lits.len() <= ClauseOffset::max_value() as usize,
            "clause storage exceeds the addressable size"
        );

        self.lit_buffer.extend_from_slice(lits);
        self.clauses += 1;

        ClauseRef {
            offset: offset as ClauseOffset,
            len: lits.len() as ClauseOffset,
        }
    }

    /// The literals of a clause.
    ///
    /// A reference produced by a different allocator is out of bounds or
    /// aliases an unrelated clause; the slicing below catches the former.
    pub fn lits(&self, cref: ClauseRef) -> &[Lit] {
        &self.lit_buffer[cref.bounds()]
    }

    /// Mutable access to the literals of a clause.
    pub fn lits_mut(&mut self, cref: ClauseRef) -> &mut [Lit] {
        &mut self.lit_buffer[cref.bounds()]
    }

    /// Number of stored clauses.
    pub fn clause_count(&self) -> usize {
        self.clauses
    }

    /// Total number of stored literals.
    pub fn lit_count(&self) -> usize {
        self.lit_buffer.len()
    }
}

/// Integer type used for clause offsets and lengths.
type ClauseOffset = u32;

/// Compact reference to a stored clause.
///
/// Carries the position and length of the clause's literals within the
/// [`ClauseAlloc`] buffer.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ClauseRef {
    offset: ClauseOffset,
    len: ClauseOffset,
}

impl ClauseRef {
    fn bounds(self) -> Range<usize> {
        let offset = self.offset as usize;
        offset..offset + self.len as usize
    }
}
