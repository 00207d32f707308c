//! Binary implication table.
use rupcheck_formula::Lit;

use crate::clause::ClauseRef;

/// Direct implications of binary clauses, indexed by the member literal.
///
/// Each literal has one entry per binary clause containing it: the clause
/// and the clause's other literal. When a literal is falsified, every paired
/// literal of its entries is directly forced with the stored clause as
/// reason.
#[derive(Default)]
pub struct ImplLists {
    by_lit: Vec<Vec<(ClauseRef, Lit)>>,
    count: usize,
}

impl ImplLists {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.by_lit.resize(count * 2, vec![]);
    }

    /// Add a binary clause.
    pub fn add_binary_clause(&mut self, cref: ClauseRef, lits: [Lit; 2]) {
        self.by_lit[lits[0].code()].push((cref, lits[1]));
        self.by_lit[lits[1].code()].push((cref, lits[0]));
        self.count += 1;
    }

    /// Entries of the binary clauses containing the given literal.
    pub fn implications(&self, lit: Lit) -> &[(ClauseRef, Lit)] {
        &self.by_lit[lit.code()]
    }

    /// Number of binary clauses.
    pub fn count(&self) -> usize {
        self.count
    }
}
