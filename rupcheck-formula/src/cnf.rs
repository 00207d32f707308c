//! CNF formulas.
use std::cmp::max;
use std::fmt;

use crate::lit::Lit;

/// A formula in conjunctive normal form (CNF).
///
/// All literals live in one buffer; clause boundaries are kept as the end
/// offset of every clause, so clause `i` spans from the end of clause `i - 1`
/// (or 0) to `clause_ends[i]`. This holds an arbitrary number of clauses with
/// two allocations and no per-clause bookkeeping beyond one offset.
#[derive(Default, Eq)]
pub struct CnfFormula {
    var_count: usize,
    lit_data: Vec<Lit>,
    clause_ends: Vec<usize>,
}

impl CnfFormula {
    /// Create an empty CNF formula.
    pub fn new() -> CnfFormula {
        CnfFormula::default()
    }

    /// How many variables the formula spans.
    ///
    /// Gaps count too: this is one more than the largest variable index
    /// present, or any larger value set explicitly, so a vector of this
    /// length can be indexed with every variable of the formula.
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// Raise the variable count of the formula.
    ///
    /// Does nothing if the formula already spans at least `count` variables.
    pub fn set_var_count(&mut self, count: usize) {
        self.var_count = max(self.var_count, count)
    }

    /// How many clauses the formula holds.
    pub fn len(&self) -> usize {
        self.clause_ends.len()
    }

    /// Whether the formula contains no clauses.
    pub fn is_empty(&self) -> bool {
        self.clause_ends.is_empty()
    }

    /// The literals of the clause with the given index.
    pub fn clause(&self, index: usize) -> &[Lit] {
        let end = self.clause_ends[index];
        let start = if index == 0 {
            0
        } else {
            self.clause_ends[index - 1]
        };
        &self.lit_data[start..end]
    }

    /// Append a clause to the formula.
    ///
    /// `literals` can be an `IntoIterator<Item = Lit>` or
    /// `IntoIterator<Item = &Lit>`.
    pub fn add_clause<L>(&mut self, literals: impl IntoIterator<Item = L>)
    where
        Vec<Lit>: Extend<L>,
    {
        let start = self.lit_data.len();
        self.lit_data.extend(literals);

        for &lit in self.lit_data[start..].iter() {
            self.var_count = max(lit.index() + 1, self.var_count);
        }

        self.clause_ends.push(self.lit_data.len());
    }

    /// Iterate over the clauses in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &[Lit]> {
        (0..self.len()).map(move |index| self.clause(index))
    }
}

/// Convert any iterable of [`Lit`] iterables into a CnfFormula
impl<F, I, L> From<F> for CnfFormula
where
    F: IntoIterator<Item = I>,
    I: IntoIterator<Item = L>,
    Vec<Lit>: Extend<L>,
{
    fn from(formula: F) -> CnfFormula {
        let mut cnf_formula = CnfFormula::new();
        for clause in formula {
            cnf_formula.add_clause(clause);
        }
        cnf_formula
    }
}

impl fmt::Debug for CnfFormula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{} vars] ", self.var_count)?;
        f.debug_list().entries(self.iter()).finish()
    }
}

impl PartialEq for CnfFormula {
    fn eq(&self, other: &CnfFormula) -> bool {
        self.var_count == other.var_count && self.len() == other.len() && self.iter().eq(other.iter())
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;

    use proptest::{collection::SizeRange, prelude::*, *};

    use crate::lit::strategy::lit;

    pub fn vec_formula(
        vars: impl Strategy<Value = usize>,
        clause_counts: impl Into<SizeRange>,
        clause_lens: impl Into<SizeRange>,
    ) -> impl Strategy<Value = Vec<Vec<Lit>>> {
        let clause_counts = clause_counts.into();
        let clause_lens = clause_lens.into();

        // ind_flat_map keeps shrinking affordable
        vars.prop_ind_flat_map(move |var_count| {
            let clause = collection::vec(lit(0..var_count), clause_lens.clone());
            collection::vec(clause, clause_counts.clone())
        })
    }

    pub fn cnf_formula(
        vars: impl Strategy<Value = usize>,
        clause_counts: impl Into<SizeRange>,
        clause_lens: impl Into<SizeRange>,
    ) -> impl Strategy<Value = CnfFormula> {
        // Shrinking whole formulas is too expensive
        vec_formula(vars, clause_counts, clause_lens)
            .prop_map(CnfFormula::from)
            .no_shrink()
    }
}
