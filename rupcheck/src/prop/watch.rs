//! Watchlists to detect clauses that became unit.
//!
//! Every stored clause of length 3 or more is watched through two of its
//! literals, kept in slots 0 and 1 of the clause. While neither watched
//! literal is false the clause can be neither unit nor falsified, so only
//! the falsification of a watched literal forces a look at the clause. The
//! scan then moves watches onto other non-false literals where possible; the
//! clauses where no replacement exists are exactly the new unit or falsified
//! clauses. Unassigning variables never breaks this, so backtracking leaves
//! the lists untouched.
//!
//! A watch carries a blocking literal of the same clause, normally the
//! paired watched literal. When it is already true the clause is satisfied
//! and the scan skips it without reading clause storage.
//!
//! See [Section 4.5.1 of the "Handbook of Satisfiability"][handbook-ch4] for
//! more details and references.
//!
//! [handbook-ch4]: https://www.satassociation.org/articles/FAIA185-0131.pdf

use rupcheck_formula::Lit;

use crate::clause::ClauseRef;

/// A single watch on a long clause.
#[derive(Copy, Clone)]
pub struct Watch {
    /// Clause holding the watched literal in slot 0 or 1.
    pub cref: ClauseRef,
    /// Another literal of the same clause, checked before the clause itself.
    pub blocking: Lit,
}

/// Per-literal watchlists, indexed by the watched literal itself.
#[derive(Default)]
pub struct Watchlists {
    by_lit: Vec<Vec<Watch>>,
}

impl Watchlists {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.by_lit.resize(count * 2, vec![]);
    }

    /// Start watching a clause through its first two literals.
    pub fn watch_clause(&mut self, cref: ClauseRef, lits: [Lit; 2]) {
        self.by_lit[lits[0].code()].push(Watch {
            cref,
            blocking: lits[1],
        });
        self.by_lit[lits[1].code()].push(Watch {
            cref,
            blocking: lits[0],
        });
    }

    /// The watches held on the given literal.
    pub fn watching_mut(&mut self, lit: Lit) -> &mut Vec<Watch> {
        &mut self.by_lit[lit.code()]
    }

    /// Register one additional watch on a literal.
    pub fn add_watch(&mut self, lit: Lit, watch: Watch) {
        self.by_lit[lit.code()].push(watch)
    }

    /// Drop the watch a clause holds on the given literal.
    pub fn remove_watch(&mut self, lit: Lit, cref: ClauseRef) {
        let list = &mut self.by_lit[lit.code()];
        let pos = list
            .iter()
            .position(|watch| watch.cref == cref)
            .expect("watchlist out of sync with clause");
        let _ = list.swap_remove(pos);
    }
}
