//! Reverse unit propagation checks.
use std::mem::take;

use partial_ref::{partial, PartialRef};

use log::trace;

use rupcheck_formula::Lit;

use crate::context::{parts::*, Context};
use crate::load::add_clause;
use crate::prop::{backtrack, enqueue_assignment, propagate, Reason};

/// Check that a clause is implied by the current clause set via unit
/// propagation, adding it permanently on success.
///
/// The negation of each literal of the clause is assumed at decision level 1,
/// in the order the literals were given, propagating after each assumption.
/// Deriving a conflict confirms the clause: the hypotheses are undone and the
/// clause is added at the top level. If all literals can be assumed without a
/// conflict the check fails and the clause set is left unchanged.
///
/// A literal of the clause that is already true makes the check fail: the
/// negated clause is not assumable, so no refutation of it can be derived.
/// This rejects proof steps that are already entailed at the top level.
///
/// Once the clause set itself is contradictory every clause is implied, so
/// the check short-circuits to success. This is what confirms the final
/// empty clause of a proof whose contradiction surfaced while an earlier
/// clause was added.
pub fn check_clause(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut CheckerStateP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut ImplListsP,
        mut TmpDataP,
        mut TrailP,
        mut WatchlistsP,
    ),
    lits: &[Lit],
) -> bool {
    ctx.part_mut(CheckerStateP).steps_checked += 1;

    if ctx.part(CheckerStateP).top_level_conflict {
        return true;
    }

    debug_assert_eq!(ctx.part(TrailP).current_level(), 0);
    debug_assert!(ctx.part(TrailP).fully_propagated());

    // The hypothesis loop must see the literals in their given order, so the
    // sorted view is a scratch copy used only to detect complementary pairs,
    // which are adjacent after sorting by code.
    let mut scratch = take(&mut ctx.part_mut(TmpDataP).lits_2);
    scratch.clear();
    scratch.extend_from_slice(lits);
    scratch.sort_unstable();

    // Assuming the negation of a tautology satisfies one of its own
    // literals, so the check below could never succeed; skip it entirely.
    let mut tautology = false;
    let mut last = None;

    for &lit in scratch.iter() {
        if last == Some(!lit) {
            tautology = true;
            break;
        }
        last = Some(lit);
    }

    ctx.part_mut(TmpDataP).lits_2 = scratch;

    let mut refuted = false;

    if !tautology {
        ctx.part_mut(TrailP).new_decision_level();

        // Duplicates need no special handling here: the second occurrence is
        // already false once the first is assumed.
        for &lit in lits.iter() {
            match ctx.part(AssignmentP).lit_value(lit) {
                Some(true) => {
                    trace!(
                        "candidate literal {:?} already satisfied (reason {:?})",
                        lit,
                        ctx.part(ImplGraphP).reason(lit.var())
                    );
                    break;
                }
                Some(false) => (),
                None => {
                    enqueue_assignment(ctx.borrow(), !lit, Reason::Hypothesis);
                    if let Err(conflict) = propagate(ctx.borrow()) {
                        trace!(
                            "hypotheses refuted by {:?}",
                            conflict.lits(ctx.part(ClauseAllocP))
                        );
                        ctx.part_mut(CheckerStateP).conflicts += 1;
                        refuted = true;
                        break;
                    }
                }
            }
        }

        backtrack(ctx.borrow(), 0);
    }

    if refuted {
        trace!("step confirmed: {:?}", lits);
        add_clause(ctx.borrow(), lits);
    } else {
        trace!("step not implied by unit propagation: {:?}", lits);
    }

    refuted
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use rupcheck_formula::{lit, lits};

    use crate::context::set_var_count;

    #[test]
    fn implied_clause_is_confirmed_and_added() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 3);

        add_clause(ctx.borrow(), &lits![1, 2]);
        add_clause(ctx.borrow(), &lits![-1, 3]);
        add_clause(ctx.borrow(), &lits![-2, 3]);

        assert!(check_clause(ctx.borrow(), &lits![3]));

        // confirmed and added as a top level assignment
        assert_eq!(ctx.part(TrailP).current_level(), 0);
        assert!(ctx.part(AssignmentP).lit_is_true(lit!(3)));
    }

    #[test]
    fn unimplied_clause_is_rejected_without_a_trace() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 2);

        add_clause(ctx.borrow(), &lits![1, 2]);

        let clauses_before = ctx.part(ClauseAllocP).clause_count();

        assert!(!check_clause(ctx.borrow(), &lits![1]));

        assert_eq!(ctx.part(TrailP).current_level(), 0);
        assert_eq!(ctx.part(TrailP).trail().len(), 0);
        assert!(ctx.part(AssignmentP).lit_is_unk(lit!(1)));
        assert_eq!(ctx.part(ClauseAllocP).clause_count(), clauses_before);
    }

    #[test]
    fn satisfied_literal_rejects_the_step() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 2);

        add_clause(ctx.borrow(), &lits![1]);

        // 1 is already true at the top level, so assuming its negation is
        // impossible and the step is rejected.
        assert!(!check_clause(ctx.borrow(), &lits![1]));
        assert_eq!(ctx.part(TrailP).current_level(), 0);
    }

    #[test]
    fn tautology_is_rejected() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 2);

        add_clause(ctx.borrow(), &lits![1, 2]);

        assert!(!check_clause(ctx.borrow(), &lits![1, -1]));
        assert_eq!(ctx.part(TrailP).trail().len(), 0);
    }

    #[test]
    fn empty_clause_needs_a_top_level_conflict() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 1);

        add_clause(ctx.borrow(), &lits![1]);

        assert!(!check_clause(ctx.borrow(), &[]));

        add_clause(ctx.borrow(), &lits![-1]);

        assert!(ctx.part(CheckerStateP).top_level_conflict);
        assert!(check_clause(ctx.borrow(), &[]));
    }

    #[test]
    fn literals_are_assumed_in_the_given_order() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 3);

        add_clause(ctx.borrow(), &lits![1]);
        add_clause(ctx.borrow(), &lits![2, 3]);
        add_clause(ctx.borrow(), &lits![2, -3]);

        // Assuming -2 already refutes the hypotheses, so the conflict arrives
        // before the satisfied literal 1 is ever examined and the step is
        // confirmed.
        assert!(check_clause(ctx.borrow(), &lits![2, 1]));

        // With the satisfied literal first the step is rejected instead.
        assert!(!check_clause(ctx.borrow(), &lits![1, 2]));
    }

    #[test]
    fn hypothesis_satisfied_by_propagation_rejects_the_step() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 2);

        add_clause(ctx.borrow(), &lits![1, 2]);

        // Assuming -1 propagates 2 through the identical stored clause,
        // satisfying the candidate's second literal before it can be assumed.
        assert!(!check_clause(ctx.borrow(), &lits![1, 2]));
        assert_eq!(ctx.part(TrailP).trail().len(), 0);
    }
}
