//! Adding clauses to the clause database.
use partial_ref::{partial, PartialRef};

use log::debug;

use rupcheck_formula::Lit;

use crate::context::{parts::*, Context};
use crate::prop::{enqueue_assignment, propagate, register_clause, Reason};

/// Permanently add a clause at the top level.
///
/// Removes duplicated literals, ignores tautological clauses (eg. x v -x v y)
/// and clauses that are already satisfied, handles empty and unit clauses and
/// registers the rest with the propagation index. Any forced assignment is
/// propagated; a conflict marks the clause set as contradictory.
///
/// Does not adjust the checker's variable count. If necessary that has to be
/// done before calling this.
pub fn add_clause(
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
) {
    if ctx.part(CheckerStateP).top_level_conflict {
        return;
    }

    debug_assert_eq!(ctx.part(TrailP).current_level(), 0);

    let (tmp, mut ctx) = ctx.split_part_mut(TmpDataP);

    tmp.lits.clear();
    tmp.lits.extend_from_slice(lits);
    let lits = &mut tmp.lits;

    lits.sort_unstable();
    lits.dedup();

    // Complementary literals are adjacent after sorting by code
    let mut last = None;

    for &lit in lits.iter() {
        if last == Some(!lit) {
            return;
        }
        last = Some(lit);
    }

    if lits
        .iter()
        .any(|&lit| ctx.part(AssignmentP).lit_is_true(lit))
    {
        return;
    }

    let unassigned = lits
        .iter()
        .filter(|&&lit| ctx.part(AssignmentP).lit_is_unk(lit))
        .count();

    let result = match (unassigned, lits.len()) {
        (0, _) => {
            debug!("contradiction among the added clauses: {:?}", lits);
            let state = ctx.part_mut(CheckerStateP);
            state.top_level_conflict = true;
            state.conflicts += 1;
            return;
        }
        (_, 1) => {
            enqueue_assignment(ctx.borrow(), lits[0], Reason::Unit);
            propagate(ctx.borrow())
        }
        _ => {
            let (cref, unit) = register_clause(ctx.borrow(), lits);
            match unit {
                Some(unit_lit) => {
                    enqueue_assignment(ctx.borrow(), unit_lit, Reason::Clause(cref));
                    propagate(ctx.borrow())
                }
                None => Ok(()),
            }
        }
    };

    ctx.part_mut(CheckerStateP).clauses_added += 1;

    if result.is_err() {
        debug!("conflict propagating an added clause");
        let state = ctx.part_mut(CheckerStateP);
        state.top_level_conflict = true;
        state.conflicts += 1;
    }
}
