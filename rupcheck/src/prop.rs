//! Unit propagation.
//!
//! Two indexes drive propagation: a binary implication table for two-literal
//! clauses and watchlists for longer clauses. Registration places preferred
//! watched literals in the first two slots of each clause; the propagation
//! loop processes newly assigned literals from the trail in FIFO order.
pub mod assignment;
pub mod graph;
pub mod watch;

mod binary;
mod long;

pub use assignment::{backtrack, enqueue_assignment, Assignment, Trail};
pub use graph::{Conflict, ImplGraph, ImplNode, Reason};
pub use watch::{Watch, Watchlists};

use partial_ref::{partial, PartialRef};

use rupcheck_formula::Lit;

use crate::clause::ClauseRef;
use crate::context::{parts::*, Context};

/// Register a clause with the propagation index.
///
/// The clause must have at least two literals, no duplicates, no complementary
/// pair, at least one unassigned literal and no satisfied literal. The slice
/// is rearranged so the first two slots hold the preferred watched literals:
/// two unassigned ones when possible, otherwise the single unassigned literal
/// followed by the falsified literal with the highest decision level. The
/// latter ensures the watch invariant holds again as soon as backtracking
/// unassigns that literal.
///
/// Returns the reference of the stored clause, and the forced literal if the
/// clause is unit under the current assignment. Enqueuing that assignment is
/// up to the caller.
pub fn register_clause(
    mut ctx: partial!(
        Context,
        mut ClauseAllocP,
        mut ImplListsP,
        mut WatchlistsP,
        AssignmentP,
        ImplGraphP,
    ),
    lits: &mut [Lit],
) -> (ClauseRef, Option<Lit>) {
    debug_assert!(lits.len() >= 2);

    let mut unassigned = 0;
    for pos in 0..lits.len() {
        if ctx.part(AssignmentP).lit_is_unk(lits[pos]) {
            lits.swap(unassigned, pos);
            unassigned += 1;
            if unassigned == 2 {
                break;
            }
        }
    }

    assert!(unassigned > 0, "registered clause has no unassigned literal");

    let unit = if unassigned == 1 {
        let graph = ctx.part(ImplGraphP);
        let mut max_pos = 1;
        let mut max_level = graph.level(lits[1].var());
        for pos in 2..lits.len() {
            let level = graph.level(lits[pos].var());
            if level > max_level {
                max_level = level;
                max_pos = pos;
            }
        }
        lits.swap(1, max_pos);
        Some(lits[0])
    } else {
        None
    };

    let cref = ctx.part_mut(ClauseAllocP).add_clause(lits);

    if lits.len() == 2 {
        ctx.part_mut(ImplListsP)
            .add_binary_clause(cref, [lits[0], lits[1]]);
    } else {
        ctx.part_mut(WatchlistsP)
            .watch_clause(cref, [lits[0], lits[1]]);
    }

    (cref, unit)
}

/// Propagate all enqueued assignments to a fixpoint.
///
/// Processes the trail in assignment order; every forced literal found along
/// the way is enqueued and processed in turn. Stops at the first conflict,
/// leaving the remaining queue unprocessed.
pub fn propagate(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut TrailP,
        mut WatchlistsP,
        ImplListsP,
    ),
) -> Result<(), Conflict> {
    while let Some(lit) = ctx.part_mut(TrailP).pop_queue() {
        binary::propagate_binary(ctx.borrow(), lit)?;
        long::propagate_long(ctx.borrow(), lit)?;
    }

    Ok(())
}
