//! Propagation of binary clauses.
use partial_ref::{partial, PartialRef};

use rupcheck_formula::Lit;

use crate::context::{parts::*, Context};

use super::enqueue_assignment;
use super::{Conflict, Reason};

/// Propagate all direct consequences of falsifying the negation of the given
/// literal.
///
/// Every binary clause containing the falsified literal forces its other
/// literal. On conflict return the binary clause whose other literal is
/// already false.
pub fn propagate_binary(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ImplGraphP,
        mut TrailP,
        ImplListsP,
    ),
    lit: Lit,
) -> Result<(), Conflict> {
    let (impl_lists, mut ctx) = ctx.split_part(ImplListsP);

    for &(cref, implied) in impl_lists.implications(!lit) {
        let assignment = ctx.part(AssignmentP);

        if assignment.lit_is_false(implied) {
            return Err(Conflict { cref });
        } else if !assignment.lit_is_true(implied) {
            // The first clause to force a literal wins and becomes its
            // reason; enqueued literals are already assigned, so later
            // clauses take the true branch above.
            enqueue_assignment(ctx.borrow(), implied, Reason::Clause(cref));
        }
    }

    Ok(())
}
