//! Propagation of long clauses.
use std::mem::take;

use partial_ref::{partial, PartialRef};

use rupcheck_formula::Lit;

use crate::context::{parts::*, Context};

use super::enqueue_assignment;
use super::{Conflict, Reason, Watch};

/// Propagate all consequences of the long clauses watching the literal that
/// the given assignment falsified.
///
/// On conflict return the clause that is falsified under the current
/// assignment.
///
/// See [`prop::watch`](crate::prop::watch) for the invariants that this has
/// to uphold.
pub fn propagate_long(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut TrailP,
        mut WatchlistsP,
    ),
    lit: Lit,
) -> Result<(), Conflict> {
    let (watchlists, mut ctx) = ctx.split_part_mut(WatchlistsP);
    let (alloc, mut ctx) = ctx.split_part_mut(ClauseAllocP);

    let false_lit = !lit;

    // The watches are scanned with a read and a write index into the taken
    // list. Watches that stay on the falsified literal are compacted towards
    // the front, watches that move are pushed onto another literal's list,
    // which is never the taken one: a replacement watch always rests on a
    // non-false literal.
    let mut watch_list = take(watchlists.watching_mut(false_lit));

    let mut read = 0;
    let mut write = 0;
    let mut conflict = None;

    'watches: while read < watch_list.len() {
        let mut watch = watch_list[read];
        read += 1;

        // A true blocking literal means the clause is satisfied and the
        // watch stays where it is, without touching clause storage.
        if ctx.part(AssignmentP).lit_is_true(watch.blocking) {
            watch_list[write] = watch;
            write += 1;
            continue;
        }

        let cref = watch.cref;
        let lits = alloc.lits_mut(cref);

        // Rotate the falsified literal into slot 1, so the paired watched
        // literal is in slot 0.
        if lits[0] == false_lit {
            lits.swap(0, 1);
        }
        debug_assert_eq!(lits[1], false_lit);

        let other = lits[0];
        watch.blocking = other;

        if ctx.part(AssignmentP).lit_is_true(other) {
            watch_list[write] = watch;
            write += 1;
            continue;
        }

        if !ctx.part(AssignmentP).lit_is_false(other) {
            // The paired watch is unassigned. Look for a non-false literal to
            // take over this watch.
            for pos in 2..lits.len() {
                let candidate = lits[pos];
                if ctx.part(AssignmentP).lit_is_true(candidate) {
                    // Satisfied clause; keeping the watch on a false literal
                    // is harmless, it only means a redundant rescan later.
                    watch_list[write] = watch;
                    write += 1;
                    continue 'watches;
                }
                if ctx.part(AssignmentP).lit_is_unk(candidate) {
                    lits[1] = candidate;
                    lits[pos] = false_lit;
                    debug_assert_ne!(candidate, false_lit);
                    watchlists.add_watch(candidate, Watch { cref, blocking: other });
                    continue 'watches;
                }
            }

            // Every unwatched literal is false: the clause forces the paired
            // watch.
            watch_list[write] = watch;
            write += 1;
            enqueue_assignment(ctx.borrow(), other, Reason::Clause(cref));
            continue;
        }

        // Both watched literals are false. This happens when they were
        // falsified by the same propagation pass and the other one was
        // processed first. Scan for a non-false literal.
        let mut pos = 2;
        let replacement = loop {
            if pos == lits.len() {
                break None;
            }
            let candidate = lits[pos];
            if ctx.part(AssignmentP).lit_is_true(candidate) {
                // Satisfied; both watches can stay.
                watch_list[write] = watch;
                write += 1;
                continue 'watches;
            }
            if ctx.part(AssignmentP).lit_is_unk(candidate) {
                break Some(pos);
            }
            pos += 1;
        };

        let first_pos = match replacement {
            None => {
                // No non-false literal at all: the clause is falsified.
                watch_list[write] = watch;
                write += 1;
                conflict = Some(Conflict { cref });
                break;
            }
            Some(pos) => pos,
        };

        // Move this watch to the unassigned literal.
        let first = lits[first_pos];
        lits[1] = first;
        lits[first_pos] = false_lit;
        debug_assert_ne!(first, false_lit);
        watchlists.add_watch(first, Watch { cref, blocking: other });

        // Look for a second non-false literal to also move the paired watch
        // off its false literal.
        let mut pos = first_pos + 1;
        let second = loop {
            if pos == lits.len() {
                break None;
            }
            let candidate = lits[pos];
            if ctx.part(AssignmentP).lit_is_true(candidate) {
                // Satisfied through an unwatched literal; the paired watch
                // can stay.
                continue 'watches;
            }
            if ctx.part(AssignmentP).lit_is_unk(candidate) {
                break Some(pos);
            }
            pos += 1;
        };

        match second {
            None => {
                // The freshly watched literal is the only non-false one left:
                // the clause is unit on it.
                enqueue_assignment(ctx.borrow(), first, Reason::Clause(cref));
            }
            Some(second_pos) => {
                // Two unassigned literals found; rewatch the paired slot as
                // well so no watch rests on a false literal.
                let second = lits[second_pos];
                lits[0] = second;
                lits[second_pos] = other;
                watchlists.remove_watch(other, cref);
                debug_assert_ne!(second, false_lit);
                watchlists.add_watch(second, Watch { cref, blocking: first });
            }
        }
    }

    if conflict.is_some() {
        // Keep the unprocessed tail of the watchlist.
        while read < watch_list.len() {
            watch_list[write] = watch_list[read];
            write += 1;
            read += 1;
        }
    }

    watch_list.truncate(write);
    *watchlists.watching_mut(false_lit) = watch_list;

    match conflict {
        Some(conflict) => Err(conflict),
        None => Ok(()),
    }
}
