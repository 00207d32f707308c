//! Central checker data structure.
//!
//! This module defines the `Context` data structure which holds all data used
//! by the checker. It also contains global notification functions that likely
//! need to be extended when new parts are added.
use partial_ref::{part, partial, PartialRef, PartialRefTarget};

use crate::binary::ImplLists;
use crate::clause::ClauseAlloc;
use crate::prop::{Assignment, ImplGraph, Trail, Watchlists};
use crate::state::CheckerState;
use crate::tmp::TmpData;

/// Part declarations for the [`Context`] struct.
pub mod parts {
    use super::*;

    part!(pub AssignmentP: Assignment);
    part!(pub CheckerStateP: CheckerState);
    part!(pub ClauseAllocP: ClauseAlloc);
    part!(pub ImplGraphP: ImplGraph);
    part!(pub ImplListsP: ImplLists);
    part!(pub TmpDataP: TmpData);
    part!(pub TrailP: Trail);
    part!(pub WatchlistsP: Watchlists);
}

use parts::*;

/// Central checker data structure.
///
/// This struct contains all data kept by the checker. Most functions
/// operating on multiple fields of the context use partial references
/// provided by the `partial_ref` crate. This documents the data dependencies
/// and makes the borrow checker happy without the overhead of passing
/// individual references.
#[derive(PartialRefTarget, Default)]
pub struct Context {
    #[part(AssignmentP)]
    pub assignment: Assignment,
    #[part(CheckerStateP)]
    pub checker_state: CheckerState,
    #[part(ClauseAllocP)]
    pub clause_alloc: ClauseAlloc,
    #[part(ImplGraphP)]
    pub impl_graph: ImplGraph,
    #[part(ImplListsP)]
    pub impl_lists: ImplLists,
    #[part(TmpDataP)]
    pub tmp_data: TmpData,
    #[part(TrailP)]
    pub trail: Trail,
    #[part(WatchlistsP)]
    pub watchlists: Watchlists,
}

/// Update structures for a new variable count.
pub fn set_var_count(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ImplGraphP,
        mut ImplListsP,
        mut WatchlistsP,
    ),
    count: usize,
) {
    ctx.part_mut(AssignmentP).set_var_count(count);
    ctx.part_mut(ImplGraphP).set_var_count(count);
    ctx.part_mut(ImplListsP).set_var_count(count);
    ctx.part_mut(WatchlistsP).set_var_count(count);
}

/// Increase the variable count to at least the given value.
pub fn ensure_var_count(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ImplGraphP,
        mut ImplListsP,
        mut WatchlistsP,
    ),
    count: usize,
) {
    if count > ctx.part(AssignmentP).var_count() {
        set_var_count(ctx.borrow(), count)
    }
}
