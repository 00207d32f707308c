//! Miscellaneous checker state.

/// Miscellaneous checker state.
///
/// Anything larger or any larger group of related state variables should be
/// moved into a separate part of [`Context`](crate::context::Context).
#[derive(Default)]
pub struct CheckerState {
    /// Set once the clause set is contradictory at the top level.
    ///
    /// From that point on every clause is implied, so checks short-circuit to
    /// success and nothing further needs to be added.
    pub top_level_conflict: bool,

    /// Number of clauses permanently added (asserted or confirmed).
    pub clauses_added: u64,
    /// Number of proof clauses checked.
    pub steps_checked: u64,
    /// Number of conflicts derived during propagation.
    pub conflicts: u64,
}
