//! Temporary data.
use rupcheck_formula::Lit;

/// Temporary data used by various parts of the checker.
///
/// Reusing these buffers avoids allocating on every processed clause. Make
/// sure to check all existing users when adding invariants.
#[derive(Default)]
pub struct TmpData {
    pub lits: Vec<Lit>,
    pub lits_2: Vec<Lit>,
}
