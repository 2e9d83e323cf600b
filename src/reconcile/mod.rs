//! Reconciliation of a live tree against its recorded counterpart.

mod change;
mod comparator;
mod moves;
mod stale;

pub use change::{Change, ChangeKind, Diff, Entity, Stale};
pub use comparator::{compare, compare_raw};
pub use moves::detect_moves;
pub use stale::find_stale;
