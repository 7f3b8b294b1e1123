//! Presentation boundary
//!
//! Everything the coordinator needs from the surface that displays the
//! collection. Both `reload` and `apply_changeset` are treated as opaque,
//! synchronous, atomic operations.

use std::time::Duration;

use crate::diff::{Changeset, ItemPath};
use crate::errors::ExError;
use crate::model::Snapshot;

pub trait Presentation<I, H, V> {
    /// Whether incremental edits can be applied right now (e.g. the surface
    /// is attached). When `false` the coordinator refreshes instead.
    fn can_apply_incrementally(&self) -> bool {
        true
    }

    /// Discard displayed state and show `snapshot` from scratch.
    fn reload(&mut self, snapshot: &Snapshot<I, H, V>);

    /// Apply one changeset as a single atomic transaction.
    fn apply_changeset(&mut self, changeset: &Changeset<I, H, V>);

    /// Start the fade-out of the one item a changeset is about to delete.
    /// The surface reports completion through
    /// [`UpdateCoordinator::complete_fade`](crate::coordinator::UpdateCoordinator::complete_fade).
    /// `item` is in the coordinates of the currently displayed snapshot.
    fn begin_fade_out(&mut self, _item: ItemPath, _duration: Duration) {}

    /// External error channel. Errors reported here are never fatal.
    fn report_error(&mut self, _error: &ExError) {}
}
