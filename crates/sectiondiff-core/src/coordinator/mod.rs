//! Update coordinator
//!
//! Owns the currently adopted snapshot, serializes incoming snapshots, runs
//! the reconciler, consults the transition policy and drives a
//! [`Presentation`] surface.
//!
//! ## State machine
//!
//! - **Unbound** until the first snapshot arrives; that snapshot is adopted
//!   with a full refresh.
//! - **Bound** afterwards. Each new snapshot is either refreshed (surface
//!   cannot take incremental edits, policy chose `Reload`, or the reconciler
//!   rejected the input) or applied changeset by changeset.
//! - While a single-deletion changeset waits for its fade-out, the
//!   coordinator is busy ([`UpdateCoordinator::is_applying`]); snapshots that
//!   arrive meanwhile are queued and processed in order once
//!   [`UpdateCoordinator::complete_fade`] is called.

pub mod presentation;
pub mod update;

pub use presentation::Presentation;
pub use update::{CoordinatorState, ReceiveOutcome, ReloadReason, UpdateCoordinator};
