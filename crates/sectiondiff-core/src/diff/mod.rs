//! Reconciler: snapshot-to-snapshot changeset computation.
//!
//! Compares two snapshots of a sectioned collection and produces the
//! structural edit script that turns one into the other.
//!
//! ## Entry point
//!
//! ```
//! use sectiondiff_core::diff::{diff, render_human_summary};
//! use sectiondiff_core::model::{Item, Section, Snapshot};
//!
//! let initial: Snapshot<String, String, i64> = Snapshot::new(vec![Section::new(
//!     "S1".to_string(),
//!     "Inbox".to_string(),
//!     vec![Item::new("a".to_string(), 1)],
//! )]);
//! let changeset = diff(&initial, &initial).unwrap();
//! let summary = render_human_summary(&initial, &changeset);
//! assert!(summary.contains("No changes"));
//! ```
//!
//! ## Guarantees
//!
//! - **Identity over value**: entities are matched by identity; a changed
//!   value on a persisted entity is an update (or part of a move), never a
//!   delete plus insert.
//! - **Subsumption**: items of deleted or inserted sections are not reported
//!   individually.
//! - **Determinism**: identical inputs produce identical, sorted index sets.
//! - **Single failure mode**: duplicate identities are the only rejected input.

pub mod engine;
pub mod human_summary;
pub mod model;

pub use engine::{diff, diff_staged};
pub use human_summary::render_human_summary;
pub use model::{Changeset, ItemPath};
