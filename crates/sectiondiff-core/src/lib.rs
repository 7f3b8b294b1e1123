//! sectiondiff core - sectioned collection reconciler
//!
//! This crate provides the building blocks for keeping a sectioned display
//! in sync with successive snapshots of its data, including:
//! - Identity-keyed section/item models and snapshots
//! - The reconciler computing a changeset between two snapshots
//! - Changeset replay for verification
//! - Transition policies choosing incremental updates vs. full refresh
//! - The update coordinator that drives a presentation surface
//! - Structured logging and error facilities

pub mod apply;
pub mod config;
pub mod coordinator;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod policy;

pub use sectiondiff_core_types::schema;

// Re-export commonly used types
pub use apply::apply;
pub use config::{CoordinatorConfig, Staging};
pub use coordinator::{Presentation, ReceiveOutcome, ReloadReason, UpdateCoordinator};
pub use diff::{diff, diff_staged, Changeset, ItemPath};
pub use errors::{ExError, ExErrorKind, Result, SectionDiffError, StructuralInconsistency};
pub use model::{Item, Section, Snapshot};
pub use policy::{AlwaysAnimated, AlwaysReload, OperationThreshold, TransitionPolicy, ViewTransition};
