//! Transition policy trait and implementations
//!
//! This module defines the `TransitionPolicy` trait, which decides whether a
//! computed update is presented incrementally or replaced by a full refresh.
//! The policy is injected into the coordinator; it is the only customization
//! point for that coarse decision.

use serde::{Deserialize, Serialize};

use crate::diff::Changeset;
use crate::model::Snapshot;

/// Coarse strategy for presenting an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewTransition {
    /// Apply each changeset as an incremental, animated transaction
    Animated,
    /// Discard the changesets and refresh from the new snapshot
    Reload,
}

/// Policy trait choosing a [`ViewTransition`] for an update
///
/// # Arguments
/// * `prior` - The snapshot currently adopted by the coordinator
/// * `changesets` - The changesets about to be applied (normally one)
pub trait TransitionPolicy<I, H, V> {
    fn decide(&self, prior: &Snapshot<I, H, V>, changesets: &[Changeset<I, H, V>])
        -> ViewTransition;
}

/// Any closure with the policy signature is a policy.
impl<I, H, V, F> TransitionPolicy<I, H, V> for F
where
    F: Fn(&Snapshot<I, H, V>, &[Changeset<I, H, V>]) -> ViewTransition,
{
    fn decide(
        &self,
        prior: &Snapshot<I, H, V>,
        changesets: &[Changeset<I, H, V>],
    ) -> ViewTransition {
        self(prior, changesets)
    }
}

/// Always presents updates incrementally (the default)
///
/// # Example
/// ```
/// use sectiondiff_core::model::Snapshot;
/// use sectiondiff_core::policy::{AlwaysAnimated, TransitionPolicy, ViewTransition};
///
/// let prior: Snapshot<String, (), i32> = Snapshot::empty();
/// assert_eq!(AlwaysAnimated.decide(&prior, &[]), ViewTransition::Animated);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAnimated;

impl<I, H, V> TransitionPolicy<I, H, V> for AlwaysAnimated {
    fn decide(&self, _: &Snapshot<I, H, V>, _: &[Changeset<I, H, V>]) -> ViewTransition {
        ViewTransition::Animated
    }
}

/// Always refreshes (for surfaces that cannot animate)
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReload;

impl<I, H, V> TransitionPolicy<I, H, V> for AlwaysReload {
    fn decide(&self, _: &Snapshot<I, H, V>, _: &[Changeset<I, H, V>]) -> ViewTransition {
        ViewTransition::Reload
    }
}

/// Reloads when the update carries more than `max_operations` edits in total
///
/// # Example
/// ```
/// use sectiondiff_core::policy::OperationThreshold;
///
/// let policy = OperationThreshold::new(50);
/// assert_eq!(policy.max_operations(), 50);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct OperationThreshold {
    max_operations: usize,
}

impl OperationThreshold {
    pub fn new(max_operations: usize) -> Self {
        Self { max_operations }
    }

    pub fn max_operations(&self) -> usize {
        self.max_operations
    }
}

impl<I, H, V> TransitionPolicy<I, H, V> for OperationThreshold {
    fn decide(&self, _: &Snapshot<I, H, V>, changesets: &[Changeset<I, H, V>]) -> ViewTransition {
        let total: usize = changesets.iter().map(Changeset::operation_count).sum();
        if total > self.max_operations {
            ViewTransition::Reload
        } else {
            ViewTransition::Animated
        }
    }
}
