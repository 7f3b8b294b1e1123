use std::collections::VecDeque;
use std::fmt::Display;
use std::hash::Hash;
use std::time::Instant;

use sectiondiff_core_types::UpdateId;
use serde::Serialize;

use crate::config::{CoordinatorConfig, Staging};
use crate::coordinator::presentation::Presentation;
use crate::diff::{diff, diff_staged, Changeset, ItemPath};
use crate::errors::{ExError, StructuralInconsistency};
use crate::model::Snapshot;
use crate::policy::{AlwaysAnimated, TransitionPolicy, ViewTransition};
use crate::{log_op_end, log_op_error, log_op_start};

/// Observable coordinator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorState {
    /// No snapshot adopted yet
    Unbound,
    /// A snapshot is adopted and nothing is in flight
    Bound,
    /// A fade-out is pending; incoming snapshots are queued
    Applying,
}

/// Why a snapshot was shown with a full refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadReason {
    InitialBind,
    NotIncremental,
    Policy,
    StructuralInconsistency,
}

/// What [`UpdateCoordinator::receive`] did with a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReceiveOutcome {
    /// Adopted and shown with a full refresh
    Reloaded { reason: ReloadReason },
    /// Every changeset was applied incrementally
    Applied { changesets: usize },
    /// `applied` changesets went through, then a fade-out started for `item`
    Fading { item: ItemPath, applied: usize },
    /// The coordinator was busy; the snapshot waits at position `pending`
    Queued { pending: usize },
}

enum Step<I, H, V> {
    Reload(ReloadReason),
    Animate(Vec<Changeset<I, H, V>>),
    Failed(StructuralInconsistency),
}

/// A changeset held back until its fade-out completes, plus the stages after it.
struct InFlight<I, H, V> {
    update_id: UpdateId,
    fading: Changeset<I, H, V>,
    remaining: VecDeque<Changeset<I, H, V>>,
}

/// Serializes snapshots into presentation updates.
///
/// # Example
/// ```
/// use sectiondiff_core::config::CoordinatorConfig;
/// use sectiondiff_core::coordinator::{Presentation, ReceiveOutcome, ReloadReason, UpdateCoordinator};
/// use sectiondiff_core::diff::Changeset;
/// use sectiondiff_core::model::{Item, Section, Snapshot};
///
/// #[derive(Default)]
/// struct Counter { reloads: usize, edits: usize }
///
/// impl Presentation<&'static str, (), i32> for Counter {
///     fn reload(&mut self, _: &Snapshot<&'static str, (), i32>) { self.reloads += 1; }
///     fn apply_changeset(&mut self, _: &Changeset<&'static str, (), i32>) { self.edits += 1; }
/// }
///
/// let mut coordinator = UpdateCoordinator::new(Counter::default(), CoordinatorConfig::default());
/// let first = Snapshot::new(vec![Section::new("S", (), vec![Item::new("a", 1)])]);
/// let second = Snapshot::new(vec![Section::new("S", (), vec![Item::new("a", 2)])]);
///
/// assert_eq!(
///     coordinator.receive(first),
///     ReceiveOutcome::Reloaded { reason: ReloadReason::InitialBind }
/// );
/// assert_eq!(coordinator.receive(second), ReceiveOutcome::Applied { changesets: 1 });
/// assert_eq!(coordinator.presentation().edits, 1);
/// ```
pub struct UpdateCoordinator<I, H, V, P> {
    presentation: P,
    policy: Box<dyn TransitionPolicy<I, H, V>>,
    config: CoordinatorConfig,
    current: Option<Snapshot<I, H, V>>,
    in_flight: Option<InFlight<I, H, V>>,
    queue: VecDeque<(UpdateId, Snapshot<I, H, V>)>,
}

impl<I, H, V, P> UpdateCoordinator<I, H, V, P>
where
    I: Clone + Eq + Hash + Display + 'static,
    H: Clone + PartialEq + 'static,
    V: Clone + PartialEq + 'static,
    P: Presentation<I, H, V>,
{
    /// Create an unbound coordinator with the [`AlwaysAnimated`] policy.
    pub fn new(presentation: P, config: CoordinatorConfig) -> Self {
        Self {
            presentation,
            policy: Box::new(AlwaysAnimated),
            config,
            current: None,
            in_flight: None,
            queue: VecDeque::new(),
        }
    }

    pub fn with_policy(mut self, policy: impl TransitionPolicy<I, H, V> + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn state(&self) -> CoordinatorState {
        if self.in_flight.is_some() {
            CoordinatorState::Applying
        } else if self.current.is_some() {
            CoordinatorState::Bound
        } else {
            CoordinatorState::Unbound
        }
    }

    /// True from the start of a deferred fade until the held-back
    /// changesets have been applied.
    pub fn is_applying(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The adopted snapshot. During a fade this is still the snapshot the
    /// fading changeset was computed from.
    pub fn current(&self) -> Option<&Snapshot<I, H, V>> {
        self.current.as_ref()
    }

    pub fn pending_updates(&self) -> usize {
        self.queue.len()
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn presentation_mut(&mut self) -> &mut P {
        &mut self.presentation
    }

    pub fn into_presentation(self) -> P {
        self.presentation
    }

    /// Deliver a new snapshot.
    ///
    /// Never fails: reconciler errors are reported through
    /// [`Presentation::report_error`] and answered with a full refresh.
    pub fn receive(&mut self, snapshot: Snapshot<I, H, V>) -> ReceiveOutcome {
        let update_id = UpdateId::new();

        if self.in_flight.is_some() {
            self.queue.push_back((update_id.clone(), snapshot));
            let pending = self.queue.len();
            tracing::debug!(update_id = %update_id, pending, "coordinator busy, snapshot queued");
            return ReceiveOutcome::Queued { pending };
        }

        self.process(update_id, snapshot)
    }

    /// Signal that the fade-out started by
    /// [`Presentation::begin_fade_out`] has finished.
    ///
    /// Applies the held-back changeset and any stages after it, then drains
    /// queued snapshots in arrival order. Returns `false` if no fade was
    /// pending.
    pub fn complete_fade(&mut self) -> bool {
        let Some(in_flight) = self.in_flight.take() else {
            tracing::warn!("complete_fade called with no fade pending");
            return false;
        };

        {
            let span = tracing::info_span!("update", update_id = %in_flight.update_id);
            let _guard = span.enter();
            let started = Instant::now();
            log_op_start!("complete_fade", update_id = %in_flight.update_id);

            self.commit(in_flight.fading);
            let outcome = self.run(in_flight.update_id.clone(), in_flight.remaining);

            log_op_end!(
                "complete_fade",
                duration_ms = started.elapsed().as_millis() as u64,
                update_id = %in_flight.update_id,
                outcome = ?outcome
            );
        }

        while self.in_flight.is_none() {
            let Some((update_id, snapshot)) = self.queue.pop_front() else {
                break;
            };
            self.process(update_id, snapshot);
        }

        true
    }

    fn process(&mut self, update_id: UpdateId, snapshot: Snapshot<I, H, V>) -> ReceiveOutcome {
        let span = tracing::info_span!("update", update_id = %update_id);
        let _guard = span.enter();
        let started = Instant::now();
        log_op_start!(
            "receive_snapshot",
            update_id = %update_id,
            section_count = snapshot.len()
        );

        let step = match &self.current {
            None => Step::Reload(ReloadReason::InitialBind),
            Some(_) if !self.presentation.can_apply_incrementally() => {
                Step::Reload(ReloadReason::NotIncremental)
            }
            Some(current) => match reconcile(self.config.staging, current, &snapshot) {
                Err(err) => Step::Failed(err),
                Ok(changesets) => match self.policy.decide(current, &changesets) {
                    ViewTransition::Reload => Step::Reload(ReloadReason::Policy),
                    ViewTransition::Animated => Step::Animate(changesets),
                },
            },
        };

        let outcome = match step {
            Step::Reload(reason) => self.reload(snapshot, reason),
            Step::Animate(changesets) => {
                tracing::debug!(
                    update_id = %update_id,
                    changeset_count = changesets.len(),
                    "applying changesets"
                );
                self.run(update_id.clone(), changesets.into())
            }
            Step::Failed(err) => {
                log_op_error!(
                    "receive_snapshot",
                    err.clone(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    update_id = %update_id
                );
                let reported = ExError::from(err)
                    .with_op("receive_snapshot")
                    .with_update_id(update_id.clone());
                self.presentation.report_error(&reported);
                self.reload(snapshot, ReloadReason::StructuralInconsistency)
            }
        };

        log_op_end!(
            "receive_snapshot",
            duration_ms = started.elapsed().as_millis() as u64,
            update_id = %update_id,
            outcome = ?outcome
        );
        outcome
    }

    fn reload(&mut self, snapshot: Snapshot<I, H, V>, reason: ReloadReason) -> ReceiveOutcome {
        tracing::debug!(reason = ?reason, "full refresh");
        self.presentation.reload(&snapshot);
        self.current = Some(snapshot);
        ReceiveOutcome::Reloaded { reason }
    }

    /// Apply changesets in order until one needs a fade-out.
    fn run(
        &mut self,
        update_id: UpdateId,
        mut remaining: VecDeque<Changeset<I, H, V>>,
    ) -> ReceiveOutcome {
        let mut applied = 0;
        while let Some(changeset) = remaining.pop_front() {
            let fade = changeset
                .single_deleted_item()
                .zip(self.config.fade_delete_duration());
            if let Some((item, duration)) = fade {
                tracing::debug!(item = %item, "deferring changeset until fade-out completes");
                self.presentation.begin_fade_out(item, duration);
                self.in_flight = Some(InFlight {
                    update_id,
                    fading: changeset,
                    remaining,
                });
                return ReceiveOutcome::Fading { item, applied };
            }
            self.commit(changeset);
            applied += 1;
        }
        ReceiveOutcome::Applied {
            changesets: applied,
        }
    }

    fn commit(&mut self, changeset: Changeset<I, H, V>) {
        self.presentation.apply_changeset(&changeset);
        self.current = Some(changeset.into_final_snapshot());
    }
}

fn reconcile<I, H, V>(
    staging: Staging,
    current: &Snapshot<I, H, V>,
    next: &Snapshot<I, H, V>,
) -> Result<Vec<Changeset<I, H, V>>, StructuralInconsistency>
where
    I: Clone + Eq + Hash + Display,
    H: Clone + PartialEq,
    V: Clone + PartialEq,
{
    match staging {
        Staging::Single => diff(current, next).map(|changeset| vec![changeset]),
        Staging::SectionsThenItems => diff_staged(current, next),
    }
}
