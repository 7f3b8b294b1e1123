//! Replay command
//!
//! Drives the update coordinator with a console presentation. Fade-outs
//! complete immediately; the configured delay is only reported.

use clap::Args;
use sectiondiff_core::config::{CoordinatorConfig, Staging};
use sectiondiff_core::coordinator::{Presentation, UpdateCoordinator};
use sectiondiff_core::diff::{Changeset, ItemPath};
use sectiondiff_core::errors::ExError;
use sectiondiff_core::policy::OperationThreshold;
use sectiondiff_core::{log_op_end, log_op_start, Snapshot};
use serde_json::Value;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::{load_snapshot, JsonSnapshot};

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Coordinator configuration (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Fade-out delay for single-item deletions, in milliseconds
    #[arg(long)]
    pub fade_ms: Option<u64>,

    /// Reload instead of animating above this many edits
    #[arg(long)]
    pub max_ops: Option<u64>,

    /// Apply section-level and item-level edits as separate changesets
    #[arg(long)]
    pub staged: bool,

    /// Snapshot files, in delivery order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Prints every presentation instruction as one line on stdout
#[derive(Debug, Default)]
pub struct ConsolePresentation {
    reloads: usize,
    changesets: usize,
    errors: usize,
}

impl Presentation<String, Value, Value> for ConsolePresentation {
    fn reload(&mut self, snapshot: &JsonSnapshot) {
        self.reloads += 1;
        println!(
            "reload: sections={} items={} digest={}",
            snapshot.len(),
            snapshot.item_count(),
            short_digest(snapshot)
        );
    }

    fn apply_changeset(&mut self, changeset: &Changeset<String, Value, Value>) {
        self.changesets += 1;
        println!(
            "apply: operations={} (sections: {}, items: {})",
            changeset.operation_count(),
            changeset.section_operation_count(),
            changeset.item_operation_count()
        );
    }

    fn begin_fade_out(&mut self, item: ItemPath, duration: Duration) {
        println!("fade-out: item {} over {}ms", item, duration.as_millis());
    }

    fn report_error(&mut self, error: &ExError) {
        self.errors += 1;
        println!("error: {}", error);
    }
}

fn short_digest(snapshot: &JsonSnapshot) -> String {
    snapshot
        .digest()
        .map(|d| d.chars().take(12).collect())
        .unwrap_or_else(|_| "unavailable".to_string())
}

/// File configuration with command-line overrides applied
fn resolve_config(args: &ReplayArgs) -> sectiondiff_core::Result<CoordinatorConfig> {
    let mut config = match &args.config {
        Some(path) => CoordinatorConfig::load(path)?,
        None => CoordinatorConfig::default(),
    };
    if let Some(fade_ms) = args.fade_ms {
        config = config.with_fade_delete_ms(fade_ms);
    }
    if let Some(max_ops) = args.max_ops {
        config = config.with_max_operations(max_ops);
    }
    if args.staged {
        config = config.with_staging(Staging::SectionsThenItems);
    }
    config.validate()?;
    Ok(config)
}

pub fn execute(args: ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    let config = resolve_config(&args)?;
    log_op_start!("replay", file_count = args.files.len());

    // Load everything up front so a bad file fails before any output
    let snapshots = args
        .files
        .iter()
        .map(|path| load_snapshot(path))
        .collect::<Result<Vec<_>, _>>()?;

    let max_operations = config.max_operations;
    let mut coordinator = UpdateCoordinator::new(ConsolePresentation::default(), config);
    if let Some(max) = max_operations {
        let max = usize::try_from(max).unwrap_or(usize::MAX);
        coordinator = coordinator.with_policy(OperationThreshold::new(max));
    }

    for (path, snapshot) in args.files.iter().zip(snapshots) {
        println!("== {}", path.display());
        let outcome = coordinator.receive(snapshot);
        println!("outcome: {}", serde_json::to_string(&outcome)?);
        while coordinator.is_applying() {
            coordinator.complete_fade();
            println!("fade-out complete");
        }
    }

    let final_snapshot: Option<&Snapshot<String, Value, Value>> = coordinator.current();
    if let Some(snapshot) = final_snapshot {
        println!(
            "final: sections={} items={} digest={}",
            snapshot.len(),
            snapshot.item_count(),
            short_digest(snapshot)
        );
    }
    let presentation = coordinator.into_presentation();
    println!(
        "totals: reloads={} changesets={} errors={}",
        presentation.reloads, presentation.changesets, presentation.errors
    );

    log_op_end!(
        "replay",
        duration_ms = started.elapsed().as_millis() as u64,
        reloads = presentation.reloads,
        changesets = presentation.changesets
    );
    Ok(())
}
