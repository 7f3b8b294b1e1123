//! Diff command

use clap::{Args, ValueEnum};
use sectiondiff_core::diff::{diff, diff_staged, render_human_summary};
use std::path::PathBuf;

use super::load_snapshot;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Summary,
}

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Initial snapshot file
    #[arg(long)]
    pub from: PathBuf,

    /// Final snapshot file
    #[arg(long)]
    pub to: PathBuf,

    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Emit section-level and item-level edits as separate changesets
    #[arg(long)]
    pub staged: bool,
}

pub fn execute(args: DiffArgs) -> Result<(), Box<dyn std::error::Error>> {
    let initial = load_snapshot(&args.from)?;
    let final_snapshot = load_snapshot(&args.to)?;
    tracing::debug!(
        from = %args.from.display(),
        to = %args.to.display(),
        staged = args.staged,
        "snapshots loaded"
    );

    let changesets = if args.staged {
        diff_staged(&initial, &final_snapshot)?
    } else {
        vec![diff(&initial, &final_snapshot)?]
    };

    match args.format {
        OutputFormat::Json => {
            let rendered = if args.staged {
                serde_json::to_string_pretty(&changesets)?
            } else {
                serde_json::to_string_pretty(&changesets[0])?
            };
            println!("{}", rendered);
        }
        OutputFormat::Summary => {
            let mut before = &initial;
            for (stage, changeset) in changesets.iter().enumerate() {
                if changesets.len() > 1 {
                    println!("# Stage {}\n", stage + 1);
                }
                print!("{}", render_human_summary(before, changeset));
                before = changeset.final_snapshot();
            }
        }
    }

    Ok(())
}
