//! Human-readable summary renderer for changesets.

use serde::Serialize;
use std::fmt::Display;

use crate::apply::post_delete_layout;
use crate::diff::model::{Changeset, ItemPath};
use crate::model::Snapshot;

/// Render a Markdown summary of `changeset`, resolving indices to identities.
///
/// `initial` must be the snapshot the changeset was computed from; indices
/// that do not resolve are shown as `?`. The summary is informational only.
pub fn render_human_summary<I, H, V>(
    initial: &Snapshot<I, H, V>,
    changeset: &Changeset<I, H, V>,
) -> String
where
    I: Display + Serialize,
    H: Serialize,
    V: Serialize,
{
    let final_snapshot = changeset.final_snapshot();
    let mut out = String::new();

    out.push_str("## Changeset\n\n");
    out.push_str(&format!(
        "**Operations**: {} (sections: {}, items: {})  \n",
        changeset.operation_count(),
        changeset.section_operation_count(),
        changeset.item_operation_count()
    ));
    out.push_str(&format!(
        "**Initial**: `{}`  \n**Final**: `{}`\n\n",
        short_digest(initial),
        short_digest(final_snapshot)
    ));

    if changeset.is_empty() {
        out.push_str("_No changes._\n");
        return out;
    }

    let layout = post_delete_layout(initial, changeset);
    let section_id = |snapshot: &Snapshot<I, H, V>, index: usize| -> String {
        snapshot
            .section(index)
            .map(|s| s.identity.to_string())
            .unwrap_or_else(|| "?".to_string())
    };
    let item_id = |snapshot: &Snapshot<I, H, V>, path: ItemPath| -> String {
        snapshot
            .section(path.section_index)
            .and_then(|s| s.items.get(path.item_index))
            .map(|item| item.identity.to_string())
            .unwrap_or_else(|| "?".to_string())
    };
    // Updates are addressed after deletions; map back to initial indices
    let surviving_section = |k: usize| layout.get(k).map(|(s, _)| *s);
    let surviving_item = |path: ItemPath| {
        layout.get(path.section_index).and_then(|(s, items)| {
            items
                .get(path.item_index)
                .map(|&i| ItemPath::new(*s, i))
        })
    };

    if changeset.section_operation_count() > 0 {
        out.push_str("### Sections\n\n");
        push_list(
            &mut out,
            "Deleted",
            changeset
                .deleted_sections()
                .iter()
                .map(|&s| format!("`{}` @{}", section_id(initial, s), s)),
        );
        push_list(
            &mut out,
            "Inserted",
            changeset
                .inserted_sections()
                .iter()
                .map(|&t| format!("`{}` @{}", section_id(final_snapshot, t), t)),
        );
        push_list(
            &mut out,
            "Moved",
            changeset
                .moved_sections()
                .iter()
                .map(|&(from, to)| format!("`{}` {} → {}", section_id(initial, from), from, to)),
        );
        push_list(
            &mut out,
            "Updated",
            changeset.updated_sections().iter().map(|&k| {
                let id = surviving_section(k)
                    .map(|s| section_id(initial, s))
                    .unwrap_or_else(|| "?".to_string());
                format!("`{}` @{}", id, k)
            }),
        );
        out.push('\n');
    }

    if changeset.item_operation_count() > 0 {
        out.push_str("### Items\n\n");
        push_list(
            &mut out,
            "Deleted",
            changeset
                .deleted_items()
                .iter()
                .map(|&p| format!("`{}` {}", item_id(initial, p), p)),
        );
        push_list(
            &mut out,
            "Inserted",
            changeset
                .inserted_items()
                .iter()
                .map(|&p| format!("`{}` {}", item_id(final_snapshot, p), p)),
        );
        push_list(
            &mut out,
            "Moved",
            changeset
                .moved_items()
                .iter()
                .map(|&(from, to)| format!("`{}` {} → {}", item_id(initial, from), from, to)),
        );
        push_list(
            &mut out,
            "Updated",
            changeset.updated_items().iter().map(|&p| {
                let id = surviving_item(p)
                    .map(|path| item_id(initial, path))
                    .unwrap_or_else(|| "?".to_string());
                format!("`{}` {}", id, p)
            }),
        );
    }

    out
}

fn push_list(out: &mut String, label: &str, entries: impl Iterator<Item = String>) {
    let entries: Vec<String> = entries.collect();
    if entries.is_empty() {
        return;
    }
    out.push_str(&format!(
        "- **{}** ({}): {}\n",
        label,
        entries.len(),
        entries.join(", ")
    ));
}

/// First 12 hex chars of the snapshot digest
fn short_digest<I, H, V>(snapshot: &Snapshot<I, H, V>) -> String
where
    I: Serialize,
    H: Serialize,
    V: Serialize,
{
    match snapshot.digest() {
        Ok(digest) => digest.chars().take(12).collect(),
        Err(_) => "unavailable".to_string(),
    }
}
