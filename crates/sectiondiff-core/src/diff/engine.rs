//! Reconciler: changeset computation engine.
//!
//! The entry point is [`diff`], which matches sections and items of two
//! snapshots by identity and classifies every persisted entity as moved,
//! updated or unchanged. [`diff_staged`] splits the same work into a
//! section-only changeset followed by an item-only changeset.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;
use std::time::Instant;

use crate::diff::model::{Changeset, ItemPath};
use crate::errors::{IdentityScope, SnapshotSide, StructuralInconsistency};
use crate::model::{Identifiable, Section, Snapshot, ValueEq};
use crate::{log_op_end, log_op_error, log_op_start};

/// Identity lookup tables for one snapshot.
struct SnapshotIndex<'a, I> {
    /// section identity -> section index
    sections: HashMap<&'a I, usize>,
    /// per section: item identity -> item index
    items: Vec<HashMap<&'a I, usize>>,
}

/// Build identity maps for a snapshot, rejecting duplicate identities.
fn index_snapshot<'a, I, H, V>(
    snapshot: &'a Snapshot<I, H, V>,
    side: SnapshotSide,
) -> Result<SnapshotIndex<'a, I>, StructuralInconsistency>
where
    I: Clone + Eq + Hash + Display,
{
    let mut sections = HashMap::with_capacity(snapshot.len());
    let mut items = Vec::with_capacity(snapshot.len());

    for (section_index, section) in snapshot.iter().enumerate() {
        if sections.insert(section.identity(), section_index).is_some() {
            return Err(StructuralInconsistency {
                identity: section.identity().to_string(),
                scope: IdentityScope::Section,
                side,
            });
        }

        let mut item_map = HashMap::with_capacity(section.items.len());
        for (item_index, item) in section.items.iter().enumerate() {
            if item_map.insert(item.identity(), item_index).is_some() {
                return Err(StructuralInconsistency {
                    identity: item.identity().to_string(),
                    scope: IdentityScope::Item {
                        section_id: section.identity().to_string(),
                    },
                    side,
                });
            }
        }
        items.push(item_map);
    }

    Ok(SnapshotIndex { sections, items })
}

/// For each target index in `targets` (given in source order), its rank among
/// all targets once sorted. `len` is the size of the target space.
fn target_ranks(targets: impl Iterator<Item = usize>, len: usize) -> Vec<Option<usize>> {
    let mut present = vec![false; len];
    for target in targets {
        present[target] = true;
    }
    let mut ranks = vec![None; len];
    let mut next = 0;
    for (index, is_present) in present.into_iter().enumerate() {
        if is_present {
            ranks[index] = Some(next);
            next += 1;
        }
    }
    ranks
}

/// A section present in both snapshots.
struct PersistedSection {
    old_index: usize,
    new_index: usize,
    /// Position once deleted sections are removed from `initial`
    post_delete_index: usize,
    /// Items matched inside this section: (old item index, new item index),
    /// in initial order
    matched_items: Vec<(usize, usize)>,
}

/// Compute the changeset that turns `initial` into `final_snapshot`.
///
/// # Errors
///
/// Returns [`StructuralInconsistency`] if either snapshot holds two sections
/// with the same identity, or two items with the same identity inside one
/// section. No other input is rejected.
///
/// # Example
///
/// ```
/// use sectiondiff_core::diff::{diff, ItemPath};
/// use sectiondiff_core::model::{Item, Section, Snapshot};
///
/// let initial = Snapshot::new(vec![Section::new("S1", (), vec![Item::new("a", 1)])]);
/// let updated = Snapshot::new(vec![Section::new("S1", (), vec![Item::new("a", 2)])]);
///
/// let changeset = diff(&initial, &updated).unwrap();
/// assert_eq!(changeset.updated_items(), &[ItemPath::new(0, 0)]);
/// ```
pub fn diff<I, H, V>(
    initial: &Snapshot<I, H, V>,
    final_snapshot: &Snapshot<I, H, V>,
) -> Result<Changeset<I, H, V>, StructuralInconsistency>
where
    I: Clone + Eq + Hash + Display,
    H: Clone + PartialEq,
    V: Clone + PartialEq,
{
    let started = Instant::now();
    log_op_start!(
        "diff",
        initial_sections = initial.len(),
        final_sections = final_snapshot.len()
    );

    let result = index_snapshot(initial, SnapshotSide::Initial).and_then(|old_index| {
        let new_index = index_snapshot(final_snapshot, SnapshotSide::Final)?;
        Ok(compute_changeset(
            initial,
            final_snapshot,
            &old_index,
            &new_index,
        ))
    });

    let duration_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(changeset) => {
            log_op_end!(
                "diff",
                duration_ms = duration_ms,
                section_operations = changeset.section_operation_count(),
                item_operations = changeset.item_operation_count()
            );
        }
        Err(err) => {
            log_op_error!(
                "diff",
                err.clone(),
                duration_ms = duration_ms,
                duplicate_identity = %err.identity
            );
        }
    }
    result
}

fn compute_changeset<I, H, V>(
    initial: &Snapshot<I, H, V>,
    final_snapshot: &Snapshot<I, H, V>,
    old_index: &SnapshotIndex<'_, I>,
    new_index: &SnapshotIndex<'_, I>,
) -> Changeset<I, H, V>
where
    I: Clone + Eq + Hash + Display,
    H: Clone + PartialEq,
    V: Clone + PartialEq,
{
    let old_sections = initial.sections();
    let new_sections = final_snapshot.sections();
    let mut changeset = Changeset::unchanged(final_snapshot.clone());

    // ---- Section pass ----
    let mut persisted: Vec<PersistedSection> = Vec::new();
    for (old, section) in old_sections.iter().enumerate() {
        match new_index.sections.get(section.identity()) {
            Some(&new) => persisted.push(PersistedSection {
                old_index: old,
                new_index: new,
                post_delete_index: persisted.len(),
                matched_items: Vec::new(),
            }),
            None => changeset.deleted_sections.push(old),
        }
    }
    changeset.inserted_sections = new_sections
        .iter()
        .enumerate()
        .filter(|(_, section)| !old_index.sections.contains_key(section.identity()))
        .map(|(new, _)| new)
        .collect();

    let section_ranks = target_ranks(persisted.iter().map(|p| p.new_index), new_sections.len());
    for pair in &persisted {
        if section_ranks[pair.new_index] != Some(pair.post_delete_index) {
            changeset.moved_sections.push((pair.old_index, pair.new_index));
        } else if !old_sections[pair.old_index].value_eq(&new_sections[pair.new_index]) {
            changeset.updated_sections.push(pair.post_delete_index);
        }
    }

    // ---- Item pass: match within each persisted section ----
    let mut leftover_old: HashMap<&I, Vec<ItemPath>> = HashMap::new();
    let mut leftover_new: HashMap<&I, Vec<ItemPath>> = HashMap::new();

    for pair in persisted.iter_mut() {
        let old_section = &old_sections[pair.old_index];
        let new_section = &new_sections[pair.new_index];
        let old_items = &old_index.items[pair.old_index];
        let new_items = &new_index.items[pair.new_index];

        for (i, item) in old_section.items.iter().enumerate() {
            match new_items.get(item.identity()) {
                Some(&j) => pair.matched_items.push((i, j)),
                None => leftover_old
                    .entry(item.identity())
                    .or_default()
                    .push(ItemPath::new(pair.old_index, i)),
            }
        }
        for (j, item) in new_section.items.iter().enumerate() {
            if !old_items.contains_key(item.identity()) {
                leftover_new
                    .entry(item.identity())
                    .or_default()
                    .push(ItemPath::new(pair.new_index, j));
            }
        }
    }

    // ---- Item pass: cross-section moves ----
    // Only an identity left over in exactly one persisted section on each
    // side is unambiguous.
    let mut crossed_old: HashSet<ItemPath> = HashSet::new();
    let mut crossed_new: HashSet<ItemPath> = HashSet::new();
    for (identity, olds) in &leftover_old {
        if let ([from], Some([to])) = (
            olds.as_slice(),
            leftover_new.get(identity).map(Vec::as_slice),
        ) {
            changeset.moved_items.push((*from, *to));
            crossed_old.insert(*from);
            crossed_new.insert(*to);
        }
    }
    changeset.deleted_items = leftover_old
        .into_values()
        .flatten()
        .filter(|path| !crossed_old.contains(path))
        .collect();
    changeset.inserted_items = leftover_new
        .into_values()
        .flatten()
        .filter(|path| !crossed_new.contains(path))
        .collect();
    changeset.deleted_items.sort();
    changeset.inserted_items.sort();

    // ---- Item pass: classify same-section matches ----
    let deleted: HashSet<ItemPath> = changeset.deleted_items.iter().copied().collect();
    for pair in &persisted {
        let old_section = &old_sections[pair.old_index];
        let new_section = &new_sections[pair.new_index];
        let item_ranks = target_ranks(
            pair.matched_items.iter().map(|&(_, j)| j),
            new_section.items.len(),
        );

        // Items of this section still present after deletions, in order
        let mut surviving = 0;
        let mut next_old = 0;
        for (rank, &(i, j)) in pair.matched_items.iter().enumerate() {
            while next_old < i {
                if !deleted.contains(&ItemPath::new(pair.old_index, next_old)) {
                    surviving += 1;
                }
                next_old += 1;
            }

            if item_ranks[j] != Some(rank) {
                changeset
                    .moved_items
                    .push((ItemPath::new(pair.old_index, i), ItemPath::new(pair.new_index, j)));
            } else if !old_section.items[i].value_eq(&new_section.items[j]) {
                changeset
                    .updated_items
                    .push(ItemPath::new(pair.post_delete_index, surviving));
            }
        }
    }
    changeset.moved_items.sort();
    changeset.updated_items.sort();

    changeset
}

/// Compute the same transformation as [`diff`] as two changesets: first only
/// section-level edits, then only item-level edits.
///
/// The first changeset's final snapshot has the final section order and
/// headers, with every persisted section still holding its initial items.
/// Empty stages are dropped; at least one changeset is always returned.
///
/// # Errors
///
/// Same as [`diff`].
pub fn diff_staged<I, H, V>(
    initial: &Snapshot<I, H, V>,
    final_snapshot: &Snapshot<I, H, V>,
) -> Result<Vec<Changeset<I, H, V>>, StructuralInconsistency>
where
    I: Clone + Eq + Hash + Display,
    H: Clone + PartialEq,
    V: Clone + PartialEq,
{
    let old_index = index_snapshot(initial, SnapshotSide::Initial)?;
    index_snapshot(final_snapshot, SnapshotSide::Final)?;

    let intermediate: Snapshot<I, H, V> = final_snapshot
        .iter()
        .map(|section| match old_index.sections.get(section.identity()) {
            Some(&old) => Section::new(
                section.identity.clone(),
                section.header.clone(),
                initial.sections()[old].items.clone(),
            ),
            None => section.clone(),
        })
        .collect();

    let sections_stage = diff(initial, &intermediate)?;
    let items_stage = diff(&intermediate, final_snapshot)?;

    let mut stages: Vec<_> = [sections_stage, items_stage]
        .into_iter()
        .filter(|changeset| !changeset.is_empty())
        .collect();
    if stages.is_empty() {
        stages.push(Changeset::unchanged(final_snapshot.clone()));
    }
    Ok(stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Item;

    type TestSnapshot = Snapshot<&'static str, &'static str, i32>;

    fn section(id: &'static str, items: &[(&'static str, i32)]) -> Section<&'static str, &'static str, i32> {
        Section::new(
            id,
            "",
            items.iter().map(|&(i, v)| Item::new(i, v)).collect(),
        )
    }

    #[test]
    fn test_target_ranks_skips_absent_targets() {
        let ranks = target_ranks([3, 0].into_iter(), 5);
        assert_eq!(ranks, vec![Some(0), None, None, Some(1), None]);
    }

    #[test]
    fn test_deletion_does_not_shift_neighbours_into_moves() {
        let initial: TestSnapshot = Snapshot::new(vec![
            section("A", &[]),
            section("B", &[]),
            section("C", &[]),
        ]);
        let final_snapshot: TestSnapshot = Snapshot::new(vec![section("B", &[]), section("C", &[])]);

        let cs = diff(&initial, &final_snapshot).unwrap();
        assert_eq!(cs.deleted_sections(), &[0]);
        assert!(cs.moved_sections().is_empty());
        assert!(cs.updated_sections().is_empty());
    }

    #[test]
    fn test_header_change_in_place_is_update_at_post_delete_index() {
        let initial: TestSnapshot = Snapshot::new(vec![
            section("A", &[]),
            Section::new("B", "old", vec![]),
        ]);
        let final_snapshot: TestSnapshot = Snapshot::new(vec![Section::new("B", "new", vec![])]);

        let cs = diff(&initial, &final_snapshot).unwrap();
        assert_eq!(cs.deleted_sections(), &[0]);
        assert_eq!(cs.updated_sections(), &[0]);
    }

    #[test]
    fn test_ambiguous_cross_section_identity_degrades_to_delete_insert() {
        let initial: TestSnapshot = Snapshot::new(vec![
            section("A", &[("x", 1)]),
            section("B", &[("x", 2)]),
            section("C", &[]),
        ]);
        let final_snapshot: TestSnapshot = Snapshot::new(vec![
            section("A", &[]),
            section("B", &[]),
            section("C", &[("x", 1)]),
        ]);

        let cs = diff(&initial, &final_snapshot).unwrap();
        assert!(cs.moved_items().is_empty());
        assert_eq!(
            cs.deleted_items(),
            &[ItemPath::new(0, 0), ItemPath::new(1, 0)]
        );
        assert_eq!(cs.inserted_items(), &[ItemPath::new(2, 0)]);
    }

    #[test]
    fn test_items_of_inserted_section_are_not_reported() {
        let initial: TestSnapshot = Snapshot::empty();
        let final_snapshot: TestSnapshot = Snapshot::new(vec![section("A", &[("a", 1), ("b", 2)])]);

        let cs = diff(&initial, &final_snapshot).unwrap();
        assert_eq!(cs.inserted_sections(), &[0]);
        assert!(cs.inserted_items().is_empty());
    }

    #[test]
    fn test_duplicate_item_in_final_reports_scope() {
        let initial: TestSnapshot = Snapshot::new(vec![section("A", &[])]);
        let final_snapshot: TestSnapshot = Snapshot::new(vec![section("A", &[("a", 1), ("a", 2)])]);

        let err = diff(&initial, &final_snapshot).unwrap_err();
        assert_eq!(err.identity, "a");
        assert_eq!(err.side, SnapshotSide::Final);
        assert_eq!(
            err.scope,
            IdentityScope::Item {
                section_id: "A".to_string()
            }
        );
    }

    #[test]
    fn test_staged_diff_separates_levels() {
        let initial: TestSnapshot = Snapshot::new(vec![
            section("X", &[("a", 1)]),
            section("Y", &[("b", 2)]),
        ]);
        let final_snapshot: TestSnapshot = Snapshot::new(vec![
            section("Y", &[("b", 3)]),
            section("X", &[("a", 1), ("c", 4)]),
        ]);

        let stages = diff_staged(&initial, &final_snapshot).unwrap();
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].moved_sections(), &[(0, 1), (1, 0)]);
        assert_eq!(stages[0].item_operation_count(), 0);
        assert_eq!(stages[1].section_operation_count(), 0);
        assert_eq!(stages[1].updated_items(), &[ItemPath::new(0, 0)]);
        assert_eq!(stages[1].inserted_items(), &[ItemPath::new(1, 1)]);
        assert_eq!(stages[1].final_snapshot(), &final_snapshot);
    }

    #[test]
    fn test_staged_diff_of_identical_snapshots_is_one_empty_changeset() {
        let snapshot: TestSnapshot = Snapshot::new(vec![section("A", &[("a", 1)])]);

        let stages = diff_staged(&snapshot, &snapshot).unwrap();
        assert_eq!(stages.len(), 1);
        assert!(stages[0].is_empty());
    }
}
