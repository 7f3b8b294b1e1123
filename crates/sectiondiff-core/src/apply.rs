//! Functional-boundary apply function
//!
//! [`apply`] replays a [`Changeset`] onto a snapshot, producing a new
//! snapshot. It is the executable form of the changeset contract: for any
//! `changeset = diff(a, b)`, `apply(a, &changeset)` equals `b`.
//!
//! ## Atomicity Contract
//!
//! - **All-or-nothing**: either a complete new snapshot is returned, or an
//!   error is returned and the caller's snapshot is untouched (it is only
//!   ever borrowed)
//! - **No panics**: out-of-range indices and identity disagreements return
//!   `ChangesetMismatch`
//!
//! ## Order
//!
//! Operations are replayed category by category: deletes, updates, inserts,
//! moves. Updates are addressed in the post-deletion snapshot, inserts and
//! move targets in the final snapshot.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;

use crate::diff::model::{Changeset, ItemPath};
use crate::errors::{Result, SectionDiffError};
use crate::model::{Identifiable, Item, Section, Snapshot};

/// A section of the working copy, tagged with its index in `initial`.
struct WorkingSection<'a, I, H, V> {
    origin: usize,
    source: &'a Section<I, H, V>,
    header_updated: bool,
    items: Vec<WorkingItem<'a, I, V>>,
}

/// An item of the working copy, tagged with its index in its initial section.
struct WorkingItem<'a, I, V> {
    origin: usize,
    source: &'a Item<I, V>,
    value_updated: bool,
}

fn mismatch(reason: impl Into<String>) -> SectionDiffError {
    SectionDiffError::ChangesetMismatch {
        reason: reason.into(),
    }
}

/// For every section that survives the changeset's deletions, its index in
/// `initial` and the initial indices of its surviving items.
///
/// Position `k` of the returned vector is post-deletion section `k`; position
/// `m` of its item list is post-deletion item `m`. This is the coordinate
/// space of `updated_sections` and `updated_items`.
pub fn post_delete_layout<I, H, V>(
    initial: &Snapshot<I, H, V>,
    changeset: &Changeset<I, H, V>,
) -> Vec<(usize, Vec<usize>)> {
    let deleted_sections: HashSet<usize> = changeset.deleted_sections().iter().copied().collect();
    let deleted_items: HashSet<ItemPath> = changeset.deleted_items().iter().copied().collect();

    initial
        .iter()
        .enumerate()
        .filter(|(s, _)| !deleted_sections.contains(s))
        .map(|(s, section)| {
            let items = (0..section.items.len())
                .filter(|&i| !deleted_items.contains(&ItemPath::new(s, i)))
                .collect();
            (s, items)
        })
        .collect()
}

/// Replay `changeset` onto `initial`, returning the resulting snapshot.
///
/// Unchanged entries are carried over from `initial`; inserted, moved and
/// updated entries take their content from the changeset's final snapshot.
/// Every placed entry is checked against the identity the final snapshot
/// holds at that position.
///
/// # Errors
///
/// Returns `ChangesetMismatch` if the changeset references an index that
/// does not exist, or if the replay places an entity where the final
/// snapshot has a different one (the changeset was computed against some
/// other snapshot).
///
/// # Example
///
/// ```
/// use sectiondiff_core::{apply, diff};
/// use sectiondiff_core::model::{Item, Section, Snapshot};
///
/// let a = Snapshot::new(vec![Section::new("S1", (), vec![Item::new("a", 1), Item::new("b", 2)])]);
/// let b = Snapshot::new(vec![Section::new("S1", (), vec![Item::new("b", 3), Item::new("c", 4)])]);
///
/// let changeset = diff(&a, &b).unwrap();
/// assert_eq!(apply(&a, &changeset).unwrap(), b);
/// ```
pub fn apply<I, H, V>(
    initial: &Snapshot<I, H, V>,
    changeset: &Changeset<I, H, V>,
) -> Result<Snapshot<I, H, V>>
where
    I: Clone + Eq + Hash + Display,
    H: Clone,
    V: Clone,
{
    let final_snapshot = changeset.final_snapshot();

    // ---- Deletes ----
    let deleted_sections: HashSet<usize> = changeset.deleted_sections().iter().copied().collect();
    for &s in changeset.deleted_sections() {
        if s >= initial.len() {
            return Err(mismatch(format!("deleted section {} out of range", s)));
        }
    }
    let mut deleted_items: HashSet<ItemPath> = HashSet::new();
    for &path in changeset.deleted_items() {
        let section = initial
            .section(path.section_index)
            .filter(|_| !deleted_sections.contains(&path.section_index))
            .ok_or_else(|| mismatch(format!("deleted item {} has no surviving section", path)))?;
        if path.item_index >= section.items.len() {
            return Err(mismatch(format!("deleted item {} out of range", path)));
        }
        deleted_items.insert(path);
    }

    let mut working: Vec<WorkingSection<'_, I, H, V>> = initial
        .iter()
        .enumerate()
        .filter(|(s, _)| !deleted_sections.contains(s))
        .map(|(s, section)| WorkingSection {
            origin: s,
            source: section,
            header_updated: false,
            items: section
                .items
                .iter()
                .enumerate()
                .filter(|(i, _)| !deleted_items.contains(&ItemPath::new(s, *i)))
                .map(|(i, item)| WorkingItem {
                    origin: i,
                    source: item,
                    value_updated: false,
                })
                .collect(),
        })
        .collect();

    // ---- Updates (post-deletion coordinates) ----
    for &k in changeset.updated_sections() {
        working
            .get_mut(k)
            .ok_or_else(|| mismatch(format!("updated section {} out of range", k)))?
            .header_updated = true;
    }
    for &path in changeset.updated_items() {
        working
            .get_mut(path.section_index)
            .and_then(|section| section.items.get_mut(path.item_index))
            .ok_or_else(|| mismatch(format!("updated item {} out of range", path)))?
            .value_updated = true;
    }

    // ---- Inserts and moves: lift moved items out of their sections ----
    let mut moved_in: HashMap<ItemPath, &Item<I, V>> = HashMap::new();
    for &(from, to) in changeset.moved_items() {
        let section = working
            .iter_mut()
            .find(|section| section.origin == from.section_index)
            .ok_or_else(|| mismatch(format!("moved item {} has no surviving section", from)))?;
        let position = section
            .items
            .iter()
            .position(|item| item.origin == from.item_index)
            .ok_or_else(|| mismatch(format!("moved item {} not found", from)))?;
        let lifted = section.items.remove(position);

        let target = final_item(final_snapshot, to)?;
        check_identity(lifted.source.identity(), target.identity(), "moved item", to)?;
        moved_in.insert(to, target);
    }

    // ---- Section layout ----
    let mut section_slots: Vec<Option<SectionSlot<'_, I, H, V>>> =
        (0..final_snapshot.len()).map(|_| None).collect();

    for &t in changeset.inserted_sections() {
        let slot = section_slots
            .get_mut(t)
            .ok_or_else(|| mismatch(format!("inserted section {} out of range", t)))?;
        *slot = Some(SectionSlot::Inserted);
    }

    let mut moved_sections: HashMap<usize, usize> = HashMap::new();
    for &(from, to) in changeset.moved_sections() {
        moved_sections.insert(from, to);
    }

    let mut stable = Vec::new();
    for section in working {
        match moved_sections.get(&section.origin) {
            Some(&to) => {
                let slot = section_slots
                    .get_mut(to)
                    .ok_or_else(|| mismatch(format!("moved section target {} out of range", to)))?;
                *slot = Some(SectionSlot::Carried {
                    section,
                    take_header: true,
                });
            }
            None => stable.push(section),
        }
    }

    let mut stable = stable.into_iter();
    for slot in section_slots.iter_mut().filter(|slot| slot.is_none()) {
        let section = stable
            .next()
            .ok_or_else(|| mismatch("fewer surviving sections than final positions"))?;
        let take_header = section.header_updated;
        *slot = Some(SectionSlot::Carried {
            section,
            take_header,
        });
    }
    if stable.next().is_some() {
        return Err(mismatch("more surviving sections than final positions"));
    }

    // ---- Item layout per section ----
    let mut sections = Vec::with_capacity(final_snapshot.len());
    for (t, slot) in section_slots.into_iter().enumerate() {
        let target = &final_snapshot.sections()[t];
        let built = match slot {
            Some(SectionSlot::Carried {
                section,
                take_header,
            }) => {
                check_identity(section.source.identity(), target.identity(), "section", t)?;
                let header = if take_header {
                    target.header.clone()
                } else {
                    section.source.header.clone()
                };
                let items = layout_items(t, section.items, target, changeset, &moved_in)?;
                Section::new(section.source.identity.clone(), header, items)
            }
            Some(SectionSlot::Inserted) | None => target.clone(),
        };
        sections.push(built);
    }

    Ok(Snapshot::new(sections))
}

/// What ends up at one section position of the final snapshot.
enum SectionSlot<'a, I, H, V> {
    Inserted,
    Carried {
        section: WorkingSection<'a, I, H, V>,
        take_header: bool,
    },
}

fn layout_items<I, H, V>(
    section_index: usize,
    remaining: Vec<WorkingItem<'_, I, V>>,
    target: &Section<I, H, V>,
    changeset: &Changeset<I, H, V>,
    moved_in: &HashMap<ItemPath, &Item<I, V>>,
) -> Result<Vec<Item<I, V>>>
where
    I: Clone + Eq + Hash + Display,
    V: Clone,
{
    let len = target.items.len();
    let mut slots: Vec<Option<Item<I, V>>> = (0..len).map(|_| None).collect();

    for path in changeset
        .inserted_items()
        .iter()
        .filter(|path| path.section_index == section_index)
    {
        let slot = slots
            .get_mut(path.item_index)
            .ok_or_else(|| mismatch(format!("inserted item {} out of range", path)))?;
        *slot = Some(target.items[path.item_index].clone());
    }

    for (path, item) in moved_in
        .iter()
        .filter(|(path, _)| path.section_index == section_index)
    {
        slots[path.item_index] = Some((*item).clone());
    }

    let mut remaining = remaining.into_iter();
    for (j, slot) in slots.iter_mut().enumerate() {
        if slot.is_some() {
            continue;
        }
        let working = remaining.next().ok_or_else(|| {
            mismatch(format!(
                "fewer surviving items than final positions in section {}",
                section_index
            ))
        })?;
        let expected = &target.items[j];
        check_identity(
            working.source.identity(),
            expected.identity(),
            "item",
            ItemPath::new(section_index, j),
        )?;
        *slot = Some(if working.value_updated {
            expected.clone()
        } else {
            working.source.clone()
        });
    }
    if remaining.next().is_some() {
        return Err(mismatch(format!(
            "more surviving items than final positions in section {}",
            section_index
        )));
    }

    Ok(slots.into_iter().flatten().collect())
}

fn final_item<I, H, V>(final_snapshot: &Snapshot<I, H, V>, path: ItemPath) -> Result<&Item<I, V>> {
    final_snapshot
        .section(path.section_index)
        .and_then(|section| section.items.get(path.item_index))
        .ok_or_else(|| mismatch(format!("move target {} out of range", path)))
}

fn check_identity<I: Eq + Display>(
    placed: &I,
    expected: &I,
    what: &str,
    position: impl Display,
) -> Result<()> {
    if placed == expected {
        Ok(())
    } else {
        Err(mismatch(format!(
            "{} `{}` placed at {} where final snapshot has `{}`",
            what, placed, position, expected
        )))
    }
}
