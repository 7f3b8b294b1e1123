//! Changeset output types.
//!
//! Every index set is sorted ascending (moves by their source) so a changeset
//! serializes deterministically.

use serde::Serialize;

use crate::model::Snapshot;

/// Address of an item: section index, then item index within that section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ItemPath {
    pub section_index: usize,
    pub item_index: usize,
}

impl ItemPath {
    pub fn new(section_index: usize, item_index: usize) -> Self {
        Self {
            section_index,
            item_index,
        }
    }
}

impl From<(usize, usize)> for ItemPath {
    fn from((section_index, item_index): (usize, usize)) -> Self {
        Self::new(section_index, item_index)
    }
}

impl std::fmt::Display for ItemPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.section_index, self.item_index)
    }
}

/// The structural edit script between two snapshots.
///
/// Coordinates:
/// - deletions are positions in `initial`
/// - insertions are positions in `final`
/// - moves are `(position in initial, position in final)`
/// - updates are positions in `initial` once the deletions have been applied
///
/// The four categories are complete, order-independent sets. Replaying them
/// in the order deletes, updates, inserts, moves turns `initial` into the
/// retained `final` snapshot (see [`crate::apply::apply`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Changeset<I, H, V> {
    #[serde(rename = "final")]
    pub(crate) final_snapshot: Snapshot<I, H, V>,

    pub(crate) deleted_sections: Vec<usize>,
    pub(crate) inserted_sections: Vec<usize>,
    pub(crate) moved_sections: Vec<(usize, usize)>,
    pub(crate) updated_sections: Vec<usize>,

    pub(crate) deleted_items: Vec<ItemPath>,
    pub(crate) inserted_items: Vec<ItemPath>,
    pub(crate) moved_items: Vec<(ItemPath, ItemPath)>,
    pub(crate) updated_items: Vec<ItemPath>,
}

impl<I, H, V> Changeset<I, H, V> {
    /// A changeset with no edits whose final snapshot is `final_snapshot`
    pub(crate) fn unchanged(final_snapshot: Snapshot<I, H, V>) -> Self {
        Self {
            final_snapshot,
            deleted_sections: Vec::new(),
            inserted_sections: Vec::new(),
            moved_sections: Vec::new(),
            updated_sections: Vec::new(),
            deleted_items: Vec::new(),
            inserted_items: Vec::new(),
            moved_items: Vec::new(),
            updated_items: Vec::new(),
        }
    }

    /// The snapshot this changeset transforms into
    pub fn final_snapshot(&self) -> &Snapshot<I, H, V> {
        &self.final_snapshot
    }

    pub fn into_final_snapshot(self) -> Snapshot<I, H, V> {
        self.final_snapshot
    }

    pub fn deleted_sections(&self) -> &[usize] {
        &self.deleted_sections
    }

    pub fn inserted_sections(&self) -> &[usize] {
        &self.inserted_sections
    }

    pub fn moved_sections(&self) -> &[(usize, usize)] {
        &self.moved_sections
    }

    pub fn updated_sections(&self) -> &[usize] {
        &self.updated_sections
    }

    pub fn deleted_items(&self) -> &[ItemPath] {
        &self.deleted_items
    }

    pub fn inserted_items(&self) -> &[ItemPath] {
        &self.inserted_items
    }

    pub fn moved_items(&self) -> &[(ItemPath, ItemPath)] {
        &self.moved_items
    }

    pub fn updated_items(&self) -> &[ItemPath] {
        &self.updated_items
    }

    /// Number of section-level edits
    pub fn section_operation_count(&self) -> usize {
        self.deleted_sections.len()
            + self.inserted_sections.len()
            + self.moved_sections.len()
            + self.updated_sections.len()
    }

    /// Number of item-level edits
    pub fn item_operation_count(&self) -> usize {
        self.deleted_items.len()
            + self.inserted_items.len()
            + self.moved_items.len()
            + self.updated_items.len()
    }

    /// Total number of edits across both levels
    pub fn operation_count(&self) -> usize {
        self.section_operation_count() + self.item_operation_count()
    }

    /// True if applying this changeset changes nothing
    pub fn is_empty(&self) -> bool {
        self.operation_count() == 0
    }

    /// The deleted item, if item deletion is the changeset's only deletion of
    /// an item (the coordinator's fade-out case).
    pub fn single_deleted_item(&self) -> Option<ItemPath> {
        match self.deleted_items.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}
