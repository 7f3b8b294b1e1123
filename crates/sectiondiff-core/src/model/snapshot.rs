//! Snapshot model
//!
//! A snapshot is the full two-level collection at one instant. It is never
//! mutated after construction; a new state is always a new snapshot.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::errors::Result;
use crate::model::section::Section;

/// An immutable ordered sequence of sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    transparent,
    bound(deserialize = "I: Deserialize<'de>, H: Deserialize<'de> + Default, V: Deserialize<'de>")
)]
pub struct Snapshot<I, H, V> {
    sections: Vec<Section<I, H, V>>,
}

impl<I, H, V> Snapshot<I, H, V> {
    pub fn new(sections: Vec<Section<I, H, V>>) -> Self {
        Self { sections }
    }

    pub fn empty() -> Self {
        Self {
            sections: Vec::new(),
        }
    }

    pub fn sections(&self) -> &[Section<I, H, V>] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&Section<I, H, V>> {
        self.sections.get(index)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total number of items across all sections
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section<I, H, V>> {
        self.sections.iter()
    }

    pub fn into_sections(self) -> Vec<Section<I, H, V>> {
        self.sections
    }
}

impl<I, H, V> Snapshot<I, H, V>
where
    I: Serialize,
    H: Serialize,
    V: Serialize,
{
    /// SHA-256 (hex) of the snapshot's JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if a header or value cannot be encoded as JSON.
    pub fn digest(&self) -> Result<String> {
        let canonical = serde_json::to_vec(&self.sections)?;
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        Ok(hex::encode(hasher.finalize()))
    }
}

impl<I, H, V> Default for Snapshot<I, H, V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<I, H, V> From<Vec<Section<I, H, V>>> for Snapshot<I, H, V> {
    fn from(sections: Vec<Section<I, H, V>>) -> Self {
        Self::new(sections)
    }
}

impl<I, H, V> FromIterator<Section<I, H, V>> for Snapshot<I, H, V> {
    fn from_iter<T: IntoIterator<Item = Section<I, H, V>>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a, I, H, V> IntoIterator for &'a Snapshot<I, H, V> {
    type Item = &'a Section<I, H, V>;
    type IntoIter = std::slice::Iter<'a, Section<I, H, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}
