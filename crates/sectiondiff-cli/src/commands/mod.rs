pub mod diff;
pub mod replay;

use std::path::Path;

use sectiondiff_core::errors::SectionDiffError;
use sectiondiff_core::Snapshot;
use serde_json::Value;

/// Snapshot as read from disk: string identities, arbitrary JSON headers and values
pub type JsonSnapshot = Snapshot<String, Value, Value>;

/// Read a snapshot file (`[{ "id", "header", "items": [{ "id", "value" }] }]`)
pub fn load_snapshot(path: &Path) -> Result<JsonSnapshot, SectionDiffError> {
    let source = std::fs::read_to_string(path).map_err(|e| SectionDiffError::Io {
        message: format!("{}: {}", path.display(), e),
    })?;
    serde_json::from_str(&source).map_err(|e| SectionDiffError::Serialization {
        message: format!("{}: {}", path.display(), e),
    })
}
