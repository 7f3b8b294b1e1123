use sectiondiff_core_types::UpdateId;
use thiserror::Error;

/// Result type alias using SectionDiffError
pub type Result<T> = std::result::Result<T, SectionDiffError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and diagnostics emitted by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Reconciliation
    /// A snapshot holds two sections, or two items of one section, with the same identity
    StructuralInconsistency,
    /// A changeset does not describe the snapshot it is being applied to
    ChangesetMismatch,

    // Configuration
    InvalidConfig,

    // Integration/IO
    Io,
    Serialization,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::StructuralInconsistency => "ERR_STRUCTURAL_INCONSISTENCY",
            ExErrorKind::ChangesetMismatch => "ERR_CHANGESET_MISMATCH",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and context for
/// the external diagnostic channel.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    scope: Option<String>,
    update_id: Option<UpdateId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            scope: None,
            update_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add identity scope context ("section", "item in section `S1`")
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Add update correlation context
    pub fn with_update_id(mut self, update_id: UpdateId) -> Self {
        self.update_id = Some(update_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the identity scope context, if any
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Get the update correlation context, if any
    pub fn update_id(&self) -> Option<&UpdateId> {
        self.update_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(scope) = &self.scope {
            write!(f, " (scope: {})", scope)?;
        }
        if let Some(update_id) = &self.update_id {
            write!(f, " (update_id: {})", update_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Granularity at which a duplicate identity was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityScope {
    /// Two sections of one snapshot share an identity
    Section,
    /// Two items of the named section share an identity
    Item { section_id: String },
}

impl std::fmt::Display for IdentityScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityScope::Section => write!(f, "section"),
            IdentityScope::Item { section_id } => write!(f, "item in section `{}`", section_id),
        }
    }
}

/// Which argument of a diff a snapshot was passed as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSide {
    Initial,
    Final,
}

impl std::fmt::Display for SnapshotSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotSide::Initial => write!(f, "initial"),
            SnapshotSide::Final => write!(f, "final"),
        }
    }
}

/// The only failure the reconciler can produce: a duplicate identity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Structural inconsistency: duplicate {scope} identity `{identity}` in {side} snapshot")]
pub struct StructuralInconsistency {
    /// `Display` rendering of the offending identity
    pub identity: String,
    pub scope: IdentityScope,
    pub side: SnapshotSide,
}

/// Error taxonomy for sectiondiff operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SectionDiffError {
    #[error(transparent)]
    StructuralInconsistency(#[from] StructuralInconsistency),

    /// Changeset cannot be replayed onto the given snapshot
    #[error("Changeset does not match snapshot: {reason}")]
    ChangesetMismatch { reason: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },
}

impl From<SectionDiffError> for ExError {
    fn from(err: SectionDiffError) -> Self {
        match err {
            SectionDiffError::StructuralInconsistency(inner) => inner.into(),

            SectionDiffError::ChangesetMismatch { reason } => {
                ExError::new(ExErrorKind::ChangesetMismatch)
                    .with_op("apply")
                    .with_message(reason)
            }

            SectionDiffError::InvalidConfig { reason } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(reason)
            }

            SectionDiffError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            SectionDiffError::Io { message } => ExError::new(ExErrorKind::Io).with_message(message),
        }
    }
}

impl From<StructuralInconsistency> for ExError {
    fn from(err: StructuralInconsistency) -> Self {
        let message = err.to_string();
        ExError::new(ExErrorKind::StructuralInconsistency)
            .with_op("diff")
            .with_entity_id(err.identity)
            .with_scope(err.scope.to_string())
            .with_message(message)
    }
}

impl From<serde_json::Error> for SectionDiffError {
    fn from(err: serde_json::Error) -> Self {
        SectionDiffError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SectionDiffError {
    fn from(err: toml::de::Error) -> Self {
        SectionDiffError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for SectionDiffError {
    fn from(err: std::io::Error) -> Self {
        SectionDiffError::Io {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (
                ExErrorKind::StructuralInconsistency,
                "ERR_STRUCTURAL_INCONSISTENCY",
            ),
            (ExErrorKind::ChangesetMismatch, "ERR_CHANGESET_MISMATCH"),
            (ExErrorKind::InvalidConfig, "ERR_INVALID_CONFIG"),
            (ExErrorKind::Serialization, "ERR_SERIALIZATION"),
            (ExErrorKind::Io, "ERR_IO"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_structural_inconsistency_message_names_scope_and_side() {
        let err = StructuralInconsistency {
            identity: "a".to_string(),
            scope: IdentityScope::Item {
                section_id: "S1".to_string(),
            },
            side: SnapshotSide::Final,
        };

        assert_eq!(
            err.to_string(),
            "Structural inconsistency: duplicate item in section `S1` identity `a` in final snapshot"
        );
    }

    #[test]
    fn test_ex_error_display_includes_context() {
        let err = ExError::new(ExErrorKind::InvalidConfig)
            .with_op("load_config")
            .with_message("fade_delete_ms must be positive");

        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_INVALID_CONFIG]"));
        assert!(rendered.contains("load_config"));
        assert!(rendered.contains("fade_delete_ms"));
    }

    #[test]
    fn test_every_kind_has_a_distinct_code() {
        // GIVEN every error kind
        let kinds = [
            ExErrorKind::StructuralInconsistency,
            ExErrorKind::ChangesetMismatch,
            ExErrorKind::InvalidConfig,
            ExErrorKind::Io,
            ExErrorKind::Serialization,
        ];

        // WHEN their codes are collected
        let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.code()).collect();

        // THEN no two kinds share a code
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_ex_error_is_a_leaf_error() {
        // GIVEN an error converted from an io failure
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let ex = ExError::from(SectionDiffError::from(io));

        // THEN it carries the io kind and exposes no chained source
        assert_eq!(ex.kind(), ExErrorKind::Io);
        assert!(std::error::Error::source(&ex).is_none());
    }
}
