//! Identity versus value comparison
//!
//! Reconciliation asks two different questions of every entity: "is this the
//! same entity as before?" and "did its content change?". They are kept as two
//! separate traits so an implementation can never answer one with the other.

use std::fmt::Display;
use std::hash::Hash;

/// An entity with a stable identity that persists across snapshots.
///
/// Two entities with equal identities are the same entity, even if every
/// other attribute differs.
pub trait Identifiable {
    /// Stable key. `Display` is used for diagnostics only.
    type Identity: Clone + Eq + Hash + Display;

    fn identity(&self) -> &Self::Identity;
}

/// Content equality for entities already known to share an identity.
pub trait ValueEq {
    /// Returns `true` if `other` carries the same content as `self`.
    fn value_eq(&self, other: &Self) -> bool;
}
