pub mod identity;
pub mod section;
pub mod snapshot;

pub use identity::{Identifiable, ValueEq};
pub use section::{Item, Section};
pub use snapshot::Snapshot;
