//! Structured logging vocabulary
//!
//! Field keys the test capture layer promotes to typed fields, and the values
//! of the `event` field written by the logging macros.

// Present on every boundary event
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";

/// Correlates all events of one coordinator update (event field and span field)
pub const FIELD_UPDATE_ID: &str = "update_id";

// Values of FIELD_EVENT
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
