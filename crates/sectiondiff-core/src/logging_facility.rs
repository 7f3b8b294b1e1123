//! Logging for sectiondiff
//!
//! `tracing` is the only logging API used across the workspace. This module
//! owns subscriber setup ([`init`], once per process, always to stderr), the
//! boundary macros every operation uses, and an in-memory capture for tests.
//!
//! ```rust
//! use sectiondiff_core::logging_facility::{init, Profile};
//!
//! init(Profile::Production);
//! ```
//!
//! Boundary macros, each tagging `component`, `op` and `event`:
//!
//! - `log_op_start!(op, fields..)`
//! - `log_op_end!(op, duration_ms = .., fields..)`
//! - `log_op_error!(op, err, duration_ms = .., fields..)` where `err` converts
//!   into [`ExError`](crate::errors::ExError)

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
