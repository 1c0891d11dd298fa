//! Shared type definitions for the pa11y dashboard.
//!
//! The remote pa11y-webservice owns every accessibility task and result. The
//! records in this crate mirror its JSON wire format so the client and the
//! dashboard agree on one set of types.
//!
//! # Modules
//!
//! - [`ids`] -- String-backed identifier wrappers for tasks and results
//! - [`enums`] -- Accessibility standards and issue severities
//! - [`structs`] -- Tasks, results, counts, and issues as returned by the service
//! - [`requests`] -- Payloads sent to the service when creating or editing tasks

pub mod enums;
pub mod ids;
pub mod requests;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{IssueType, Standard};
pub use ids::{ResultId, TaskId};
pub use requests::{NewTask, TaskEdits};
pub use structs::{Issue, ResultCount, Task, TaskResult};
