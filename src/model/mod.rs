//! Snapshot records and the closed vocabularies used to classify them.

pub mod project;
pub mod task;

pub use project::{ProjectSnapshot, ProjectStatus, ProjectSubmission};
pub use task::{Priority, TaskSnapshot, TaskStatus, TaskSubmission};
