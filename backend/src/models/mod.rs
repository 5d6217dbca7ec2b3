//! Domain models for the project configuration

pub mod point;
pub mod project;
pub mod stack;

// Re-exports
pub use point::Point3;
pub use project::{BackendType, ProjectConfiguration};
pub use stack::{StackDescription, StackType};
