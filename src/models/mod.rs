//! Core data models for project migration

pub mod project;
pub mod diagnostic;
pub mod component;
pub mod route;
pub mod conversion;

pub use project::*;
pub use diagnostic::*;
pub use component::*;
pub use route::*;
pub use conversion::*;
