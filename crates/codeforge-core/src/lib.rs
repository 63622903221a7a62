//! Layered skeleton-then-detail code generation: turn a natural-language
//! requirement and a `FileSpec` list into a multi-file project, with
//! cross-file contract extraction, validation, and repair running between
//! layers.

pub mod assembly;
pub mod config_gen;
pub mod contracts;
pub mod coordinator;
pub mod dependency;
pub mod detail;
pub mod error;
pub mod model;
pub mod skeleton;

pub use coordinator::{Coordinator, CoordinatorConfig};
pub use error::{Error, Result};
pub use model::{
    Dependencies, FileMetadata, FileSpec, GeneratedFile, GenerationMethod, GenerationResult,
    ProjectConfig, ProjectSpec, RunMetadata, Setup, Skeletons,
};
