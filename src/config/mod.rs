// src/config/mod.rs

//! TOML pipeline files: the serde model, loading, and validation.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_str};
pub use model::{PipelineFile, PipelineSection, RawPipelineFile, StageConfig, StageKind};
