// src/pipeline/mod.rs

//! Sequential execution of a loaded pipeline file. There is no dependency
//! graph: stages run in the order they appear in the file.

pub mod runner;

pub use runner::{PipelineReport, PipelineRunner, StageOutcome, StageReport};
