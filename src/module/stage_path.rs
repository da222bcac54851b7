// src/module/stage_path.rs

use std::fmt;

/// Hierarchical address of a stage, e.g. `1.2.3`.
///
/// Only used to attribute log events; it carries no ownership or ordering
/// semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StagePath {
    indices: Vec<u32>,
}

impl StagePath {
    /// The empty path, used for modules run outside any stage tree.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(indices: impl Into<Vec<u32>>) -> Self {
        Self {
            indices: indices.into(),
        }
    }

    /// Address of the `index`-th child of this stage.
    pub fn child(&self, index: u32) -> Self {
        let mut indices = self.indices.clone();
        indices.push(index);
        Self { indices }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

impl fmt::Display for StagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.indices.is_empty() {
            return f.write_str("-");
        }
        for (i, index) in self.indices.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}
