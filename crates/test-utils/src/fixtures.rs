#![allow(dead_code)]

//! On-disk fixtures backed by `tempfile`.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Files of the standard source tree, relative path and contents.
pub const SOURCE_TREE: &[(&str, &str)] = &[
    ("TestFile1.txt", "first test file\n"),
    ("TestFile2.txt", "second test file, a little longer\n"),
    ("Sub/TestFile3.txt", "third\n"),
    ("Sub/Sub2/TestFile4.txt", "fourth file in the deepest directory\n"),
];

/// A temporary workspace with `source/` populated and `dest/` absent.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Workspace whose `source/` holds [`SOURCE_TREE`].
    pub fn with_source_tree() -> io::Result<Self> {
        let ws = Self::empty()?;
        for (relative, contents) in SOURCE_TREE {
            ws.write(Path::new("source").join(relative), contents)?;
        }
        Ok(ws)
    }

    pub fn empty() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn source(&self) -> PathBuf {
        self.root().join("source")
    }

    pub fn dest(&self) -> PathBuf {
        self.root().join("dest")
    }

    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a file below the workspace root, creating parents.
    pub fn write(&self, relative: impl AsRef<Path>, contents: &str) -> io::Result<PathBuf> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }
}

/// Every file below `root`, keyed by its path relative to `root`, with its
/// byte length.
pub fn tree_snapshot(root: &Path) -> io::Result<BTreeMap<PathBuf, u64>> {
    let mut out = BTreeMap::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            let meta = entry.metadata()?;
            if meta.is_dir() {
                pending.push(path);
            } else {
                let relative = path
                    .strip_prefix(root)
                    .map_err(|e| io::Error::other(e))?
                    .to_path_buf();
                out.insert(relative, meta.len());
            }
        }
    }
    Ok(out)
}

/// Expected snapshot of [`SOURCE_TREE`], optionally top-level files only.
pub fn expected_source_tree(recursive: bool) -> BTreeMap<PathBuf, u64> {
    SOURCE_TREE
        .iter()
        .filter(|(relative, _)| recursive || !relative.contains('/'))
        .map(|(relative, contents)| (PathBuf::from(relative), contents.len() as u64))
        .collect()
}
