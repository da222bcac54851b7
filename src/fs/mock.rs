// src/fs/mock.rs

//! In-memory filesystem with injectable failures.
//!
//! Directory children keep insertion order, which stands in for the
//! enumeration order of a real directory. Failures are registered per
//! operation and path; `Copy` failures are keyed on the *source* path.
//! A partial copy failure writes the first half of the source to the
//! destination before failing, like a stream cut off mid-transfer.

use std::collections::HashMap;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::FileSystem;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // List of child names
}

/// Operation kinds that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsOp {
    Read,
    Write,
    ReadDir,
    CreateDir,
    Copy,
    RemoveFile,
    RemoveDir,
}

#[derive(Debug, Clone, Copy)]
struct Fault {
    remaining: Option<u32>, // None = fail forever
    kind: ErrorKind,
    partial: bool,
}

impl Fault {
    /// Consume one failure, returning its kind if the fault is still armed.
    fn trip(&mut self) -> Option<ErrorKind> {
        match self.remaining {
            None => Some(self.kind),
            Some(0) => None,
            Some(ref mut n) => {
                *n -= 1;
                Some(self.kind)
            }
        }
    }
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<PathBuf, MockEntry>,
    faults: HashMap<(FsOp, PathBuf), Fault>,
    calls: HashMap<(FsOp, PathBuf), u32>,
}

#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<State>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut state = State::default();
        // Ensure root exists
        state
            .entries
            .insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let mut state = self.lock();
        insert_file(&mut state.entries, path.as_ref(), content.into());
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        ensure_dir_entry(&mut state.entries, path.as_ref());
    }

    /// Contents of a file, if the path holds one.
    pub fn file_contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.lock().entries.get(path.as_ref()) {
            Some(MockEntry::File(content)) => Some(content.clone()),
            _ => None,
        }
    }

    /// Make the next `times` calls of `op` on `path` fail with `kind`.
    pub fn fail(&self, op: FsOp, path: impl AsRef<Path>, times: u32, kind: ErrorKind) {
        self.lock().faults.insert(
            (op, path.as_ref().to_path_buf()),
            Fault {
                remaining: Some(times),
                kind,
                partial: false,
            },
        );
    }

    /// Make the next `times` copies from `source` write half of the file to
    /// the destination and then fail with `kind`.
    pub fn fail_partway(&self, source: impl AsRef<Path>, times: u32, kind: ErrorKind) {
        self.lock().faults.insert(
            (FsOp::Copy, source.as_ref().to_path_buf()),
            Fault {
                remaining: Some(times),
                kind,
                partial: true,
            },
        );
    }

    /// Make every call of `op` on `path` fail with `kind`.
    pub fn fail_always(&self, op: FsOp, path: impl AsRef<Path>, kind: ErrorKind) {
        self.lock().faults.insert(
            (op, path.as_ref().to_path_buf()),
            Fault {
                remaining: None,
                kind,
                partial: false,
            },
        );
    }

    /// How many times `op` was attempted on `path`, including failed attempts.
    pub fn calls(&self, op: FsOp, path: impl AsRef<Path>) -> u32 {
        self.lock()
            .calls
            .get(&(op, path.as_ref().to_path_buf()))
            .copied()
            .unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("mock filesystem lock poisoned")
    }

    /// Record the call and consume an injected fault if one is pending.
    fn enter(&self, op: FsOp, path: &Path) -> io::Result<MutexGuard<'_, State>> {
        let mut state = self.lock();
        let key = (op, path.to_path_buf());
        *state.calls.entry(key.clone()).or_insert(0) += 1;

        if let Some(fault) = state.faults.get_mut(&key).filter(|f| !f.partial) {
            if let Some(kind) = fault.trip() {
                return Err(injected(kind, op, path));
            }
        }
        Ok(state)
    }
}

fn injected(kind: ErrorKind, op: FsOp, path: &Path) -> io::Error {
    io::Error::new(kind, format!("injected {op:?} failure on {path:?}"))
}

fn parent_of(path: &Path) -> Option<&Path> {
    path.parent().map(|parent| {
        if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        }
    })
}

fn child_name(path: &Path) -> Option<String> {
    path.file_name().and_then(|n| n.to_str()).map(str::to_string)
}

fn insert_file(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path, content: Vec<u8>) {
    entries.insert(path.to_path_buf(), MockEntry::File(content));

    // Ensure parent directories exist implicitly for simplicity in this mock
    if let Some(parent) = parent_of(path) {
        ensure_dir_entry(entries, parent);
        link_child(entries, parent, path);
    }
}

fn link_child(entries: &mut HashMap<PathBuf, MockEntry>, parent: &Path, path: &Path) {
    if let (Some(MockEntry::Dir(children)), Some(name)) = (entries.get_mut(parent), child_name(path)) {
        if !children.contains(&name) {
            children.push(name);
        }
    }
}

fn unlink_child(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if let Some(parent) = parent_of(path) {
        if let (Some(MockEntry::Dir(children)), Some(name)) =
            (entries.get_mut(parent), child_name(path))
        {
            children.retain(|c| *c != name);
        }
    }
}

fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if entries.contains_key(path) {
        return;
    }
    entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    if let Some(parent) = parent_of(path) {
        if parent != path {
            // Avoid infinite loop at root
            ensure_dir_entry(entries, parent);
            link_child(entries, parent, path);
        }
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(ErrorKind::NotFound, format!("not found: {path:?}"))
}

#[async_trait]
impl FileSystem for MockFileSystem {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let state = self.enter(FsOp::Read, path)?;
        match state.entries.get(path) {
            Some(MockEntry::File(content)) => Ok(content.clone()),
            Some(MockEntry::Dir(_)) => Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("is a directory: {path:?}"),
            )),
            None => Err(not_found(path)),
        }
    }

    async fn write(&self, path: &Path, contents: &[u8], overwrite: bool) -> io::Result<()> {
        let mut state = self.enter(FsOp::Write, path)?;
        if !overwrite && state.entries.contains_key(path) {
            return Err(io::Error::new(
                ErrorKind::AlreadyExists,
                format!("already exists: {path:?}"),
            ));
        }
        insert_file(&mut state.entries, path, contents.to_vec());
        Ok(())
    }

    async fn exists(&self, path: &Path) -> bool {
        self.lock().entries.contains_key(path)
    }

    async fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::File(_)))
    }

    async fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::Dir(_)))
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let state = self.enter(FsOp::ReadDir, path)?;
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(not_found(path)),
        }
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.enter(FsOp::CreateDir, path)?;
        if let Some(MockEntry::File(_)) = state.entries.get(path) {
            return Err(io::Error::new(
                ErrorKind::AlreadyExists,
                format!("a file exists at {path:?}"),
            ));
        }
        ensure_dir_entry(&mut state.entries, path);
        Ok(())
    }

    async fn copy_file(&self, from: &Path, to: &Path, overwrite: bool) -> io::Result<u64> {
        let mut state = self.enter(FsOp::Copy, from)?;
        let content = match state.entries.get(from) {
            Some(MockEntry::File(content)) => content.clone(),
            _ => return Err(not_found(from)),
        };
        match parent_of(to).map(|p| state.entries.get(p)) {
            Some(Some(MockEntry::Dir(_))) => {}
            _ => return Err(not_found(to)),
        }
        match state.entries.get(to) {
            Some(MockEntry::Dir(_)) => {
                return Err(io::Error::new(
                    ErrorKind::InvalidInput,
                    format!("is a directory: {to:?}"),
                ));
            }
            Some(MockEntry::File(_)) if !overwrite => {
                return Err(io::Error::new(
                    ErrorKind::AlreadyExists,
                    format!("already exists: {to:?}"),
                ));
            }
            _ => {}
        }
        let partial = state
            .faults
            .get_mut(&(FsOp::Copy, from.to_path_buf()))
            .filter(|f| f.partial)
            .and_then(Fault::trip);
        if let Some(kind) = partial {
            let half = content[..content.len() / 2].to_vec();
            insert_file(&mut state.entries, to, half);
            return Err(injected(kind, FsOp::Copy, from));
        }
        let len = content.len() as u64;
        insert_file(&mut state.entries, to, content);
        Ok(len)
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut state = self.enter(FsOp::RemoveFile, path)?;
        if !matches!(state.entries.get(path), Some(MockEntry::File(_))) {
            return Err(not_found(path));
        }
        state.entries.remove(path);
        unlink_child(&mut state.entries, path);
        Ok(())
    }

    async fn remove_dir(&self, path: &Path) -> io::Result<()> {
        let mut state = self.enter(FsOp::RemoveDir, path)?;
        let empty = match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => children.is_empty(),
            _ => return Err(not_found(path)),
        };
        if !empty {
            return Err(io::Error::new(
                ErrorKind::DirectoryNotEmpty,
                format!("directory not empty: {path:?}"),
            ));
        }
        state.entries.remove(path);
        unlink_child(&mut state.entries, path);
        Ok(())
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.enter(FsOp::RemoveDir, path)?;
        if !matches!(state.entries.get(path), Some(MockEntry::Dir(_))) {
            return Err(not_found(path));
        }
        state.entries.retain(|p, _| !p.starts_with(path));
        unlink_child(&mut state.entries, path);
        Ok(())
    }
}
