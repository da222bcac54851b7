// src/fs/mod.rs

//! Filesystem abstraction used by the finder and transfer engines.
//!
//! Operations return plain `std::io::Result` so that callers can tell an
//! `AlreadyExists` conflict apart from a transient failure and decide whether
//! a retry makes sense.

use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub mod mock;

/// Abstract filesystem interface.
#[async_trait]
pub trait FileSystem: Send + Sync + Debug {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Write `contents` to `path`. With `overwrite = false` an existing file
    /// fails with `ErrorKind::AlreadyExists`.
    async fn write(&self, path: &Path, contents: &[u8], overwrite: bool) -> io::Result<()>;

    async fn exists(&self, path: &Path) -> bool;
    async fn is_file(&self, path: &Path) -> bool;
    async fn is_dir(&self, path: &Path) -> bool;

    /// Return the entries of a directory as full paths, in enumeration order.
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Stream `from` into `to`, returning the number of bytes copied.
    ///
    /// With `overwrite = false` the destination is created exclusively and an
    /// existing file fails with `ErrorKind::AlreadyExists`.
    async fn copy_file(&self, from: &Path, to: &Path, overwrite: bool) -> io::Result<u64>;

    async fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove an empty directory.
    async fn remove_dir(&self, path: &Path) -> io::Result<()>;

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// Implementation backed by `tokio::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

#[async_trait]
impl FileSystem for RealFileSystem {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path).await
    }

    async fn write(&self, path: &Path, contents: &[u8], overwrite: bool) -> io::Result<()> {
        let mut file = open_for_write(path, overwrite).await?;
        file.write_all(contents).await?;
        file.flush().await?;
        Ok(())
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn is_file(&self, path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    async fn is_dir(&self, path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        let mut dir = fs::read_dir(path).await?;
        while let Some(entry) = dir.next_entry().await? {
            entries.push(entry.path());
        }
        Ok(entries)
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path).await
    }

    async fn copy_file(&self, from: &Path, to: &Path, overwrite: bool) -> io::Result<u64> {
        let mut source = fs::File::open(from).await?;
        let mut destination = open_for_write(to, overwrite).await?;
        let copied = tokio::io::copy(&mut source, &mut destination).await?;
        destination.flush().await?;
        Ok(copied)
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path).await
    }

    async fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path).await
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path).await
    }
}

async fn open_for_write(path: &Path, overwrite: bool) -> io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    options.open(path).await
}
