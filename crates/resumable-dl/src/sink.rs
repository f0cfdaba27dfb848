//! Local destination file: the only durable resume checkpoint

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncSeekExt, AsyncWriteExt, SeekFrom};

use crate::TransferError;

/// Writes chunks into the destination at absolute offsets.
///
/// The file is opened per write and released on every exit path. Existing
/// content outside the written region is never truncated, so the file length
/// is always a valid resume cursor.
#[derive(Debug, Clone)]
pub struct LocalSink {
    path: PathBuf,
}

impl LocalSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current length of the destination, 0 if it does not exist yet.
    pub async fn current_len(&self) -> Result<u64, TransferError> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_dir() => Err(TransferError::Disk(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("destination is a directory: {}", self.path.display()),
            ))),
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes `data` at `offset`, creating the file and parent directories if needed.
    ///
    /// Returns only after the bytes are flushed and synced to the file.
    pub async fn write_at(&self, offset: u64, data: &[u8]) -> Result<(), TransferError> {
        self.ensure_parent().await?;

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .await?;
        file.seek(SeekFrom::Start(offset)).await?;
        file.write_all(data).await?;
        file.flush().await?;
        file.sync_data().await?;
        Ok(())
    }

    /// Creates an empty destination if none exists. Leaves existing content untouched.
    pub async fn touch(&self) -> Result<(), TransferError> {
        self.ensure_parent().await?;
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .await?;
        Ok(())
    }

    async fn ensure_parent(&self) -> Result<(), TransferError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }
}
