use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::error::Result;
use crate::observability::metrics::get_metrics;
use crate::utils::constants::{GROUP_CURSOR_FILE, USER_CURSOR_FILE};

/// Bookmark file per paginated collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorFile {
    Users,
    Groups,
}

impl CursorFile {
    pub fn file_name(&self) -> &'static str {
        match self {
            CursorFile::Users => USER_CURSOR_FILE,
            CursorFile::Groups => GROUP_CURSOR_FILE,
        }
    }
}

/// Last-seen pagination cursor as plain text, one file per collection.
/// Writes truncate; there is no coordination between concurrent writers.
#[derive(Debug, Clone)]
pub struct CursorStore {
    dir: PathBuf,
}

impl CursorStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file: CursorFile) -> PathBuf {
        self.dir.join(file.file_name())
    }

    pub async fn write(&self, file: CursorFile, cursor: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path(file);
        tokio::fs::write(&path, cursor.as_bytes())
            .await
            .inspect_err(|err| error!("cursor: write '{}' failed: {}", path.display(), err))?;

        debug!("cursor: stored in '{}'", path.display());
        get_metrics()
            .await
            .cursor_writes
            .with_label_values(&[file.file_name()])
            .inc();
        Ok(())
    }

    /// Last stored cursor; `None` when nothing was stored yet.
    pub async fn read(&self, file: CursorFile) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path(file)).await {
            Ok(content) if content.is_empty() => Ok(None),
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
