use std::fs;
use std::path::{Path, PathBuf};

use crate::client::blob::BlobHandle;

/// Destination for downloaded stickers.
pub trait DownloadSink: Send + Sync {
    fn save(&self, blob: &BlobHandle, filename: &str) -> std::io::Result<()>;
}

/// Saves downloads as files in a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        // Only the final component is kept.
        let name = Path::new(filename)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "sticker".into());
        self.dir.join(name)
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, blob: &BlobHandle, filename: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(filename);
        fs::write(&path, blob.data())?;
        log::info!("Saved {} ({} bytes)", path.display(), blob.data().len());
        Ok(())
    }
}
