//! High-score persistence.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use log::{debug, warn};

use crate::error::HighScoreError;

/// Where the best score lives between sessions.
pub trait HighScoreStore {
    /// Stored best score; 0 when nothing usable is stored.
    fn load(&self) -> u32;

    fn save(&mut self, score: u32) -> Result<(), HighScoreError>;
}

/// Plain-text file holding a single integer.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `high_score.txt` under the platform data directory.
    pub fn in_data_dir() -> Result<Self, HighScoreError> {
        let dirs = ProjectDirs::from("", "", "worm-game").ok_or(HighScoreError::NoDataDir)?;
        Ok(Self::new(dirs.data_dir().join("high_score.txt")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<u32, HighScoreError> {
        let content = fs::read_to_string(&self.path).map_err(|source| HighScoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        content
            .trim()
            .parse()
            .map_err(|_| HighScoreError::Malformed {
                path: self.path.clone(),
                content,
            })
    }
}

impl HighScoreStore for FileStore {
    fn load(&self) -> u32 {
        match self.read() {
            Ok(score) => score,
            Err(HighScoreError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                debug!("no high score at {}", self.path.display());
                0
            }
            Err(e) => {
                warn!("ignoring stored high score: {e}");
                0
            }
        }
    }

    fn save(&mut self, score: u32) -> Result<(), HighScoreError> {
        let io_err = |source| HighScoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(io_err)?;
            }
        }
        fs::write(&self.path, score.to_string()).map_err(io_err)
    }
}

/// Keeps the best score in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub best: u32,
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> u32 {
        self.best
    }

    fn save(&mut self, score: u32) -> Result<(), HighScoreError> {
        self.best = score;
        Ok(())
    }
}
