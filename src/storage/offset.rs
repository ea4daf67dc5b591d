use crate::source::identity::TrackedFile;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum OffsetError {
    #[error("failed to write offset file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, OffsetError>;

/// Durable copy of the byte offset consumed from a tracked file.
///
/// The side file holds a single newline-terminated integer and lives at
/// `{dir}/{base_name}-{identity}.pos`, so a rotated file that reuses the old
/// name never picks up the previous file's position.
#[derive(Debug)]
pub struct OffsetStore {
    path: PathBuf,
    last_written: Option<u64>,
}

impl OffsetStore {
    pub fn new(dir: &Path, tracked: &TrackedFile) -> Self {
        Self {
            path: dir.join(tracked.offset_file_name()),
            last_written: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted offset. Absent or unreadable files mean "start from 0".
    pub fn load(&self) -> u64 {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No offset file, starting from beginning");
                return 0;
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Offset file unreadable, starting from beginning"
                );
                return 0;
            }
        };

        let first_line = contents.lines().next().unwrap_or("").trim();
        match first_line.parse::<u64>() {
            Ok(offset) => {
                tracing::debug!(path = %self.path.display(), offset, "Loaded offset");
                offset
            }
            Err(_) => {
                tracing::warn!(
                    path = %self.path.display(),
                    contents = first_line,
                    "Offset file does not hold an integer, starting from beginning"
                );
                0
            }
        }
    }

    /// Overwrite the offset file with `offset`.
    ///
    /// Returns `Ok(false)` without touching disk when `offset` equals the last
    /// value this store wrote.
    pub fn store(&mut self, offset: u64) -> Result<bool> {
        if self.last_written == Some(offset) {
            return Ok(false);
        }

        self.write(offset).map_err(|source| OffsetError::Write {
            path: self.path.clone(),
            source,
        })?;
        self.last_written = Some(offset);

        tracing::debug!(path = %self.path.display(), offset, "Offset persisted");
        Ok(true)
    }

    fn write(&self, offset: u64) -> io::Result<()> {
        let mut file = File::create(&self.path)?;
        writeln!(file, "{}", offset)?;
        file.sync_all()
    }
}
