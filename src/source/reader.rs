use crate::source::identity::TrackedFile;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// One consumed line, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    /// Byte offset of the first byte of the line.
    pub start_offset: u64,
    /// Bytes consumed, terminator included.
    pub len: u64,
}

/// Sequential line reader over the tracked file that counts consumed bytes.
pub struct LineReader {
    path: PathBuf,
    tracked: TrackedFile,
    file: BufReader<File>,
    current_offset: u64,
    follow: bool,
    buf: Vec<u8>,
}

impl LineReader {
    /// Open `path` at offset 0.
    ///
    /// With `follow` set, a trailing line without a newline is treated as still
    /// being written and left for a later call.
    pub fn open(path: &Path, follow: bool) -> Result<Self, ReaderError> {
        let file = File::open(path).map_err(|source| ReaderError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let metadata = file.metadata()?;
        let tracked = TrackedFile::from_metadata(path, &metadata);

        Ok(Self {
            path: path.to_path_buf(),
            tracked,
            file: BufReader::new(file),
            current_offset: 0,
            follow,
            buf: Vec::new(),
        })
    }

    /// Seek to a previously consumed offset.
    ///
    /// An offset past the end of the file cannot belong to this file's
    /// contents; reading restarts from 0 in that case. Returns the offset
    /// actually in effect.
    pub fn seek_to(&mut self, offset: u64) -> Result<u64, ReaderError> {
        let file_len = self.file.get_ref().metadata()?.len();
        let target = if offset > file_len {
            tracing::warn!(
                path = %self.path.display(),
                offset,
                file_len,
                "Stored offset is past end of file, reading from beginning"
            );
            0
        } else {
            offset
        };

        self.file.seek(SeekFrom::Start(target))?;
        self.current_offset = target;
        Ok(target)
    }

    /// Read the next complete line, or `None` when no more is available right now.
    pub fn next_line(&mut self) -> Result<Option<Line>, ReaderError> {
        self.buf.clear();
        let bytes_read = self.file.read_until(b'\n', &mut self.buf)?;

        if bytes_read == 0 {
            return Ok(None);
        }

        if self.follow && !self.buf.ends_with(b"\n") {
            // Partial line: rewind so the next poll sees it whole
            self.file.seek(SeekFrom::Start(self.current_offset))?;
            return Ok(None);
        }

        let start_offset = self.current_offset;
        self.current_offset += bytes_read as u64;

        let mut content: &[u8] = &self.buf;
        if let Some(stripped) = content.strip_suffix(b"\n") {
            content = stripped;
        }
        if let Some(stripped) = content.strip_suffix(b"\r") {
            content = stripped;
        }

        Ok(Some(Line {
            text: String::from_utf8_lossy(content).into_owned(),
            start_offset,
            len: bytes_read as u64,
        }))
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.current_offset
    }

    pub fn tracked(&self) -> &TrackedFile {
        &self.tracked
    }
}
