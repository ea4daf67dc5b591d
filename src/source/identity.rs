use std::fs::Metadata;
use std::io;
use std::path::Path;

/// Stable identity of the file being tailed.
///
/// Fixed for the lifetime of the process; only used to derive where the
/// offset side file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    base_name: String,
    identity: u64,
}

impl TrackedFile {
    pub fn new(base_name: impl Into<String>, identity: u64) -> Self {
        Self {
            base_name: base_name.into(),
            identity,
        }
    }

    /// Stat the file at `path` and capture its base name and inode.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        Ok(Self::from_metadata(path, &metadata))
    }

    pub fn from_metadata(path: &Path, metadata: &Metadata) -> Self {
        let base_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        Self {
            base_name,
            identity: get_inode(metadata),
        }
    }

    /// `{base_name}-{identity}.pos`
    pub fn offset_file_name(&self) -> String {
        format!("{}-{}.pos", self.base_name, self.identity)
    }
}

// Platform-specific inode retrieval
#[cfg(unix)]
fn get_inode(metadata: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.ino()
}

#[cfg(not(unix))]
fn get_inode(metadata: &Metadata) -> u64 {
    // No inode here; size and mtime at startup stand in for it
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    metadata.len().hash(&mut hasher);
    if let Ok(modified) = metadata.modified() {
        modified.hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_offset_file_name() {
        let tracked = TrackedFile::new("audit.log", 42);
        assert_eq!(tracked.offset_file_name(), "audit.log-42.pos");
    }

    #[test]
    fn test_from_path_uses_base_name() {
        let temp_file = NamedTempFile::new().unwrap();
        let tracked = TrackedFile::from_path(temp_file.path()).unwrap();

        let expected = temp_file
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        assert!(tracked
            .offset_file_name()
            .starts_with(&format!("{}-", expected)));
        assert!(!tracked.offset_file_name().contains('/'));
    }

    #[cfg(unix)]
    #[test]
    fn test_distinct_files_have_distinct_identity() {
        let a = NamedTempFile::new().unwrap();
        let b = NamedTempFile::new().unwrap();

        let tracked_a = TrackedFile::from_path(a.path()).unwrap();
        let tracked_b = TrackedFile::from_path(b.path()).unwrap();

        assert_ne!(tracked_a.offset_file_name(), tracked_b.offset_file_name());
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = TrackedFile::from_path(Path::new("/nonexistent/audit.log"));
        assert!(result.is_err());
    }
}
