//! The artifact under review and its scoped on-disk copy.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Source text under review plus a display name.
///
/// The engine only ever borrows an artifact; it is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Display name, usually a file name.
    pub name: String,
    /// The source text.
    pub content: String,
}

impl Artifact {
    /// Creates a new artifact.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Reads a UTF-8 file from disk, using its file name as the display name.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read or is not valid UTF-8.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self { name, content })
    }

    /// Returns the file extension of the display name, lowercased.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// Number of characters in the content.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// Returns true if the content is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// SHA-256 of the content, hex encoded.
    #[must_use]
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.content.as_bytes()))
    }

    /// Writes the content to a temporary file that lives as long as the guard.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the temporary file cannot be created or written.
    pub fn stage(&self) -> std::io::Result<StagedArtifact> {
        let suffix = self
            .extension()
            .map_or_else(|| ".txt".to_string(), |ext| format!(".{ext}"));
        let mut file = tempfile::Builder::new()
            .prefix("reviewflow-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(self.content.as_bytes())?;
        file.flush()?;
        debug!(artifact = %self.name, path = %file.path().display(), "Staged artifact");
        Ok(StagedArtifact { file: Some(file) })
    }
}

/// A temporary on-disk copy of an [`Artifact`].
///
/// The file is removed when the guard is dropped, whatever path the run took.
#[derive(Debug)]
pub struct StagedArtifact {
    file: Option<NamedTempFile>,
}

impl StagedArtifact {
    /// Path of the temporary file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(NamedTempFile::path)
    }

    /// Removes the file now instead of waiting for drop.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file could not be deleted.
    pub fn release(mut self) -> std::io::Result<()> {
        self.close()
    }

    fn close(&mut self) -> std::io::Result<()> {
        if let Some(file) = self.file.take() {
            let path: PathBuf = file.path().to_path_buf();
            file.close()?;
            debug!(path = %path.display(), "Released staged artifact");
        }
        Ok(())
    }
}

impl Drop for StagedArtifact {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to remove staged artifact: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_basics() {
        let artifact = Artifact::new("main.PY", "print('hi')\n");
        assert_eq!(artifact.extension(), Some("py".to_string()));
        assert_eq!(artifact.char_count(), 12);
        assert!(!artifact.is_blank());
        assert!(Artifact::new("x", "  \n").is_blank());
    }

    #[test]
    fn test_digest_is_stable() {
        let a = Artifact::new("a.py", "x = 1");
        let b = Artifact::new("b.py", "x = 1");
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.digest().len(), 64);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.go");
        std::fs::write(&path, "package main").unwrap();

        let artifact = Artifact::from_file(&path).unwrap();
        assert_eq!(artifact.name, "sample.go");
        assert_eq!(artifact.content, "package main");
    }

    #[test]
    fn test_staged_artifact_removed_on_drop() {
        let artifact = Artifact::new("code.py", "def f():\n    pass\n");
        let staged = artifact.stage().unwrap();
        let path = staged.path().unwrap().to_path_buf();

        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "py");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), artifact.content);

        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn test_staged_artifact_release() {
        let staged = Artifact::new("notes", "text").stage().unwrap();
        let path = staged.path().unwrap().to_path_buf();
        assert_eq!(path.extension().unwrap(), "txt");

        staged.release().unwrap();
        assert!(!path.exists());
    }
}
