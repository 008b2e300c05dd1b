//! Scoped workspace for intermediate JSON snapshots.
//!
//! The workspace lives in a temporary directory that is removed when the
//! workspace is dropped, on success and failure alike, unless it is kept.

use crate::error::ArtifactError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Recognizer output, in the detections file format
pub const DETECTION_SNAPSHOT: &str = "detection_results.json";
/// Grouping report
pub const GROUPING_SNAPSHOT: &str = "grouping_results.json";

pub struct ArtifactWorkspace {
    dir: TempDir,
}

impl ArtifactWorkspace {
    pub fn create() -> Result<Self, ArtifactError> {
        let dir = tempfile::Builder::new()
            .prefix("roster-sort-")
            .tempdir()
            .map_err(ArtifactError::Workspace)?;
        tracing::debug!(path = %dir.path().display(), "Created artifact workspace");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Serialize `value` as pretty JSON into `name` inside the workspace
    pub fn write_json<T: Serialize + ?Sized>(
        &self,
        name: &str,
        value: &T,
    ) -> Result<PathBuf, ArtifactError> {
        let path = self.dir.path().join(name);
        let json = serde_json::to_string_pretty(value).map_err(|e| ArtifactError::Write {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        fs::write(&path, json).map_err(|e| ArtifactError::Write {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(path)
    }

    /// Stop the directory from being removed and return where it is
    pub fn keep(self) -> PathBuf {
        self.dir.keep()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshots_are_removed_on_drop() {
        let workspace = ArtifactWorkspace::create().unwrap();
        let written = workspace
            .write_json(GROUPING_SNAPSHOT, &json!({"success": true}))
            .unwrap();
        let root = workspace.path().to_path_buf();
        assert!(written.exists());

        drop(workspace);

        assert!(!root.exists());
    }

    #[test]
    fn kept_workspace_survives() {
        let workspace = ArtifactWorkspace::create().unwrap();
        workspace
            .write_json(DETECTION_SNAPSHOT, &json!({"results": []}))
            .unwrap();

        let root = workspace.keep();

        let text = fs::read_to_string(root.join(DETECTION_SNAPSHOT)).unwrap();
        assert!(text.contains("\"results\""));
        fs::remove_dir_all(root).unwrap();
    }
}
