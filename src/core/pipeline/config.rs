//! Job description loading and validation.

use crate::core::roster::{ParticipantEntry, ParticipantRoster};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobOptions {
    /// Leave the intermediate snapshots on disk after the run
    #[serde(default)]
    pub keep_artifacts: bool,
}

/// A job file as written by the host, before validation.
///
/// Unknown keys are ignored so hosts can carry their own settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub source_folder: Option<PathBuf>,
    #[serde(default)]
    pub destination_folder: Option<PathBuf>,
    /// Recognizer output to replay instead of scanning the source folder
    #[serde(default)]
    pub detections_file: Option<PathBuf>,
    #[serde(default)]
    pub participants: Option<Vec<ParticipantEntry>>,
    #[serde(default)]
    pub options: JobOptions,
}

/// A job that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedJob {
    pub source_folder: PathBuf,
    pub destination_folder: Option<PathBuf>,
    pub detections_file: Option<PathBuf>,
    pub roster: ParticipantRoster,
    pub options: JobOptions,
}

impl JobConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check the job in this order: required fields, source folder on disk,
    /// then the roster.
    pub fn validate(&self) -> Result<ValidatedJob, ConfigError> {
        let source_folder = self
            .source_folder
            .clone()
            .ok_or(ConfigError::MissingField("source_folder"))?;
        let participants = self
            .participants
            .clone()
            .ok_or(ConfigError::MissingField("participants"))?;

        if !source_folder.exists() {
            return Err(ConfigError::SourceFolderMissing {
                path: source_folder,
            });
        }

        let roster = ParticipantRoster::from_entries(participants)?;

        Ok(ValidatedJob {
            source_folder,
            destination_folder: self
                .destination_folder
                .clone()
                .filter(|p| !p.as_os_str().is_empty()),
            detections_file: self.detections_file.clone(),
            roster,
            options: self.options.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn job(source: &Path, participants: &str) -> JobConfig {
        serde_json::from_str(&format!(
            r#"{{"source_folder": {:?}, "participants": {}, "options": {{"verbose": true}}}}"#,
            source.display().to_string(),
            participants
        ))
        .unwrap()
    }

    #[test]
    fn missing_required_field_is_named() {
        let config: JobConfig = serde_json::from_str(r#"{"participants": []}"#).unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: source_folder");

        let temp = TempDir::new().unwrap();
        let mut config = job(temp.path(), "[]");
        config.participants = None;
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "Missing required field: participants"
        );
    }

    #[test]
    fn source_folder_must_exist() {
        let temp = TempDir::new().unwrap();
        let config = job(&temp.path().join("nope"), r#"[{"name":"A","turma":"1","qrCode":"Q"}]"#);

        assert!(matches!(
            config.validate(),
            Err(ConfigError::SourceFolderMissing { .. })
        ));
    }

    #[test]
    fn roster_problems_surface_in_order() {
        let temp = TempDir::new().unwrap();

        let empty = job(temp.path(), "[]");
        assert_eq!(
            empty.validate().unwrap_err().to_string(),
            "Participants list is empty"
        );

        let partial = job(
            temp.path(),
            r#"[{"name":"A","turma":"1","qrCode":"Q"},{"name":"B","qrCode":"R"}]"#,
        );
        assert_eq!(
            partial.validate().unwrap_err().to_string(),
            "Participant 2 missing field: turma"
        );
    }

    #[test]
    fn valid_job_builds_roster_and_ignores_unknown_options() {
        let temp = TempDir::new().unwrap();
        let config = job(temp.path(), r#"[{"name":"A","turma":"1","qrCode":"Q"}]"#);

        let validated = config.validate().unwrap();

        assert_eq!(validated.roster.len(), 1);
        assert!(validated.destination_folder.is_none());
        assert!(!validated.options.keep_artifacts);
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("job.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JobConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("job.json"));
    }
}
