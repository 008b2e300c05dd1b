//! # Roster Module
//!
//! The fixed list of expected participants, keyed by the QR payload each one
//! was photographed holding.
//!
//! The roster is built once per job and only read afterwards. Duplicate
//! payloads resolve last-write-wins, the same as inserting into a map in list
//! order.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One expected participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    /// Classroom label
    pub turma: String,
    #[serde(rename = "qrCode")]
    pub qr_code: String,
}

impl Participant {
    pub fn new(name: impl Into<String>, turma: impl Into<String>, qr_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            turma: turma.into(),
            qr_code: qr_code.into(),
        }
    }
}

/// A participant as it appears in a job file, before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipantEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub turma: Option<String>,
    #[serde(default, rename = "qrCode")]
    pub qr_code: Option<String>,
}

impl ParticipantEntry {
    /// Read a participants file without validating the entries
    pub fn load_all(path: &Path) -> Result<Vec<Self>, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn validate(self, index: usize) -> Result<Participant, ConfigError> {
        let missing = |field| ConfigError::ParticipantField { index, field };
        Ok(Participant {
            name: self.name.ok_or_else(|| missing("name"))?,
            turma: self.turma.ok_or_else(|| missing("turma"))?,
            qr_code: self.qr_code.ok_or_else(|| missing("qrCode"))?,
        })
    }
}

impl From<Participant> for ParticipantEntry {
    fn from(participant: Participant) -> Self {
        Self {
            name: Some(participant.name),
            turma: Some(participant.turma),
            qr_code: Some(participant.qr_code),
        }
    }
}

/// Payload → participant lookup
#[derive(Debug, Clone, Default)]
pub struct ParticipantRoster {
    by_code: HashMap<String, Participant>,
}

impl ParticipantRoster {
    /// Build a roster from already-validated participants
    pub fn from_participants(participants: impl IntoIterator<Item = Participant>) -> Self {
        let by_code = participants
            .into_iter()
            .map(|p| (p.qr_code.clone(), p))
            .collect();
        Self { by_code }
    }

    /// Validate raw entries and build a roster.
    ///
    /// Fails on an empty list or on the first entry missing a required field;
    /// positions in the error are 1-based.
    pub fn from_entries(entries: Vec<ParticipantEntry>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }

        let participants = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| entry.validate(i + 1))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_participants(participants))
    }

    /// Load a roster from a JSON array of `{name, turma, qrCode}` objects
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_entries(ParticipantEntry::load_all(path)?)
    }

    pub fn get(&self, qr_code: &str) -> Option<&Participant> {
        self.by_code.get(qr_code)
    }

    pub fn contains(&self, qr_code: &str) -> bool {
        self.by_code.contains_key(qr_code)
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.by_code.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_codes_keep_the_last_entry() {
        let roster = ParticipantRoster::from_participants(vec![
            Participant::new("Ana", "1A", "QR001"),
            Participant::new("Bruno", "1B", "QR001"),
        ]);

        assert_eq!(roster.len(), 1);
        assert_eq!(roster.get("QR001").unwrap().name, "Bruno");
    }

    #[test]
    fn empty_entries_are_rejected() {
        let err = ParticipantRoster::from_entries(vec![]).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyRoster));
    }

    #[test]
    fn missing_field_reports_one_based_position() {
        let entries: Vec<ParticipantEntry> = serde_json::from_str(
            r#"[{"name": "Ana", "turma": "1A", "qrCode": "QR001"},
                {"name": "Bruno", "qrCode": "QR002"}]"#,
        )
        .unwrap();

        let err = ParticipantRoster::from_entries(entries).unwrap_err();
        assert_eq!(err.to_string(), "Participant 2 missing field: turma");
    }

    #[test]
    fn participant_uses_camel_case_code_key() {
        let json = serde_json::to_string(&Participant::new("Ana", "1A", "QR001")).unwrap();
        assert!(json.contains("\"qrCode\":\"QR001\""));
    }
}
