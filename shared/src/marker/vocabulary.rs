use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::marker::keys;

/// Latest vocabulary layout this crate understands
pub const CURRENT_VOCABULARY_VERSION: u32 = 1;

/// Errors raised when a configured vocabulary cannot be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VocabularyError {
    #[error("Marker vocabulary version {found} is not supported (supported: 1..={supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Marker vocabulary entry in `{list}` has an empty {field}")]
    EmptyEntry {
        list: &'static str,
        field: &'static str,
    },

    #[error("Marker vocabulary label `{label}` is declared more than once")]
    DuplicateLabel { label: String },
}

// RecognizedMarker
/// A persisted-data key belonging to the cooperating subsystem's
/// revival/corpse/grave vocabulary, reported as `tag:<label>` when present
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedMarker {
    pub key: String,
    pub label: String,
}

impl RecognizedMarker {
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

// MarkerVocabulary
/// The declared interoperability contract with the cooperating subsystem:
/// every marker key, kind fragment and tag the core recognizes on objects it
/// does not own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerVocabulary {
    pub version: u32,
    /// Keys that each contribute a `tag:<label>` heuristic flag
    pub orphan_markers: Vec<RecognizedMarker>,
    /// Keys that identify a freshly created object as a revival clone
    pub detection_keys: Vec<String>,
    /// Substrings of an object kind that identify a revival clone, matched
    /// without regard to case
    pub kind_fragments: Vec<String>,
    /// Keys holding the owner identity of a clone, checked in order
    pub owner_keys: Vec<String>,
    /// Tags marking an object whose death must never reach corpse/grave handling
    pub death_block_tags: Vec<String>,
}

impl Default for MarkerVocabulary {
    fn default() -> Self {
        Self {
            version: CURRENT_VOCABULARY_VERSION,
            orphan_markers: vec![
                RecognizedMarker::new("HardcoreRevival", "hardcore_revival"),
                RecognizedMarker::new("revival", "revival"),
                RecognizedMarker::new("corpse", "corpse"),
                RecognizedMarker::new("grave", "grave"),
                RecognizedMarker::new(keys::IS_REVIVAL_CLONE, "is_revival_clone"),
                RecognizedMarker::new("HCRevivalFixClone", "hc_revival_fix_clone"),
            ],
            detection_keys: to_strings(&[
                "HardcoreRevival",
                "is_downed",
                "isRevivalClone",
                "downed",
                "revive_clone",
            ]),
            kind_fragments: to_strings(&["reviv", "hardcorerevival"]),
            owner_keys: to_strings(&["OwnerUUID", "PlayerUUID"]),
            death_block_tags: to_strings(&["revival_in_progress"]),
        }
    }
}

impl MarkerVocabulary {
    /// Checks the vocabulary can be used as-is
    pub fn validate(&self) -> Result<(), VocabularyError> {
        if self.version == 0 || self.version > CURRENT_VOCABULARY_VERSION {
            return Err(VocabularyError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_VOCABULARY_VERSION,
            });
        }

        let mut labels: Vec<&str> = Vec::with_capacity(self.orphan_markers.len());
        for marker in &self.orphan_markers {
            if marker.key.is_empty() {
                return Err(VocabularyError::EmptyEntry {
                    list: "orphan_markers",
                    field: "key",
                });
            }
            if marker.label.is_empty() {
                return Err(VocabularyError::EmptyEntry {
                    list: "orphan_markers",
                    field: "label",
                });
            }
            if labels.contains(&marker.label.as_str()) {
                return Err(VocabularyError::DuplicateLabel {
                    label: marker.label.clone(),
                });
            }
            labels.push(&marker.label);
        }

        check_non_empty("detection_keys", &self.detection_keys)?;
        check_non_empty("kind_fragments", &self.kind_fragments)?;
        check_non_empty("owner_keys", &self.owner_keys)?;
        check_non_empty("death_block_tags", &self.death_block_tags)?;

        Ok(())
    }

    /// Whether `kind` (an object's registry key) contains any clone kind fragment
    pub fn kind_matches(&self, kind: &str) -> bool {
        let kind = kind.to_lowercase();
        self.kind_fragments
            .iter()
            .any(|fragment| kind.contains(&fragment.to_lowercase()))
    }
}

fn check_non_empty(list: &'static str, entries: &[String]) -> Result<(), VocabularyError> {
    if entries.iter().any(String::is_empty) {
        return Err(VocabularyError::EmptyEntry { list, field: "key" });
    }
    Ok(())
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
