//! Append-only consultation transcript
//!
//! Entries are only ever appended, with two exceptions: the content of a
//! `doctor` entry grows while a reply is revealed, and the transient
//! "is typing" system entry is removed once the reply arrives.

use crate::core::error::DomainError;
use crate::participant::ParticipantId;
use serde::{Deserialize, Serialize};

/// Identifier of a transcript entry, unique within one transcript
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Kind and payload of a transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    /// Status or narration text
    System {
        content: String,
        #[serde(default, skip_serializing_if = "is_false")]
        transient: bool,
    },
    /// A participant's contribution, built up while it is revealed
    Doctor {
        doctor_id: ParticipantId,
        doctor_name: String,
        content: String,
    },
    /// Supplementary information submitted by the patient
    Patient { author: String, content: String },
    /// One cast vote
    VoteDetail {
        voter_id: ParticipantId,
        voter_name: String,
        target_id: ParticipantId,
        target_name: String,
        reason: String,
    },
    /// Outcome of a round's tally
    VoteResult { content: String },
}

impl EntryKind {
    pub fn system(content: impl Into<String>) -> Self {
        EntryKind::System {
            content: content.into(),
            transient: false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            EntryKind::System { .. } => "system",
            EntryKind::Doctor { .. } => "doctor",
            EntryKind::Patient { .. } => "patient",
            EntryKind::VoteDetail { .. } => "vote_detail",
            EntryKind::VoteResult { .. } => "vote_result",
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, EntryKind::System { transient: true, .. })
    }
}

/// A single transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: EntryId,
    #[serde(flatten)]
    pub kind: EntryKind,
}

impl TranscriptEntry {
    /// Author label and text, as rendered into prompts and reports
    pub fn speaker_and_text(&self) -> (String, String) {
        match &self.kind {
            EntryKind::System { content, .. } => ("System".to_string(), content.clone()),
            EntryKind::Doctor {
                doctor_name,
                content,
                ..
            } => (doctor_name.clone(), content.clone()),
            EntryKind::Patient { author, content } => (author.clone(), content.clone()),
            EntryKind::VoteDetail {
                voter_name,
                target_name,
                reason,
                ..
            } => (
                voter_name.clone(),
                format!("marked {target_name} as least convincing: {reason}"),
            ),
            EntryKind::VoteResult { content } => ("Vote result".to_string(), content.clone()),
        }
    }
}

/// Ordered discussion history (Entity)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    #[serde(default)]
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn get(&self, id: EntryId) -> Option<&TranscriptEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Append an entry and return a copy of it
    pub fn append(&mut self, kind: EntryKind) -> TranscriptEntry {
        self.next_id += 1;
        let entry = TranscriptEntry {
            id: EntryId(self.next_id),
            kind,
        };
        self.entries.push(entry.clone());
        entry
    }

    pub fn append_system(&mut self, content: impl Into<String>) -> TranscriptEntry {
        self.append(EntryKind::system(content))
    }

    /// Append a transient system entry that will later be removed
    pub fn append_transient(&mut self, content: impl Into<String>) -> TranscriptEntry {
        self.append(EntryKind::System {
            content: content.into(),
            transient: true,
        })
    }

    /// Remove a transient entry; other entries are never removed
    pub fn remove_transient(&mut self, id: EntryId) -> Option<TranscriptEntry> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.id == id && e.kind.is_transient())?;
        Some(self.entries.remove(idx))
    }

    /// Extend the content of a `doctor` entry
    pub fn extend_doctor_entry(&mut self, id: EntryId, chunk: &str) -> Result<(), DomainError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(DomainError::UnknownEntry(id.value()))?;
        match &mut entry.kind {
            EntryKind::Doctor { content, .. } => {
                content.push_str(chunk);
                Ok(())
            }
            _ => Err(DomainError::UnknownEntry(id.value())),
        }
    }

    /// Number of `doctor` entries
    pub fn doctor_entry_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.kind, EntryKind::Doctor { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor_entry(id: &str) -> EntryKind {
        EntryKind::Doctor {
            doctor_id: id.into(),
            doctor_name: format!("Dr. {id}"),
            content: String::new(),
        }
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut t = Transcript::new();
        let a = t.append_system("one");
        let b = t.append_system("two");
        assert!(b.id > a.id);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_remove_transient_only() {
        let mut t = Transcript::new();
        let kept = t.append_system("Round 1 begins");
        let typing = t.append_transient("Dr. a is typing...");

        assert!(t.remove_transient(kept.id).is_none());
        assert!(t.remove_transient(typing.id).is_some());
        assert_eq!(t.len(), 1);
        assert!(t.remove_transient(typing.id).is_none());
    }

    #[test]
    fn test_extend_doctor_entry() {
        let mut t = Transcript::new();
        let entry = t.append(doctor_entry("a"));
        t.extend_doctor_entry(entry.id, "Hel").unwrap();
        t.extend_doctor_entry(entry.id, "lo").unwrap();

        match &t.get(entry.id).unwrap().kind {
            EntryKind::Doctor { content, .. } => assert_eq!(content, "Hello"),
            other => panic!("unexpected entry: {other:?}"),
        }
    }

    #[test]
    fn test_extend_rejects_non_doctor_entries() {
        let mut t = Transcript::new();
        let sys = t.append_system("narration");
        assert!(t.extend_doctor_entry(sys.id, "x").is_err());
    }

    #[test]
    fn test_serialize_flattens_kind() {
        let mut t = Transcript::new();
        t.append(EntryKind::VoteResult {
            content: "no elimination".to_string(),
        });
        t.append_system("plain");
        let json = serde_json::to_value(&t).unwrap();
        let entries = json["entries"].as_array().unwrap();
        assert_eq!(entries[0]["type"], "vote_result");
        assert_eq!(entries[0]["id"], 1);
        assert!(entries[1].get("transient").is_none());

        let back: Transcript = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }
}
