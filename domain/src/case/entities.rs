//! Patient case record
//!
//! The case is produced by the host (forms, image recognition pipeline) and
//! is read-only to the consultation engine once a consultation starts.

use super::linked::LinkedConsultation;
use crate::core::error::DomainError;
use crate::util::non_blank;
use serde::{Deserialize, Serialize};

/// Lifecycle of one image recognition item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognitionStatus {
    Queued,
    Recognizing,
    Success,
    Error,
}

/// One uploaded image and its recognised text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageRecognition {
    pub id: String,
    pub name: String,
    pub result: String,
    pub status: Option<RecognitionStatus>,
    pub error: String,
}

impl ImageRecognition {
    /// Resolve the effective status of an item loaded from storage.
    ///
    /// Items that were still in flight when stored go back to `Queued`;
    /// items without a status are inferred from their error/result fields.
    pub fn normalized_status(&self) -> RecognitionStatus {
        match self.status {
            Some(RecognitionStatus::Queued | RecognitionStatus::Recognizing) => {
                RecognitionStatus::Queued
            }
            Some(status) => status,
            None if !self.error.is_empty() => RecognitionStatus::Error,
            None if !self.result.is_empty() => RecognitionStatus::Success,
            None => RecognitionStatus::Queued,
        }
    }
}

/// Patient case data (Entity)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseRecord {
    pub name: String,
    pub gender: String,
    pub age: Option<u32>,
    pub past_history: String,
    pub current_problem: String,
    /// Aggregated text of all successful image recognitions
    pub image_recognition_result: String,
    pub image_recognitions: Vec<ImageRecognition>,
}

impl CaseRecord {
    pub fn new(name: impl Into<String>, current_problem: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            current_problem: current_problem.into(),
            ..Default::default()
        }
    }

    pub fn with_past_history(mut self, history: impl Into<String>) -> Self {
        self.past_history = history.into();
        self
    }

    /// Validate the fields required to start a consultation
    pub fn validate(&self) -> Result<(), DomainError> {
        if non_blank(&self.name).is_none() {
            return Err(DomainError::MissingPatientName);
        }
        if non_blank(&self.current_problem).is_none() {
            return Err(DomainError::MissingCurrentProblem);
        }
        Ok(())
    }

    /// Replace the image recognition items, normalising their status and
    /// rebuilding the aggregated text.
    ///
    /// When no item succeeded the existing aggregated text is kept.
    pub fn set_image_recognitions(&mut self, items: Vec<ImageRecognition>) {
        self.image_recognitions = items
            .into_iter()
            .enumerate()
            .map(|(idx, mut item)| {
                if item.id.is_empty() {
                    item.id = format!("img-{}", idx + 1);
                }
                item.status = Some(item.normalized_status());
                item
            })
            .collect();

        let summary = summarize_recognitions(&self.image_recognitions);
        if !summary.is_empty() {
            self.image_recognition_result = summary;
        }
    }

    /// Fill missing patient identity fields from a linked consultation
    pub fn adopt_patient_info(&mut self, linked: &LinkedConsultation) {
        if non_blank(&self.name).is_none() {
            self.name = linked.patient_name.trim().to_string();
        }
        if non_blank(&self.gender).is_none() {
            self.gender = linked.patient_gender.trim().to_string();
        }
        if self.age.is_none() {
            self.age = linked.patient_age;
        }
    }

    /// Author label for patient-submitted transcript entries
    pub fn patient_label(&self) -> String {
        match non_blank(&self.name) {
            Some(name) => format!("Patient ({name})"),
            None => "Patient".to_string(),
        }
    }
}

/// Render successful recognitions as `Image N (name): result` lines.
///
/// `N` is the 1-based position in the full list, so numbering stays stable
/// even when earlier items failed.
pub fn summarize_recognitions(items: &[ImageRecognition]) -> String {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| {
            item.normalized_status() == RecognitionStatus::Success && !item.result.is_empty()
        })
        .map(|(idx, item)| {
            let name = if item.name.is_empty() {
                String::new()
            } else {
                format!(" ({})", item.name)
            };
            format!("Image {}{}: {}", idx + 1, name, item.result)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
