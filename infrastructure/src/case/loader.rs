use consult_domain::case::normalize_linked;
use consult_domain::{CaseRecord, ImageRecognition, LinkedConsultation};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors from reading a case file
#[derive(Error, Debug)]
pub enum CaseFileError {
    #[error("Failed to read case file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported case file extension: {0} (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),
}

/// On-disk case file layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseFile {
    pub name: String,
    pub gender: String,
    pub age: Option<u32>,
    pub past_history: String,
    pub current_problem: String,
    pub image_recognition_result: String,
    pub image_recognitions: Vec<ImageRecognition>,
    pub linked_consultations: Vec<LinkedConsultation>,
}

impl CaseFile {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Normalise into a case record and its linked consultations.
    ///
    /// Recognition items get their status resolved and the aggregated text
    /// rebuilt; linked consultations get ids and names. Patient identity
    /// missing from the case is copied from the first linked consultation.
    pub fn into_parts(self) -> (CaseRecord, Vec<LinkedConsultation>) {
        let mut case = CaseRecord {
            name: self.name.trim().to_string(),
            gender: self.gender.trim().to_string(),
            age: self.age,
            past_history: self.past_history,
            current_problem: self.current_problem,
            image_recognition_result: self.image_recognition_result,
            image_recognitions: Vec::new(),
        };
        case.set_image_recognitions(self.image_recognitions);

        let linked = normalize_linked(self.linked_consultations);
        if let Some(first) = linked.first() {
            case.adopt_patient_info(first);
        }
        (case, linked)
    }
}

/// Read and parse a case file (`.toml` or `.json`)
pub fn load_case_file(path: &Path) -> Result<CaseFile, CaseFileError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    let content = std::fs::read_to_string(path).map_err(|source| CaseFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = content.len(), "Loaded case file");

    match extension.as_deref() {
        Some("toml") => CaseFile::from_toml_str(&content).map_err(|source| CaseFileError::Toml {
            path: path.to_path_buf(),
            source,
        }),
        Some("json") => CaseFile::from_json_str(&content).map_err(|source| CaseFileError::Json {
            path: path.to_path_buf(),
            source,
        }),
        _ => Err(CaseFileError::UnsupportedFormat(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consult_domain::RecognitionStatus;

    #[test]
    fn test_toml_case_with_recognitions() {
        let file = CaseFile::from_toml_str(
            r#"
name = " Zhang San "
gender = "male"
age = 54
current_problem = "Chest tightness on exertion"
image_recognition_result = "stale text"

[[image_recognitions]]
name = "ecg.png"
result = "ST depression in V4-V6"

[[image_recognitions]]
name = "xray.png"
status = "recognizing"

[[image_recognitions]]
name = "blurry.png"
error = "unreadable"
"#,
        )
        .unwrap();

        let (case, linked) = file.into_parts();
        assert!(linked.is_empty());
        assert_eq!(case.name, "Zhang San");
        assert_eq!(case.age, Some(54));
        let statuses: Vec<_> = case
            .image_recognitions
            .iter()
            .map(|i| i.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                Some(RecognitionStatus::Success),
                Some(RecognitionStatus::Queued),
                Some(RecognitionStatus::Error),
            ]
        );
        assert_eq!(case.image_recognitions[1].id, "img-2");
        assert_eq!(
            case.image_recognition_result,
            "Image 1 (ecg.png): ST depression in V4-V6"
        );
    }

    #[test]
    fn test_aggregated_text_kept_without_successes() {
        let file = CaseFile {
            name: "A".into(),
            current_problem: "B".into(),
            image_recognition_result: "from an earlier pipeline".into(),
            image_recognitions: vec![ImageRecognition {
                name: "scan.png".into(),
                status: Some(RecognitionStatus::Queued),
                ..Default::default()
            }],
            ..Default::default()
        };

        let (case, _) = file.into_parts();
        assert_eq!(case.image_recognition_result, "from an earlier pipeline");
    }

    #[test]
    fn test_json_case_adopts_identity_from_linked() {
        let file = CaseFile::from_json_str(
            r#"{
                "current_problem": "Follow-up on blood pressure",
                "linked_consultations": [
                    {"patient_name": "Wang Wu", "patient_gender": "female", "patient_age": 61,
                     "final_summary": "Start amlodipine 5mg"},
                    {"id": "c-9", "consultation_name": "Initial visit"}
                ]
            }"#,
        )
        .unwrap();

        let (case, linked) = file.into_parts();
        assert_eq!(case.name, "Wang Wu");
        assert_eq!(case.gender, "female");
        assert_eq!(case.age, Some(61));
        assert_eq!(linked[0].id, "linked-1");
        assert_eq!(linked[0].consultation_name, "Linked consultation 1");
        assert_eq!(linked[1].id, "c-9");
    }

    #[test]
    fn test_load_case_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("case.json");
        std::fs::write(&json, r#"{"name": "A", "current_problem": "cough"}"#).unwrap();
        let toml = dir.path().join("case.toml");
        std::fs::write(&toml, "name = \"B\"\ncurrent_problem = \"fever\"\n").unwrap();
        let yaml = dir.path().join("case.yaml");
        std::fs::write(&yaml, "name: C").unwrap();

        assert_eq!(load_case_file(&json).unwrap().current_problem, "cough");
        assert_eq!(load_case_file(&toml).unwrap().name, "B");
        assert!(matches!(
            load_case_file(&yaml),
            Err(CaseFileError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            load_case_file(&dir.path().join("missing.json")),
            Err(CaseFileError::Io { .. })
        ));
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "name = ").unwrap();

        let err = load_case_file(&path).unwrap_err();
        assert!(matches!(err, CaseFileError::Toml { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }
}
