//! Linked consultations
//!
//! Snapshots of earlier, finished consultations for the same patient. They
//! only contribute prompt context and are never mutated by the engine.

use serde::{Deserialize, Serialize};

/// Immutable snapshot of another finished consultation (Value Object)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedConsultation {
    pub id: String,
    pub consultation_name: String,
    pub patient_name: String,
    pub patient_gender: String,
    pub patient_age: Option<u32>,
    pub past_history: String,
    pub current_problem: String,
    pub image_recognition_result: String,
    pub final_summary: String,
    pub finished_at: Option<String>,
}

/// Fill missing identifiers and display names
pub fn normalize_linked(list: Vec<LinkedConsultation>) -> Vec<LinkedConsultation> {
    list.into_iter()
        .enumerate()
        .map(|(idx, mut item)| {
            if item.id.trim().is_empty() {
                item.id = format!("linked-{}", idx + 1);
            }
            if item.consultation_name.trim().is_empty() {
                item.consultation_name = format!("Linked consultation {}", idx + 1);
            }
            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_fills_missing_fields() {
        let list = normalize_linked(vec![
            LinkedConsultation::default(),
            LinkedConsultation {
                id: "consult-42".to_string(),
                consultation_name: "March follow-up".to_string(),
                ..Default::default()
            },
        ]);

        assert_eq!(list[0].id, "linked-1");
        assert_eq!(list[0].consultation_name, "Linked consultation 1");
        assert_eq!(list[1].id, "consult-42");
        assert_eq!(list[1].consultation_name, "March follow-up");
    }
}
