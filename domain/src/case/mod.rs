//! Patient case domain
//!
//! Case data consumed by the consultation: identity fields, free-text
//! history, aggregated image recognition text and linked consultations.

pub mod entities;
pub mod linked;

pub use entities::{CaseRecord, ImageRecognition, RecognitionStatus, summarize_recognitions};
pub use linked::{LinkedConsultation, normalize_linked};
