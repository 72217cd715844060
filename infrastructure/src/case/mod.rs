//! Case file loading
//!
//! A case file holds the patient record and, optionally, earlier finished
//! consultations for the same patient. TOML and JSON are supported; the
//! format is chosen by file extension.

mod loader;

pub use loader::{CaseFile, CaseFileError, load_case_file};
