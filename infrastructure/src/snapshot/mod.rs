//! Snapshot persistence
//!
//! [`JsonSnapshotWriter`] is a [`ConsultationObserver`] that writes every
//! committed snapshot to a JSON file, replacing the previous one. Together
//! with [`load_snapshot`] it lets a host restore a consultation view after a
//! restart.
//!
//! [`ConsultationObserver`]: consult_application::ConsultationObserver

mod json_writer;

pub use json_writer::{JsonSnapshotWriter, SnapshotError, load_snapshot};
