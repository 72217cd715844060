//! Infrastructure layer for consult-quorum
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: provider gateways, configuration and case
//! file loading, conversation logging and snapshot persistence.

pub mod case;
pub mod config;
pub mod logging;
pub mod providers;
pub mod snapshot;

// Re-export commonly used types
pub use case::{CaseFile, CaseFileError, load_case_file};
pub use config::{
    ConfigError, ConfigLoader, FileConfig, FileConsultationConfig, FileDoctorConfig,
    FileOutputConfig,
};
pub use logging::JsonlConversationLogger;
pub use providers::{HttpParticipantGateway, SimulatedGateway};
pub use snapshot::{JsonSnapshotWriter, SnapshotError, load_snapshot};
