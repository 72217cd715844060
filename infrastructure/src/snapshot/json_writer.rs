use consult_application::ConsultationObserver;
use consult_domain::ConsultationSnapshot;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to access snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid snapshot {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Writes the latest consultation snapshot to a JSON file.
///
/// The file is replaced atomically (write to a sibling temp file, then
/// rename), so readers never see a half-written snapshot. Failures are
/// logged and otherwise ignored.
pub struct JsonSnapshotWriter {
    path: PathBuf,
    /// Serialises writers so the rename order matches the snapshot order
    lock: Mutex<()>,
}

impl JsonSnapshotWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `snapshot` now
    pub fn write(&self, snapshot: &ConsultationSnapshot) -> Result<(), SnapshotError> {
        let io_err = |source| SnapshotError::Io {
            path: self.path.clone(),
            source,
        };
        let json = serde_json::to_vec_pretty(snapshot).map_err(|source| SnapshotError::Json {
            path: self.path.clone(),
            source,
        })?;

        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        debug!(path = %self.path.display(), bytes = json.len(), "Snapshot written");
        Ok(())
    }
}

impl ConsultationObserver for JsonSnapshotWriter {
    fn on_snapshot(&self, snapshot: &ConsultationSnapshot) {
        if let Err(e) = self.write(snapshot) {
            warn!("{}", e);
        }
    }
}

/// Read a snapshot written by [`JsonSnapshotWriter`]
pub fn load_snapshot(path: &Path) -> Result<ConsultationSnapshot, SnapshotError> {
    let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SnapshotError::Json {
        path: path.to_path_buf(),
        source,
    })
}
