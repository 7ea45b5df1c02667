#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

#[cfg(not(target_arch = "wasm32"))]
use crate::errors::CoreError;
#[cfg(not(target_arch = "wasm32"))]
use crate::models::snapshot::DatabaseSnapshot;

/// Moves exported database snapshots between the backend and local disk.
///
/// The bytes are written and read back untouched; on wasm32 the browser
/// handles the download/upload instead.
pub struct SnapshotStore;

impl SnapshotStore {
    /// Write the snapshot to `path` (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(
        snapshot: &DatabaseSnapshot,
        path: impl AsRef<Path>,
    ) -> Result<(), CoreError> {
        std::fs::write(path.as_ref(), &snapshot.bytes)?;
        tracing::info!(
            "saved {} byte snapshot of entry {} to {}",
            snapshot.len(),
            snapshot.entry_id,
            path.as_ref().display()
        );
        Ok(())
    }

    /// Write the snapshot into `dir` under its own file name (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_dir(
        snapshot: &DatabaseSnapshot,
        dir: impl AsRef<Path>,
    ) -> Result<PathBuf, CoreError> {
        let path = dir.as_ref().join(&snapshot.file_name);
        Self::save_to_file(snapshot, &path)?;
        Ok(path)
    }

    /// Read a snapshot file picked for import into `entry_id` (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(
        path: impl AsRef<Path>,
        entry_id: &str,
    ) -> Result<DatabaseSnapshot, CoreError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        if bytes.is_empty() {
            return Err(CoreError::FileIO(format!("{} is empty", path.display())));
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DatabaseSnapshot::default_file_name(entry_id));
        Ok(DatabaseSnapshot {
            entry_id: entry_id.to_string(),
            file_name,
            bytes,
        })
    }
}
