// State sinks: where the front desk sends a full snapshot after each mutation

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::snapshot::Snapshot;

// Persistence collaborator; implementations must be usable from several threads
pub trait StateSink: Send + Sync + 'static {
    // Snapshot stored so far, or None when nothing was ever saved
    fn load(&self) -> Result<Option<Snapshot>, StoreError>;

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

// JSON document on disk, replaced atomically on every save
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }
}

impl StateSink for JsonFileStore {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no saved state");
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        let snapshot: Snapshot = serde_json::from_str(&text)?;
        info!(
            path = %self.path.display(),
            rooms = snapshot.rooms.len(),
            bookings = snapshot.bookings.len(),
            "loaded saved state"
        );
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.temp_path();
        {
            let mut file = fs::File::create(&tmp)?;
            serde_json::to_writer_pretty(&mut file, snapshot)?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "state saved");
        Ok(())
    }
}

// Keeps the latest snapshot in memory; useful for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryStore {
    latest: Mutex<Option<Snapshot>>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            latest: Mutex::new(Some(snapshot)),
            saves: Mutex::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }

    pub fn latest(&self) -> Option<Snapshot> {
        self.latest.lock().clone()
    }
}

impl StateSink for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        Ok(self.latest.lock().clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        *self.latest.lock() = Some(snapshot.clone());
        *self.saves.lock() += 1;
        Ok(())
    }
}

// Shared handles to a sink are sinks too
impl<S: StateSink> StateSink for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        (**self).save(snapshot)
    }
}
