use std::{
    fs,
    path::{Path, PathBuf},
};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::Db;

/// In-memory planner state, optionally mirrored to a JSON snapshot file.
pub struct Store {
    db: Mutex<Db>,
    snapshot: Option<PathBuf>,
}

impl Store {
    pub fn new(db: Db, snapshot: Option<PathBuf>) -> Self {
        Self {
            db: Mutex::new(db),
            snapshot,
        }
    }

    // Existing snapshot wins; otherwise start empty or from the starter skeleton.
    pub fn open(snapshot: Option<PathBuf>, starter: bool) -> Result<Self, StoreError> {
        let db = match &snapshot {
            Some(path) if path.exists() => {
                info!("loading snapshot {}", path.display());
                load_snapshot(path)?
            }
            _ if starter => Db::starter(),
            _ => Db::default(),
        };
        Ok(Self::new(db, snapshot))
    }

    pub async fn read<R>(&self, f: impl FnOnce(&Db) -> R) -> R {
        let db = self.db.lock().await;
        f(&db)
    }

    /// Apply `f` to a copy of the state and commit it only if `f` succeeds
    /// and the snapshot (when configured) was written.
    pub async fn update<R, E>(&self, f: impl FnOnce(&mut Db) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let mut db = self.db.lock().await;
        let mut next = db.clone();
        let out = f(&mut next)?;

        if let Some(path) = &self.snapshot {
            save_snapshot(path, &next)?;
            debug!("snapshot written to {}", path.display());
        }
        *db = next;
        Ok(out)
    }
}

pub fn load_snapshot(path: &Path) -> Result<Db, StoreError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

pub fn save_snapshot(path: &Path, db: &Db) -> Result<(), StoreError> {
    let tmp_path = path.with_extension("json.tmp");
    let text = serde_json::to_string_pretty(db)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&tmp_path, text)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
