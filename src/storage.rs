use crate::config::write_atomic;
use crate::model::{PlantState, SaveFile, SAVE_VERSION};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Opaque load/save of the single persisted plant.
pub(crate) trait PlantStore {
    /// Missing, corrupt, or rejected data all come back as `None`.
    fn load(&self) -> Option<PlantState>;
    fn save(&self, plant: &PlantState) -> Result<(), StoreError>;
}

pub(crate) fn encode(plant: &PlantState) -> Result<Vec<u8>, StoreError> {
    Ok(serde_json::to_vec_pretty(&SaveFile::new(plant.clone()))?)
}

pub(crate) fn decode(bytes: &[u8]) -> Option<PlantState> {
    let save = match serde_json::from_slice::<SaveFile>(bytes) {
        Ok(s) => s,
        Err(err) => {
            tracing::warn!(%err, "discarding unreadable save");
            return None;
        }
    };
    if save.version != SAVE_VERSION {
        tracing::warn!(version = save.version, "discarding save with unknown version");
        return None;
    }
    if !save.plant.is_well_formed() {
        tracing::warn!("discarding save with out-of-range fields");
        return None;
    }
    Some(save.plant)
}

pub(crate) struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub(crate) fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl PlantStore for JsonFileStore {
    fn load(&self) -> Option<PlantState> {
        let bytes = fs::read(&self.path).ok()?;
        decode(&bytes)
    }

    fn save(&self, plant: &PlantState) -> Result<(), StoreError> {
        write_atomic(&self.path, &encode(plant)?)
    }
}

#[cfg(test)]
pub(crate) struct MemoryStore {
    blob: std::cell::RefCell<Option<Vec<u8>>>,
}

#[cfg(test)]
impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self {
            blob: std::cell::RefCell::new(None),
        }
    }

    pub(crate) fn with_blob(bytes: &[u8]) -> Self {
        Self {
            blob: std::cell::RefCell::new(Some(bytes.to_vec())),
        }
    }
}

#[cfg(test)]
impl PlantStore for MemoryStore {
    fn load(&self) -> Option<PlantState> {
        self.blob.borrow().as_deref().and_then(decode)
    }

    fn save(&self, plant: &PlantState) -> Result<(), StoreError> {
        *self.blob.borrow_mut() = Some(encode(plant)?);
        Ok(())
    }
}

/// Loads the persisted plant, or starts a fresh one at `now`.
pub(crate) fn load_or_fresh(
    store: &dyn PlantStore,
    now: chrono::DateTime<chrono::Utc>,
) -> (PlantState, bool) {
    match store.load() {
        Some(p) => (p, true),
        None => (PlantState::new(now), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{advance, apply_sunlight};
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};

    fn grown_plant() -> PlantState {
        let t = Utc.with_ymd_and_hms(2026, 7, 14, 6, 12, 33).unwrap()
            + ChronoDuration::milliseconds(417);
        let p = apply_sunlight(&PlantState::new(t), t + ChronoDuration::seconds(5));
        advance(&p, t + ChronoDuration::minutes(97), 7.5)
    }

    #[test]
    fn file_round_trip_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(&dir.path().join("plant.json"));
        assert!(store.load().is_none());

        let p = grown_plant();
        store.save(&p).unwrap();
        assert_eq!(store.load(), Some(p));
    }

    #[test]
    fn memory_round_trip_is_exact() {
        let store = MemoryStore::new();
        let p = grown_plant();
        store.save(&p).unwrap();
        assert_eq!(store.load(), Some(p));
    }

    #[test]
    fn corrupt_blob_loads_as_absent() {
        assert!(MemoryStore::with_blob(b"\x00\x01garbage").load().is_none());
        assert!(MemoryStore::with_blob(b"{\"version\":1}").load().is_none());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plant.json");
        fs::write(&path, "{ truncated").unwrap();
        assert!(JsonFileStore::new(&path).load().is_none());
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut value = serde_json::to_value(SaveFile::new(grown_plant())).unwrap();
        value["version"] = serde_json::json!(SAVE_VERSION + 1);
        let bytes = serde_json::to_vec(&value).unwrap();
        assert!(MemoryStore::with_blob(&bytes).load().is_none());
    }

    #[test]
    fn out_of_range_record_is_rejected() {
        let mut value = serde_json::to_value(SaveFile::new(grown_plant())).unwrap();
        value["plant"]["hydration"] = serde_json::json!(250.0);
        let bytes = serde_json::to_vec(&value).unwrap();
        assert!(MemoryStore::with_blob(&bytes).load().is_none());
    }

    #[test]
    fn load_or_fresh_falls_back() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let (p, loaded) = load_or_fresh(&MemoryStore::with_blob(b"nope"), now);
        assert!(!loaded);
        assert_eq!(p, PlantState::new(now));

        let store = MemoryStore::new();
        store.save(&grown_plant()).unwrap();
        let (p, loaded) = load_or_fresh(&store, now);
        assert!(loaded);
        assert_eq!(p, grown_plant());
    }
}
