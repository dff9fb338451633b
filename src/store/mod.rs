pub mod seed;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use atomic_write_file::AtomicWriteFile;
use chrono::Utc;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreWarning};
use crate::record::{Record, RecordDraft, RecordPatch};
use crate::validate;

/// The record collection plus everything that must change under the same
/// lock: the monotonic id source and the sticky degraded flag.
#[derive(Debug)]
struct Inner {
    records: Vec<Record>,
    last_id: u64,
    warning: Option<StoreWarning>,
}

/// Durable store for the record collection, backed by a single JSON-array
/// file.
///
/// One `Store` instance owns one backing file. Mutating operations take the
/// write lock, build the post-mutation collection, persist it atomically, and
/// only then swap it in: on a failed persist the in-memory view is untouched,
/// so memory and disk never diverge. Reads take the read lock and always see
/// a complete pre- or post-mutation snapshot, never a torn one.
pub struct Store {
    path: PathBuf,
    inner: RwLock<Inner>,
}

/// Insertion-ordered view of the collection. `warning` is set while the store
/// is serving seed data because the backing file was unreadable at load.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub records: Vec<Record>,
    pub warning: Option<StoreWarning>,
}

impl Store {
    /// Open the store at `path`, loading the persisted collection.
    ///
    /// A missing file is created with the seed dataset. An unreadable or
    /// corrupt file also falls back to the seed, but puts the store in
    /// degraded mode: a warning is logged and attached to every snapshot
    /// until the next successful persist rewrites the file.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (records, warning) = match load_records(&path) {
            Ok(Some(records)) => {
                debug!(path = %path.display(), count = records.len(), "loaded record collection");
                (records, None)
            }
            Ok(None) => {
                let records = seed::sample_records();
                if let Err(e) = persist(&path, &records) {
                    warn!(path = %path.display(), error = %e, "failed to write seed data");
                }
                debug!(path = %path.display(), "no record file, seeded sample data");
                (records, None)
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "record file unreadable, serving seed data in degraded mode"
                );
                let warning = StoreWarning::DegradedRead {
                    path: path.display().to_string(),
                    detail: e.to_string(),
                };
                (seed::sample_records(), Some(warning))
            }
        };

        // Seed ids are small integers; real ids are millisecond epochs. Either
        // way the next issued id must sort after everything already present.
        let last_id = records
            .iter()
            .filter_map(|r| r.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);

        Store {
            path,
            inner: RwLock::new(Inner {
                records,
                last_id,
                warning,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate a candidate, assign id/timestamp/status, append and persist.
    ///
    /// The returned record is exactly what was persisted. On a persist
    /// failure the collection is left unchanged and the id is not considered
    /// spent.
    pub fn create(&self, draft: &RecordDraft) -> Result<Record, StoreError> {
        let valid = validate::validate_draft(draft)?;

        let mut inner = self.inner.write().expect("record store lock poisoned");

        let id = next_id(inner.last_id);
        let record = Record {
            id: id.to_string(),
            name: valid.name,
            distance: valid.distance,
            pace: valid.pace,
            date: valid.date,
            reflections: valid.reflections,
            photo: valid.photo,
            timestamp: Utc::now(),
            updated_at: None,
            status: valid.status,
        };

        let mut next = inner.records.clone();
        next.push(record.clone());
        persist(&self.path, &next)?;

        inner.records = next;
        inner.last_id = id;
        inner.warning = None;
        Ok(record)
    }

    /// Every persisted record in insertion order. Never fails; a degraded
    /// load is reported through the snapshot's warning instead.
    pub fn get_all(&self) -> Snapshot {
        let inner = self.inner.read().expect("record store lock poisoned");
        Snapshot {
            records: inner.records.clone(),
            warning: inner.warning.clone(),
        }
    }

    pub fn get(&self, id: &str) -> Option<Record> {
        let inner = self.inner.read().expect("record store lock poisoned");
        inner.records.iter().find(|r| r.id == id).cloned()
    }

    /// Merge the fields present in `patch` into the record with `id`.
    ///
    /// `id` and `timestamp` are never overwritten. The merged result is
    /// re-validated, so an update can never take a persisted record out of
    /// invariant. `updated_at` is refreshed on success.
    pub fn update(&self, id: &str, patch: &RecordPatch) -> Result<Record, StoreError> {
        let mut inner = self.inner.write().expect("record store lock poisoned");

        let index = inner
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let mut merged = inner.records[index].clone();
        merged.apply(patch);
        validate::validate_record(&merged)?;
        merged.updated_at = Some(Utc::now());

        let mut next = inner.records.clone();
        next[index] = merged.clone();
        persist(&self.path, &next)?;

        inner.records = next;
        inner.warning = None;
        Ok(merged)
    }

    /// Hard delete. A second delete of the same id reports `NotFound`.
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().expect("record store lock poisoned");

        if !inner.records.iter().any(|r| r.id == id) {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let next: Vec<Record> = inner
            .records
            .iter()
            .filter(|r| r.id != id)
            .cloned()
            .collect();
        persist(&self.path, &next)?;

        inner.records = next;
        inner.warning = None;
        Ok(())
    }
}

/// Millisecond epoch as a decimal string, bumped past the last issued id so
/// two creates inside the same millisecond still get distinct, ordered ids.
fn next_id(last_id: u64) -> u64 {
    let now = Utc::now().timestamp_millis().max(0) as u64;
    if now > last_id {
        now
    } else {
        last_id + 1
    }
}

/// Read the whole collection. `Ok(None)` means the file does not exist yet;
/// an `Err` covers both unreadable and malformed content.
fn load_records(path: &Path) -> io::Result<Option<Vec<Record>>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    let records = serde_json::from_str(&raw)?;
    Ok(Some(records))
}

/// Rewrite the whole collection atomically: serialize into a temp file and
/// commit, so a crash mid-write never leaves a torn file behind.
fn persist(path: &Path, records: &[Record]) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    let mut file = AtomicWriteFile::open(path)?;
    serde_json::to_writer_pretty(&mut file, records)?;
    file.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Photo, RecordStatus};
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn draft(name: &str, distance: f64, pace: &str) -> RecordDraft {
        RecordDraft {
            name: name.to_string(),
            distance,
            pace: pace.to_string(),
            ..RecordDraft::default()
        }
    }

    fn open_empty(dir: &TempDir) -> Store {
        let path = dir.path().join("athletes.json");
        fs::write(&path, "[]").unwrap();
        Store::open(path)
    }

    #[test]
    fn test_missing_file_seeds_sample_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("athletes.json");
        let store = Store::open(&path);

        let snapshot = store.get_all();
        assert_eq!(snapshot.records.len(), 3);
        assert!(snapshot.warning.is_none());
        // The seed was persisted, so a reopen loads it cleanly from disk.
        assert!(path.exists());
        let reopened = Store::open(&path);
        assert_eq!(reopened.get_all().records, snapshot.records);
    }

    #[test]
    fn test_corrupt_file_degrades_with_warning() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("athletes.json");
        fs::write(&path, "{not json").unwrap();

        let store = Store::open(&path);
        let snapshot = store.get_all();
        assert_eq!(snapshot.records.len(), 3);
        let warning = snapshot.warning.expect("degraded load must surface a warning");
        assert!(matches!(warning, StoreWarning::DegradedRead { .. }));
    }

    #[test]
    fn test_degraded_flag_clears_after_successful_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("athletes.json");
        fs::write(&path, "{not json").unwrap();

        let store = Store::open(&path);
        assert!(store.get_all().warning.is_some());

        store.create(&draft("A", 5.0, "5:00")).unwrap();
        assert!(store.get_all().warning.is_none());
    }

    #[test]
    fn test_create_assigns_server_side_fields() {
        let dir = TempDir::new().unwrap();
        let store = open_empty(&dir);

        let record = store.create(&draft("  Alex  ", 10.5, "5:20")).unwrap();
        assert!(!record.id.is_empty());
        assert_eq!(record.name, "Alex");
        assert_eq!(record.status, RecordStatus::Pending);
        assert!(record.updated_at.is_none());
    }

    #[test]
    fn test_create_rejects_invalid_candidate() {
        let dir = TempDir::new().unwrap();
        let store = open_empty(&dir);

        let err = store.create(&draft("", 5.0, "5:00")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.get_all().records.is_empty());
    }

    #[test]
    fn test_created_record_round_trips_through_reload() {
        let dir = TempDir::new().unwrap();
        let store = open_empty(&dir);

        let mut candidate = draft("Maria", 8.2, "4:45");
        candidate.reflections = Some("speed work".to_string());
        candidate.photo = Some(Photo::Url("https://img.example/run.jpg".to_string()));
        let created = store.create(&candidate).unwrap();

        let reopened = Store::open(store.path());
        let records = reopened.get_all().records;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0], created);
    }

    #[test]
    fn test_sequential_creates_get_distinct_increasing_ids() {
        let dir = TempDir::new().unwrap();
        let store = open_empty(&dir);

        let mut previous: u64 = 0;
        for i in 0..20 {
            let record = store.create(&draft(&format!("r{i}"), 5.0, "5:00")).unwrap();
            let id: u64 = record.id.parse().unwrap();
            assert!(id > previous, "id {} not greater than {}", id, previous);
            previous = id;
        }
    }

    #[test]
    fn test_concurrent_creates_never_collide_or_drop_writes() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(open_empty(&dir));

        let mut handles = Vec::new();
        for t in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                let mut ids = Vec::new();
                for i in 0..5 {
                    let record = store
                        .create(&draft(&format!("t{t}-{i}"), 5.0, "5:00"))
                        .unwrap();
                    ids.push(record.id);
                }
                ids
            }));
        }

        let mut all_ids: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all_ids.sort_unstable();
        all_ids.dedup();
        assert_eq!(all_ids.len(), 40, "every create must issue a distinct id");

        // No writer's snapshot overwrote another's insert.
        assert_eq!(store.get_all().records.len(), 40);
        let reopened = Store::open(store.path());
        assert_eq!(reopened.get_all().records.len(), 40);
    }

    #[test]
    fn test_update_merges_and_refreshes_updated_at() {
        let dir = TempDir::new().unwrap();
        let store = open_empty(&dir);
        let created = store.create(&draft("Alex", 10.5, "5:20")).unwrap();

        let patch: RecordPatch =
            serde_json::from_value(json!({"distance": 12.0, "status": "approved"})).unwrap();
        let updated = store.update(&created.id, &patch).unwrap();

        assert_eq!(updated.distance, 12.0);
        assert_eq!(updated.status, RecordStatus::Approved);
        assert_eq!(updated.pace, "5:20");
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.timestamp, created.timestamp);
        assert!(updated.updated_at.is_some());

        // Persisted form matches the returned record.
        let reopened = Store::open(store.path());
        assert_eq!(reopened.get(&created.id).unwrap(), updated);
    }

    #[test]
    fn test_update_unknown_id_not_found() {
        let dir = TempDir::new().unwrap();
        let store = open_empty(&dir);

        let err = store.update("12345", &RecordPatch::default()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "12345"));
    }

    #[test]
    fn test_update_rejecting_patch_leaves_record_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = open_empty(&dir);
        let created = store.create(&draft("Alex", 10.5, "5:20")).unwrap();

        let patch: RecordPatch = serde_json::from_value(json!({"pace": "530"})).unwrap();
        let err = store.update(&created.id, &patch).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let current = store.get(&created.id).unwrap();
        assert_eq!(current, created);
    }

    #[test]
    fn test_delete_then_delete_again() {
        let dir = TempDir::new().unwrap();
        let store = open_empty(&dir);
        let keep = store.create(&draft("Keep", 5.0, "5:00")).unwrap();
        let gone = store.create(&draft("Gone", 6.0, "5:10")).unwrap();

        store.delete(&gone.id).unwrap();
        assert!(store.get(&gone.id).is_none());

        // Idempotence: the repeat delete is NotFound and the survivor is intact.
        let err = store.delete(&gone.id).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(store.get_all().records, vec![keep]);
    }

    #[test]
    fn test_get_all_insertion_order() {
        let dir = TempDir::new().unwrap();
        let store = open_empty(&dir);
        for (name, distance) in [("a", 5.0), ("b", 6.0), ("c", 7.0)] {
            store.create(&draft(name, distance, "5:00")).unwrap();
        }

        let names: Vec<String> = store
            .get_all()
            .records
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_persisted_layout_is_a_json_array() {
        let dir = TempDir::new().unwrap();
        let store = open_empty(&dir);
        store.create(&draft("Alex", 10.5, "5:20")).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let array = value.as_array().expect("persisted form is a JSON array");
        assert_eq!(array.len(), 1);
        for field in ["id", "name", "distance", "pace", "date", "timestamp", "status"] {
            assert!(array[0].get(field).is_some(), "missing field {field}");
        }
    }
}
