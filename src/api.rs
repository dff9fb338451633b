//! JSON boundary over the store: the seam an HTTP layer (or the CLI) calls.
//!
//! Requests come in as untyped JSON the way a routing layer would hand them
//! over; responses are JSON bodies shaped like the service's wire format.
//! Routing itself is someone else's concern.

use serde_json::{json, Value};
use thiserror::Error;

use crate::error::{StoreError, StoreWarning};
use crate::ranking::{self, SortKey};
use crate::record::{RecordDraft, RecordPatch};
use crate::store::Store;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed request body: {0}")]
    BadRequest(#[source] serde_json::Error),

    #[error(transparent)]
    UnknownSortKey(#[from] ranking::UnknownSortKey),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// HTTP-ish status code the wiring layer should map this error to.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) | ApiError::UnknownSortKey(_) => 400,
            ApiError::Store(StoreError::Validation(_)) => 400,
            ApiError::Store(StoreError::NotFound(_)) => 404,
            ApiError::Store(StoreError::Storage(_)) => 500,
        }
    }

    /// Error body in the service's wire shape.
    pub fn body(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

/// Add a new record. Returns `{success, id, athlete}`.
pub fn create(store: &Store, candidate: Value) -> Result<Value, ApiError> {
    let draft: RecordDraft = serde_json::from_value(candidate).map_err(ApiError::BadRequest)?;
    let record = store.create(&draft)?;
    Ok(json!({ "success": true, "id": record.id, "athlete": record }))
}

/// Every record in insertion order, plus the degraded-read warning if the
/// store is serving fallback data. The caller should log the warning, not
/// fail the request.
pub fn list(store: &Store) -> (Value, Option<StoreWarning>) {
    let snapshot = store.get_all();
    (json!(snapshot.records), snapshot.warning)
}

/// Merge a partial update into the record with `id`.
pub fn update(store: &Store, id: &str, patch: Value) -> Result<Value, ApiError> {
    let patch: RecordPatch = serde_json::from_value(patch).map_err(ApiError::BadRequest)?;
    let record = store.update(id, &patch)?;
    Ok(json!({ "success": true, "athlete": record }))
}

/// Delete the record with `id`.
pub fn delete(store: &Store, id: &str) -> Result<Value, ApiError> {
    store.delete(id)?;
    Ok(json!({ "success": true }))
}

/// Ranked leaderboard plus aggregate stats under the given sort key.
pub fn rank(store: &Store, sort_key: &str) -> Result<(Value, Option<StoreWarning>), ApiError> {
    let key: SortKey = if sort_key.is_empty() {
        SortKey::default()
    } else {
        sort_key.parse()?
    };

    let snapshot = store.get_all();
    let ranked = ranking::rank(&snapshot.records, key);
    let stats = ranking::stats(&snapshot.records);

    Ok((
        json!({ "sortKey": key.as_str(), "rankings": ranked, "stats": stats }),
        snapshot.warning,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn open_empty(dir: &TempDir) -> Store {
        let path = dir.path().join("athletes.json");
        fs::write(&path, "[]").unwrap();
        Store::open(path)
    }

    #[test]
    fn test_create_returns_id_and_record() {
        let dir = TempDir::new().unwrap();
        let store = open_empty(&dir);

        let body = create(
            &store,
            json!({"name": "Alex", "distance": 10.5, "pace": "5:20"}),
        )
        .unwrap();
        assert_eq!(body["success"], true);
        assert!(body["id"].is_string());
        assert_eq!(body["athlete"]["name"], "Alex");
        assert_eq!(body["athlete"]["status"], "pending");
    }

    #[test]
    fn test_create_validation_maps_to_400() {
        let dir = TempDir::new().unwrap();
        let store = open_empty(&dir);

        let err = create(&store, json!({"name": "", "distance": 5, "pace": "5:00"})).unwrap_err();
        assert_eq!(err.status(), 400);
        assert!(err.body()["error"]
            .as_str()
            .unwrap()
            .contains("name"));
    }

    #[test]
    fn test_update_unknown_id_maps_to_404() {
        let dir = TempDir::new().unwrap();
        let store = open_empty(&dir);

        let err = update(&store, "99", json!({"distance": 6})).unwrap_err();
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn test_delete_then_list() {
        let dir = TempDir::new().unwrap();
        let store = open_empty(&dir);
        let created = create(
            &store,
            json!({"name": "Alex", "distance": 10.5, "pace": "5:20"}),
        )
        .unwrap();
        let id = created["id"].as_str().unwrap();

        delete(&store, id).unwrap();
        let (body, warning) = list(&store);
        assert_eq!(body.as_array().unwrap().len(), 0);
        assert!(warning.is_none());
    }

    #[test]
    fn test_rank_body_shape() {
        let dir = TempDir::new().unwrap();
        let store = open_empty(&dir);
        create(
            &store,
            json!({"name": "Alex", "distance": 10.5, "pace": "5:20"}),
        )
        .unwrap();
        create(
            &store,
            json!({"name": "Maria", "distance": 8.2, "pace": "4:45"}),
        )
        .unwrap();

        let (body, _) = rank(&store, "score").unwrap();
        let rankings = body["rankings"].as_array().unwrap();
        assert_eq!(rankings.len(), 2);
        assert_eq!(rankings[0]["name"], "Alex");
        assert_eq!(rankings[0]["score"], 105.0);
        assert_eq!(body["stats"]["athleteCount"], 2);
        assert_eq!(body["stats"]["averagePace"], "5:03");
    }

    #[test]
    fn test_rank_unknown_key_maps_to_400() {
        let dir = TempDir::new().unwrap();
        let store = open_empty(&dir);

        let err = rank(&store, "fastest").unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_rank_empty_key_defaults_to_score() {
        let dir = TempDir::new().unwrap();
        let store = open_empty(&dir);

        let (body, _) = rank(&store, "").unwrap();
        assert_eq!(body["sortKey"], "score");
    }
}
