//! Per-session result cache: canonical path → cached analysis report.
//!
//! The whole map is serialized and persisted as one unit under one key per
//! session. Values are kept as raw JSON and validated per entry at read
//! time, so one structurally invalid entry triggers a silent refetch instead
//! of poisoning the whole session blob.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use dirscope_core::AnalysisReport;

use crate::kv::{KeyValueStore, Result};
use crate::registry;

/// In-memory cache for exactly one session.
pub type CacheMap = BTreeMap<String, serde_json::Value>;

/// A loaded cache plus whether a corrupt persisted blob had to be thrown
/// away to produce it. Callers surface a message only in that case.
#[derive(Debug)]
pub struct LoadedCache {
    pub map: CacheMap,
    pub recovered_from_corruption: bool,
}

/// Key holding the serialized cache blob for `session`.
pub fn cache_key(session: &str) -> String {
    format!("dirscope.cache.{session}")
}

/// Read the persisted cache for `session`.
///
/// Absent blob → empty map. A blob that is not a well-formed JSON object
/// map is discarded and the session is unregistered: a session whose cache
/// is unreadable is unusable until recreated.
pub fn load_cache(kv: &impl KeyValueStore, session: &str) -> Result<LoadedCache> {
    let key = cache_key(session);
    let Some(raw) = kv.get(&key)? else {
        return Ok(LoadedCache {
            map: CacheMap::new(),
            recovered_from_corruption: false,
        });
    };
    match serde_json::from_str::<CacheMap>(&raw) {
        Ok(map) => {
            debug!("loaded {} cached paths for session '{session}'", map.len());
            Ok(LoadedCache {
                map,
                recovered_from_corruption: false,
            })
        }
        Err(err) => {
            warn!("cache for session '{session}' is corrupt, discarding it: {err}");
            kv.remove(&key)?;
            registry::remove_session(kv, session)?;
            Ok(LoadedCache {
                map: CacheMap::new(),
                recovered_from_corruption: true,
            })
        }
    }
}

/// Serialize and persist the entire map. `StoreError::CapacityExceeded`
/// propagates distinctly so the caller can warn instead of abort.
pub fn save_cache(kv: &impl KeyValueStore, session: &str, map: &CacheMap) -> Result<()> {
    kv.set(&cache_key(session), &serde_json::to_string(map)?)
}

/// Insert `report` under its canonical path, then persist.
///
/// Returns the path it was cached under, or `None` when the report carries
/// no canonical path (the write is skipped with a diagnostic, never an
/// error).
pub fn put(
    kv: &impl KeyValueStore,
    session: &str,
    map: &mut CacheMap,
    report: &AnalysisReport,
) -> Result<Option<String>> {
    let Some(canonical) = report.canonical_path() else {
        warn!("cannot cache result for session '{session}': no canonical path in response");
        return Ok(None);
    };
    let canonical = canonical.to_string();
    map.insert(canonical.clone(), serde_json::to_value(report)?);
    save_cache(kv, session, map)?;
    debug!("cached '{canonical}' in session '{session}'");
    Ok(Some(canonical))
}

/// Drop one entry and persist. Used for read-time self-healing when a
/// stored entry turns out to be structurally invalid.
pub fn evict(
    kv: &impl KeyValueStore,
    session: &str,
    map: &mut CacheMap,
    path: &str,
) -> Result<()> {
    if map.remove(path).is_some() {
        save_cache(kv, session, map)?;
    }
    Ok(())
}

/// Delete a session's persisted cache entirely.
pub fn delete_cache(kv: &impl KeyValueStore, session: &str) -> Result<()> {
    kv.remove(&cache_key(session))
}

/// Validate a raw cached value into a report. `None` means the entry is not
/// a well-formed report object and should be evicted.
pub fn parse_entry(value: &serde_json::Value) -> Option<AnalysisReport> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{MemoryStore, StoreError};

    fn report(path: &str) -> AnalysisReport {
        AnalysisReport {
            path: Some(path.to_string()),
            results: Vec::new(),
            total_items_in_dir: Some(0),
            logs: Vec::new(),
            error: None,
        }
    }

    #[test]
    fn put_keys_by_canonical_path_and_round_trips() {
        let kv = MemoryStore::new();
        let mut map = CacheMap::new();
        let cached = put(&kv, "work", &mut map, &report("/tmp")).expect("put");
        assert_eq!(cached.as_deref(), Some("/tmp"));

        let reloaded = load_cache(&kv, "work").expect("load");
        assert!(!reloaded.recovered_from_corruption);
        let entry = reloaded.map.get("/tmp").expect("entry present");
        assert_eq!(parse_entry(entry), Some(report("/tmp")));
    }

    #[test]
    fn put_without_canonical_path_is_skipped() {
        let kv = MemoryStore::new();
        let mut map = CacheMap::new();
        let mut anonymous = report("/tmp");
        anonymous.path = None;
        let cached = put(&kv, "work", &mut map, &anonymous).expect("put");
        assert!(cached.is_none());
        assert!(map.is_empty());
        assert!(kv.get(&cache_key("work")).expect("get").is_none());
    }

    #[test]
    fn absent_cache_loads_empty() {
        let kv = MemoryStore::new();
        let loaded = load_cache(&kv, "work").expect("load");
        assert!(loaded.map.is_empty());
        assert!(!loaded.recovered_from_corruption);
    }

    #[test]
    fn corrupt_cache_is_discarded_and_session_unregistered() {
        let kv = MemoryStore::new();
        registry::add_session(&kv, "work").expect("register");
        kv.set(&cache_key("work"), "\"not an object map\"")
            .expect("seed corrupt");

        let loaded = load_cache(&kv, "work").expect("load");
        assert!(loaded.map.is_empty());
        assert!(loaded.recovered_from_corruption);
        assert!(kv.get(&cache_key("work")).expect("get").is_none());
        assert!(registry::list_sessions(&kv).expect("list").is_empty());
    }

    #[test]
    fn single_invalid_entry_does_not_poison_the_blob() {
        let kv = MemoryStore::new();
        let mut map = CacheMap::new();
        put(&kv, "work", &mut map, &report("/tmp")).expect("put");
        map.insert("/bad".to_string(), serde_json::Value::Null);
        save_cache(&kv, "work", &map).expect("save");

        let loaded = load_cache(&kv, "work").expect("load");
        assert!(!loaded.recovered_from_corruption);
        assert!(parse_entry(loaded.map.get("/bad").expect("bad entry")).is_none());
        assert!(parse_entry(loaded.map.get("/tmp").expect("good entry")).is_some());
    }

    #[test]
    fn evict_removes_and_persists() {
        let kv = MemoryStore::new();
        let mut map = CacheMap::new();
        put(&kv, "work", &mut map, &report("/tmp")).expect("put");
        evict(&kv, "work", &mut map, "/tmp").expect("evict");
        assert!(map.is_empty());
        let reloaded = load_cache(&kv, "work").expect("load");
        assert!(reloaded.map.is_empty());
    }

    #[test]
    fn capacity_overrun_surfaces_distinctly() {
        let kv = MemoryStore::with_capacity(16);
        let mut map = CacheMap::new();
        let err = put(&kv, "work", &mut map, &report("/a/rather/long/path"))
            .expect_err("over capacity");
        assert!(matches!(err, StoreError::CapacityExceeded));
    }
}
