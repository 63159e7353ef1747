//! The set of known session names, persisted as one JSON array.
//!
//! The on-disk ordering is a presentation contract: lexicographically
//! sorted, deduplicated. A corrupt record is discarded and read as empty;
//! that is a recovery path, not a fatal error.

use std::collections::BTreeSet;

use tracing::warn;

use crate::kv::{KeyValueStore, Result};

/// Key holding the serialized session-name list.
pub const SESSION_LIST_KEY: &str = "dirscope.sessions";

/// All known session names, sorted and deduplicated.
pub fn list_sessions(kv: &impl KeyValueStore) -> Result<Vec<String>> {
    let Some(raw) = kv.get(SESSION_LIST_KEY)? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str::<BTreeSet<String>>(&raw) {
        Ok(names) => Ok(names.into_iter().collect()),
        Err(err) => {
            warn!("session list is corrupt, discarding it: {err}");
            kv.remove(SESSION_LIST_KEY)?;
            Ok(Vec::new())
        }
    }
}

/// Register `name`; a no-op if it is already present.
pub fn add_session(kv: &impl KeyValueStore, name: &str) -> Result<()> {
    let mut names: BTreeSet<String> = list_sessions(kv)?.into_iter().collect();
    if names.insert(name.to_string()) {
        save(kv, &names)?;
    }
    Ok(())
}

/// Unregister `name`; a no-op if it is absent.
pub fn remove_session(kv: &impl KeyValueStore, name: &str) -> Result<()> {
    let mut names: BTreeSet<String> = list_sessions(kv)?.into_iter().collect();
    if names.remove(name) {
        save(kv, &names)?;
    }
    Ok(())
}

fn save(kv: &impl KeyValueStore, names: &BTreeSet<String>) -> Result<()> {
    kv.set(SESSION_LIST_KEY, &serde_json::to_string(names)?)
}
