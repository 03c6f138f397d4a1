use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialise record {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Opaque string key/value storage that registrations are kept in.
///
/// Values are JSON documents; the store does not validate their shape.
pub trait RecordStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn upsert(&self, key: &str, value: String);
    fn remove(&self, key: &str);
    fn keys(&self) -> Vec<String>;
}

impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn upsert(&self, key: &str, value: String) {
        (**self).upsert(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}

/// Read and decode a JSON record.
///
/// A record that is absent or not decodable is reported as `None`; stored data
/// is never trusted to be well formed.
pub fn read_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: RecordStore + ?Sized,
{
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, error = %err, "stored record is not valid JSON; treating as absent");
            None
        }
    }
}

pub fn write_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize,
    S: RecordStore + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.upsert(key, raw);
    Ok(())
}

/// In-memory record store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    inner: RwLock<HashMap<String, String>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn get(&self, key: &str) -> Option<String> {
        let map = self.inner.read().ok()?;
        map.get(key).cloned()
    }

    fn upsert(&self, key: &str, value: String) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(key.to_string(), value);
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut map) = self.inner.write() {
            map.remove(key);
        }
    }

    fn keys(&self) -> Vec<String> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };

        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    #[test]
    fn json_round_trip_through_store() {
        let store = InMemoryRecordStore::new();
        write_json(&store, "note", &Note { text: "hi".into() }).unwrap();
        assert_eq!(read_json::<Note, _>(&store, "note"), Some(Note { text: "hi".into() }));

        store.remove("note");
        assert!(read_json::<Note, _>(&store, "note").is_none());
    }

    #[test]
    fn undecodable_record_reads_as_absent() {
        let store = InMemoryRecordStore::new();
        store.upsert("note", "{not json".to_string());
        assert!(read_json::<Note, _>(&store, "note").is_none());
        assert_eq!(store.keys(), vec!["note".to_string()]);
    }

    #[test]
    fn shared_store_through_arc() {
        let store = Arc::new(InMemoryRecordStore::new());
        let handle: Arc<dyn RecordStore> = store.clone();
        handle.upsert("a", "1".to_string());
        assert_eq!(store.get("a").as_deref(), Some("1"));
    }
}
