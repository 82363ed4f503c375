//! Key-value persistence for the local overlays.
//!
//! Each key holds one JSON document. Lists are read once when a repo is
//! opened and written back whole after every change.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;
use crate::models::{EpisodeWatchState, Preference, PreferenceKind};
use crate::preferences::{Keyed, KeyedList, PreferenceList, WatchList};

/// Storage key for the favorite/starred preference list.
pub const PREFERENCES_KEY: &str = "animelist_userpreferenceData";

/// Storage key for the episode watch-state list.
pub const WATCHED_EPISODES_KEY: &str = "watchedEpisodes";

/// A string-valued key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let io_err = |source: std::io::Error| StorageError::Io {
            key: key.to_string(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(io_err)?;

        // Replace the file in one rename.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(io_err)?;
        std::fs::rename(&tmp, &path).map_err(io_err)?;

        tracing::debug!(key, path = %path.display(), bytes = value.len(), "Stored value");
        Ok(())
    }
}

/// In-memory store, used by tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read a keyed list; a missing key is an empty list.
fn load_list<T, S>(store: &S, key: &str) -> Result<KeyedList<T>, StorageError>
where
    T: Keyed + DeserializeOwned,
    S: KeyValueStore,
{
    let Some(raw) = store.get(key)? else {
        return Ok(KeyedList::default());
    };
    let items: Vec<T> = serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
        key: key.to_string(),
        source,
    })?;
    Ok(KeyedList::from_items(items))
}

fn save_list<T, S>(store: &S, key: &str, list: &KeyedList<T>) -> Result<(), StorageError>
where
    T: Keyed + Serialize,
    S: KeyValueStore,
{
    let json = serde_json::to_string(list).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)
}

/// Preference list backed by a store.
pub struct PreferenceRepo<S> {
    store: S,
    list: PreferenceList,
}

impl<S: KeyValueStore> PreferenceRepo<S> {
    pub fn open(store: S) -> Result<Self, StorageError> {
        let list = load_list(&store, PREFERENCES_KEY)?;
        tracing::debug!(count = list.len(), "Loaded preferences");
        Ok(Self { store, list })
    }

    pub fn list(&self) -> &PreferenceList {
        &self.list
    }

    pub fn get(&self, anime_id: &str) -> Option<&Preference> {
        self.list.find(anime_id)
    }

    /// Toggle a flag and persist the whole list. The in-memory list only
    /// changes once the write succeeds.
    pub fn toggle(
        &mut self,
        anime_id: &str,
        kind: PreferenceKind,
    ) -> Result<Preference, StorageError> {
        let mut next = self.list.clone();
        let pref = next.toggle(anime_id, kind).clone();
        save_list(&self.store, PREFERENCES_KEY, &next)?;
        self.list = next;
        tracing::info!(anime_id, %kind, value = pref.flag(kind), "Preference toggled");
        Ok(pref)
    }
}

/// Episode watch states backed by a store.
pub struct WatchRepo<S> {
    store: S,
    list: WatchList,
}

impl<S: KeyValueStore> WatchRepo<S> {
    pub fn open(store: S) -> Result<Self, StorageError> {
        let list = load_list(&store, WATCHED_EPISODES_KEY)?;
        tracing::debug!(count = list.len(), "Loaded episode watch states");
        Ok(Self { store, list })
    }

    pub fn list(&self) -> &WatchList {
        &self.list
    }

    pub fn is_watched(&self, episode_id: &str) -> bool {
        self.list.is_watched(episode_id)
    }

    /// Toggle watched and persist the whole list. A failed write leaves
    /// the list as it was.
    pub fn toggle(&mut self, episode_id: &str) -> Result<EpisodeWatchState, StorageError> {
        let mut next = self.list.clone();
        let state = next.toggle(episode_id).clone();
        save_list(&self.store, WATCHED_EPISODES_KEY, &next)?;
        self.list = next;
        tracing::info!(episode_id, watched = state.watched, "Episode watch state toggled");
        Ok(state)
    }
}
