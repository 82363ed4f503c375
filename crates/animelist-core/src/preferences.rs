//! Local overlays on remote records: favorite/starred preferences keyed by
//! anime id and watched flags keyed by episode id.
//!
//! Both are flat lists with the same lifecycle: an entry is created on the
//! first toggle, mutated in place afterwards, and never deleted.
//! [`KeyedList`] holds that shared logic.

use serde::Serialize;

use crate::models::{EpisodeWatchState, Preference, PreferenceKind};

/// An item addressable by a string key.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Preference {
    fn key(&self) -> &str {
        &self.anime_id
    }
}

impl Keyed for EpisodeWatchState {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Insertion-ordered list with at most one entry per key.
///
/// Lists loaded from storage may contain duplicate keys; lookups and
/// updates then act on the first one, and later duplicates are dropped on
/// load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeyedList<T> {
    items: Vec<T>,
}

impl<T> Default for KeyedList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Keyed> KeyedList<T> {
    /// Build from raw items, keeping the first entry for each key.
    pub fn from_items(items: Vec<T>) -> Self {
        let mut list = Self::default();
        for item in items {
            if list.find(item.key()).is_none() {
                list.items.push(item);
            }
        }
        list
    }

    pub fn find(&self, key: &str) -> Option<&T> {
        self.items.iter().find(|item| item.key() == key)
    }

    /// Update the entry for `key` in place, or append the one `create`
    /// builds. Returns the resulting entry.
    pub fn upsert_with(
        &mut self,
        key: &str,
        create: impl FnOnce() -> T,
        update: impl FnOnce(&mut T),
    ) -> &T {
        let idx = match self.items.iter().position(|item| item.key() == key) {
            Some(idx) => {
                update(&mut self.items[idx]);
                idx
            }
            None => {
                self.items.push(create());
                self.items.len() - 1
            }
        };
        &self.items[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Favorite/starred flags for anime.
pub type PreferenceList = KeyedList<Preference>;

impl KeyedList<Preference> {
    /// Flip one flag for `anime_id`.
    ///
    /// A new entry gets the toggled flag set and the other one explicitly
    /// cleared. An existing entry only has the toggled flag flipped; an
    /// unset flag counts as `false`.
    pub fn toggle(&mut self, anime_id: &str, kind: PreferenceKind) -> &Preference {
        self.upsert_with(
            anime_id,
            || Preference {
                anime_id: anime_id.to_string(),
                favorite: Some(kind == PreferenceKind::Favorite),
                starred: Some(kind == PreferenceKind::Star),
            },
            |pref| match kind {
                PreferenceKind::Favorite => pref.favorite = Some(!pref.is_favorite()),
                PreferenceKind::Star => pref.starred = Some(!pref.is_starred()),
            },
        )
    }
}

/// Watched flags for episodes.
pub type WatchList = KeyedList<EpisodeWatchState>;

impl KeyedList<EpisodeWatchState> {
    /// Mark a new episode watched, or flip an existing entry.
    pub fn toggle(&mut self, episode_id: &str) -> &EpisodeWatchState {
        self.upsert_with(
            episode_id,
            || EpisodeWatchState {
                id: episode_id.to_string(),
                watched: true,
            },
            |state| state.watched = !state.watched,
        )
    }

    pub fn is_watched(&self, episode_id: &str) -> bool {
        self.find(episode_id).is_some_and(|s| s.watched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_toggle_creates_entry() {
        let mut prefs = PreferenceList::default();
        let pref = prefs.toggle("42", PreferenceKind::Favorite).clone();
        assert_eq!(
            pref,
            Preference {
                anime_id: "42".into(),
                favorite: Some(true),
                starred: Some(false),
            }
        );
        assert_eq!(prefs.len(), 1);
    }

    #[test]
    fn test_toggle_twice_restores_flag() {
        let mut prefs = PreferenceList::default();
        prefs.toggle("1", PreferenceKind::Star);
        let before = prefs.find("1").unwrap().is_favorite();

        prefs.toggle("1", PreferenceKind::Favorite);
        prefs.toggle("1", PreferenceKind::Favorite);

        let pref = prefs.find("1").unwrap();
        assert_eq!(pref.is_favorite(), before);
        assert!(pref.is_starred());
        assert_eq!(prefs.len(), 1);
    }

    #[test]
    fn test_toggle_only_touches_selected_flag() {
        let mut prefs = PreferenceList::from_items(vec![Preference {
            anime_id: "9".into(),
            favorite: Some(true),
            starred: None,
        }]);
        let pref = prefs.toggle("9", PreferenceKind::Star);
        assert_eq!(pref.favorite, Some(true));
        assert_eq!(pref.starred, Some(true));
    }

    #[test]
    fn test_toggle_keeps_other_entries_in_place() {
        let mut prefs = PreferenceList::default();
        prefs.toggle("a", PreferenceKind::Favorite);
        prefs.toggle("b", PreferenceKind::Star);
        prefs.toggle("a", PreferenceKind::Star);

        let keys: Vec<&str> = prefs.iter().map(|p| p.anime_id.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_duplicate_keys_keep_first() {
        let prefs = PreferenceList::from_items(vec![
            Preference {
                anime_id: "1".into(),
                favorite: Some(true),
                starred: None,
            },
            Preference {
                anime_id: "1".into(),
                favorite: Some(false),
                starred: Some(true),
            },
        ]);
        assert_eq!(prefs.len(), 1);
        assert!(prefs.find("1").unwrap().is_favorite());
    }

    #[test]
    fn test_watch_toggle() {
        let mut watched = WatchList::default();
        assert!(!watched.is_watched("100"));

        assert!(watched.toggle("100").watched);
        assert!(watched.is_watched("100"));

        assert!(!watched.toggle("100").watched);
        assert!(!watched.is_watched("100"));
        assert_eq!(watched.len(), 1);
    }

    #[test]
    fn test_lists_serialize_as_plain_arrays() {
        let mut watched = WatchList::default();
        watched.toggle("5");
        let json = serde_json::to_string(&watched).unwrap();
        assert_eq!(json, r#"[{"id":"5","watched":true}]"#);
    }
}
