//! Client-side filtering of the loaded catalog.

use animelist_api::traits::AnimeRecord;
use unicode_normalization::UnicodeNormalization;

use crate::models::AnimeWithPreference;
use crate::preferences::PreferenceList;

/// Which preference flags a record must carry to be shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterState {
    pub favorite: bool,
    pub starred: bool,
}

impl FilterState {
    pub fn toggle_favorite(&mut self) {
        self.favorite = !self.favorite;
    }

    pub fn toggle_starred(&mut self) {
        self.starred = !self.starred;
    }

    /// Both flags required when both are set; no constraint when neither is.
    pub fn accepts(&self, item: &AnimeWithPreference) -> bool {
        match (self.favorite, self.starred) {
            (true, true) => item.is_favorite() && item.is_starred(),
            (true, false) => item.is_favorite(),
            (false, true) => item.is_starred(),
            (false, false) => true,
        }
    }
}

/// NFKC + lowercase, so fullwidth and case variants compare equal.
fn fold(s: &str) -> String {
    s.nfkc().collect::<String>().to_lowercase()
}

/// Case-insensitive substring match against the localized title.
/// An empty query matches everything; a record without a localized title
/// matches nothing else.
pub fn matches_search(anime: &AnimeRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    anime
        .localized_title()
        .is_some_and(|title| fold(title).contains(&fold(query)))
}

/// Search, join preferences, then apply the flag filter.
pub fn apply(
    records: &[AnimeRecord],
    preferences: &PreferenceList,
    search: &str,
    filter: FilterState,
) -> Vec<AnimeWithPreference> {
    records
        .iter()
        .filter(|anime| matches_search(anime, search))
        .map(|anime| AnimeWithPreference {
            anime: anime.clone(),
            preference: preferences.find(&anime.id).cloned(),
        })
        .filter(|item| filter.accepts(item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PreferenceKind;
    use animelist_api::traits::Titles;

    fn anime(id: &str, en_jp: Option<&str>) -> AnimeRecord {
        AnimeRecord {
            id: id.into(),
            titles: Titles {
                en: Some(format!("English {id}")),
                en_jp: en_jp.map(Into::into),
                ja_jp: None,
            },
            ..Default::default()
        }
    }

    fn catalog() -> Vec<AnimeRecord> {
        vec![
            anime("1", Some("Cowboy Bebop")),
            anime("2", Some("Shingeki no Kyojin")),
            anime("3", Some("Cowboy Bebop: Tengoku no Tobira")),
            anime("4", None),
        ]
    }

    fn ids(items: &[AnimeWithPreference]) -> Vec<&str> {
        items.iter().map(|i| i.anime.id.as_str()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let records = catalog();
        let prefs = PreferenceList::default();

        let found = apply(&records, &prefs, "BEBOP", FilterState::default());
        assert_eq!(ids(&found), vec!["1", "3"]);

        let found = apply(&records, &prefs, "kyo", FilterState::default());
        assert_eq!(ids(&found), vec!["2"]);
    }

    #[test]
    fn test_search_ignores_english_title() {
        let records = catalog();
        let found = apply(
            &records,
            &PreferenceList::default(),
            "English",
            FilterState::default(),
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_empty_search_keeps_all() {
        let records = catalog();
        let found = apply(&records, &PreferenceList::default(), "", FilterState::default());
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn test_search_is_literal() {
        let records = vec![anime("1", Some("Steins;Gate (2011)"))];
        let prefs = PreferenceList::default();
        assert_eq!(apply(&records, &prefs, "(2011", FilterState::default()).len(), 1);
        assert!(apply(&records, &prefs, "g.te", FilterState::default()).is_empty());
    }

    #[test]
    fn test_search_folds_fullwidth() {
        let records = vec![anime("1", Some("ＢＥＢＯＰ"))];
        let found = apply(&records, &PreferenceList::default(), "bebop", FilterState::default());
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_combined_filter_requires_both_flags() {
        let records = catalog();
        let mut prefs = PreferenceList::default();
        prefs.toggle("1", PreferenceKind::Favorite);
        prefs.toggle("1", PreferenceKind::Star);
        prefs.toggle("2", PreferenceKind::Favorite);
        prefs.toggle("3", PreferenceKind::Star);

        let both = FilterState {
            favorite: true,
            starred: true,
        };
        assert_eq!(ids(&apply(&records, &prefs, "", both)), vec!["1"]);

        let fav = FilterState {
            favorite: true,
            starred: false,
        };
        assert_eq!(ids(&apply(&records, &prefs, "", fav)), vec!["1", "2"]);

        let star = FilterState {
            favorite: false,
            starred: true,
        };
        assert_eq!(ids(&apply(&records, &prefs, "", star)), vec!["1", "3"]);
    }

    #[test]
    fn test_preferences_are_joined() {
        let records = catalog();
        let mut prefs = PreferenceList::default();
        prefs.toggle("2", PreferenceKind::Star);

        let found = apply(&records, &prefs, "", FilterState::default());
        assert!(found[1].is_starred());
        assert!(!found[1].is_favorite());
        assert!(found[0].preference.is_none());
    }

    #[test]
    fn test_filter_toggles() {
        let mut state = FilterState::default();
        state.toggle_favorite();
        state.toggle_starred();
        state.toggle_favorite();
        assert_eq!(
            state,
            FilterState {
                favorite: false,
                starred: true,
            }
        );
    }
}
