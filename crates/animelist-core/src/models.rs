use animelist_api::traits::AnimeRecord;
use serde::{Deserialize, Serialize};

/// Which preference flag a toggle applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceKind {
    Favorite,
    Star,
}

impl PreferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Favorite => "favorite",
            Self::Star => "starred",
        }
    }
}

impl std::fmt::Display for PreferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-local favorite/starred flags attached to a remote anime id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preference {
    pub anime_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
}

impl Preference {
    pub fn is_favorite(&self) -> bool {
        self.favorite.unwrap_or(false)
    }

    pub fn is_starred(&self) -> bool {
        self.starred.unwrap_or(false)
    }

    pub fn flag(&self, kind: PreferenceKind) -> bool {
        match kind {
            PreferenceKind::Favorite => self.is_favorite(),
            PreferenceKind::Star => self.is_starred(),
        }
    }
}

/// Client-local "watched" mark for one episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeWatchState {
    pub id: String,
    pub watched: bool,
}

/// A remote record joined with its local preference, if any.
#[derive(Debug, Clone)]
pub struct AnimeWithPreference {
    pub anime: AnimeRecord,
    pub preference: Option<Preference>,
}

impl AnimeWithPreference {
    pub fn is_favorite(&self) -> bool {
        self.preference.as_ref().is_some_and(Preference::is_favorite)
    }

    pub fn is_starred(&self) -> bool {
        self.preference.as_ref().is_some_and(Preference::is_starred)
    }
}
