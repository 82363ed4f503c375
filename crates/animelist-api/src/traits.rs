//! Trait definitions for the anime catalog.
//!
//! The pager and the CLI only talk to the catalog through
//! [`CatalogService`], so tests can swap the Kitsu client for an
//! in-memory catalog.

use std::future::Future;

use serde::{Deserialize, Serialize};

/// A read-only anime metadata source with offset pagination.
pub trait CatalogService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch one page of the anime list starting at `offset`.
    fn list_anime(
        &self,
        offset: u32,
        limit: u32,
    ) -> impl Future<Output = Result<AnimePage, Self::Error>> + Send;

    /// Fetch a single anime by its catalog id.
    fn get_anime(&self, id: &str) -> impl Future<Output = Result<AnimeRecord, Self::Error>> + Send;

    /// Fetch the first `limit` episodes of an anime.
    fn list_episodes(
        &self,
        anime_id: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<EpisodeRecord>, Self::Error>> + Send;
}

/// Localized title variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Titles {
    pub en: Option<String>,
    pub en_jp: Option<String>,
    pub ja_jp: Option<String>,
}

/// Image URLs keyed by size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSet {
    pub tiny: Option<String>,
    pub small: Option<String>,
    pub medium: Option<String>,
    pub large: Option<String>,
    pub original: Option<String>,
}

impl ImageSet {
    /// The medium image, falling back to the nearest available size.
    pub fn best(&self) -> Option<&str> {
        self.medium
            .as_deref()
            .or(self.large.as_deref())
            .or(self.small.as_deref())
            .or(self.original.as_deref())
            .or(self.tiny.as_deref())
    }
}

/// A server-owned anime record. Only `id` is guaranteed to be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimeRecord {
    pub id: String,
    pub slug: Option<String>,
    pub synopsis: Option<String>,
    pub titles: Titles,
    pub canonical_title: Option<String>,
    pub abbreviated_titles: Vec<String>,
    /// Kitsu sends the rating as a decimal string, e.g. `"82.17"`.
    pub average_rating: Option<String>,
    pub user_count: Option<u64>,
    pub favorites_count: Option<u64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub popularity_rank: Option<u32>,
    pub rating_rank: Option<u32>,
    pub age_rating: Option<String>,
    pub age_rating_guide: Option<String>,
    pub subtype: Option<String>,
    pub status: Option<String>,
    pub episode_count: Option<u32>,
    pub poster_image: Option<ImageSet>,
    pub cover_image: Option<ImageSet>,
}

impl AnimeRecord {
    /// The localized (romaji) title, which is what the catalog displays
    /// and searches.
    pub fn localized_title(&self) -> Option<&str> {
        self.titles.en_jp.as_deref()
    }

    /// Best available title for display.
    pub fn display_title(&self) -> &str {
        self.localized_title()
            .or(self.canonical_title.as_deref())
            .or(self.titles.en.as_deref())
            .or(self.titles.ja_jp.as_deref())
            .unwrap_or("Unknown")
    }

    pub fn poster_url(&self) -> Option<&str> {
        self.poster_image.as_ref().and_then(ImageSet::best)
    }
}

/// An episode belonging to an anime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub id: String,
    pub titles: Titles,
    pub canonical_title: Option<String>,
    pub season_number: Option<u32>,
    pub number: Option<u32>,
    pub synopsis: Option<String>,
    pub air_date: Option<String>,
    /// Runtime in minutes.
    pub length: Option<u32>,
}

impl EpisodeRecord {
    pub fn display_title(&self) -> &str {
        self.titles
            .en_jp
            .as_deref()
            .or(self.canonical_title.as_deref())
            .or(self.titles.en.as_deref())
            .unwrap_or("")
    }
}

/// A page of list results.
#[derive(Debug, Clone, Default)]
pub struct AnimePage {
    pub items: Vec<AnimeRecord>,
    pub has_next: bool,
    /// Total number of records in the catalog, when the service reports it.
    pub total: Option<u64>,
}
