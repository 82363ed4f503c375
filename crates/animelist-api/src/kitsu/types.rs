use serde::Deserialize;

use crate::traits::{AnimeRecord, EpisodeRecord, ImageSet, Titles};

// ── JSON:API response types ──────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JsonApiListResponse {
    pub data: Vec<JsonApiResource>,
    pub links: Option<Links>,
    pub meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
pub struct JsonApiSingleResourceResponse {
    pub data: JsonApiResource,
}

#[derive(Debug, Deserialize)]
pub struct JsonApiResource {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub attributes: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct Links {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Meta {
    pub count: Option<u64>,
}

// ── Kitsu attribute types ────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KitsuAnimeAttributes {
    pub slug: Option<String>,
    pub synopsis: Option<String>,
    pub titles: Option<KitsuTitles>,
    pub canonical_title: Option<String>,
    pub abbreviated_titles: Option<Vec<String>>,
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
    pub poster_image: Option<KitsuImage>,
    pub cover_image: Option<KitsuImage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KitsuEpisodeAttributes {
    pub titles: Option<KitsuTitles>,
    pub canonical_title: Option<String>,
    pub season_number: Option<u32>,
    pub number: Option<u32>,
    pub synopsis: Option<String>,
    #[serde(alias = "airDate")]
    pub airdate: Option<String>,
    pub length: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KitsuTitles {
    pub en: Option<String>,
    pub en_jp: Option<String>,
    pub ja_jp: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KitsuImage {
    pub tiny: Option<String>,
    pub small: Option<String>,
    pub medium: Option<String>,
    pub large: Option<String>,
    pub original: Option<String>,
}

// ── Conversions ──────────────────────────────────────────────────

impl From<KitsuTitles> for Titles {
    fn from(t: KitsuTitles) -> Self {
        Titles {
            en: t.en,
            en_jp: t.en_jp,
            ja_jp: t.ja_jp,
        }
    }
}

impl From<KitsuImage> for ImageSet {
    fn from(i: KitsuImage) -> Self {
        ImageSet {
            tiny: i.tiny,
            small: i.small,
            medium: i.medium,
            large: i.large,
            original: i.original,
        }
    }
}

impl KitsuAnimeAttributes {
    pub fn into_record(self, id: String) -> AnimeRecord {
        AnimeRecord {
            id,
            slug: self.slug,
            synopsis: self.synopsis,
            titles: self.titles.map(Titles::from).unwrap_or_default(),
            canonical_title: self.canonical_title,
            abbreviated_titles: self.abbreviated_titles.unwrap_or_default(),
            average_rating: self.average_rating,
            user_count: self.user_count,
            favorites_count: self.favorites_count,
            start_date: self.start_date,
            end_date: self.end_date,
            popularity_rank: self.popularity_rank,
            rating_rank: self.rating_rank,
            age_rating: self.age_rating,
            age_rating_guide: self.age_rating_guide,
            subtype: self.subtype,
            status: self.status,
            episode_count: self.episode_count,
            poster_image: self.poster_image.map(ImageSet::from),
            cover_image: self.cover_image.map(ImageSet::from),
        }
    }
}

impl KitsuEpisodeAttributes {
    pub fn into_record(self, id: String) -> EpisodeRecord {
        EpisodeRecord {
            id,
            titles: self.titles.map(Titles::from).unwrap_or_default(),
            canonical_title: self.canonical_title,
            season_number: self.season_number,
            number: self.number,
            synopsis: self.synopsis,
            air_date: self.airdate,
            length: self.length,
        }
    }
}

impl JsonApiResource {
    pub fn into_anime(self) -> Result<AnimeRecord, serde_json::Error> {
        let attrs: KitsuAnimeAttributes = decode_attributes(self.attributes)?;
        Ok(attrs.into_record(self.id))
    }

    pub fn into_episode(self) -> Result<EpisodeRecord, serde_json::Error> {
        let attrs: KitsuEpisodeAttributes = decode_attributes(self.attributes)?;
        Ok(attrs.into_record(self.id))
    }
}

/// A resource without an `attributes` member decodes to all-`None`.
fn decode_attributes<T>(value: serde_json::Value) -> Result<T, serde_json::Error>
where
    T: Default + serde::de::DeserializeOwned,
{
    if value.is_null() {
        Ok(T::default())
    } else {
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_FIXTURE: &str = r#"{
        "data": [
            {
                "id": "1",
                "type": "anime",
                "links": { "self": "https://kitsu.io/api/edge/anime/1" },
                "attributes": {
                    "createdAt": "2013-02-20T16:00:13.609Z",
                    "slug": "cowboy-bebop",
                    "synopsis": "In the year 2071...",
                    "coverImageTopOffset": 400,
                    "titles": {
                        "en": "Cowboy Bebop",
                        "en_jp": "Cowboy Bebop",
                        "ja_jp": "カウボーイビバップ"
                    },
                    "canonicalTitle": "Cowboy Bebop",
                    "abbreviatedTitles": ["COWBOY BEBOP"],
                    "averageRating": "82.79",
                    "ratingFrequencies": { "2": "4136" },
                    "userCount": 146417,
                    "favoritesCount": 4498,
                    "startDate": "1998-04-03",
                    "endDate": "1999-04-24",
                    "nextRelease": null,
                    "popularityRank": 28,
                    "ratingRank": 28,
                    "ageRating": "R",
                    "ageRatingGuide": "17+ (violence & profanity)",
                    "subtype": "TV",
                    "status": "finished",
                    "tba": "",
                    "posterImage": {
                        "tiny": "https://media.kitsu.io/anime/poster_images/1/tiny.jpg",
                        "medium": "https://media.kitsu.io/anime/poster_images/1/medium.jpg",
                        "meta": { "dimensions": { "tiny": { "width": 110, "height": 156 } } }
                    },
                    "coverImage": null,
                    "episodeCount": 26
                }
            },
            {
                "id": "5",
                "type": "anime",
                "attributes": {
                    "titles": { "en_jp": "Cowboy Bebop: Tengoku no Tobira" },
                    "averageRating": null,
                    "abbreviatedTitles": null
                }
            }
        ],
        "meta": { "count": 19524 },
        "links": {
            "first": "https://kitsu.io/api/edge/anime?page%5Blimit%5D=10&page%5Boffset%5D=0",
            "next": "https://kitsu.io/api/edge/anime?page%5Blimit%5D=10&page%5Boffset%5D=10",
            "last": "https://kitsu.io/api/edge/anime?page%5Blimit%5D=10&page%5Boffset%5D=19514"
        }
    }"#;

    #[test]
    fn test_deserialize_anime_list() {
        let resp: JsonApiListResponse = serde_json::from_str(LIST_FIXTURE).unwrap();
        assert_eq!(resp.data.len(), 2);
        assert_eq!(resp.meta.and_then(|m| m.count), Some(19524));
        assert!(resp.links.and_then(|l| l.next).is_some());

        let records: Vec<AnimeRecord> = resp
            .data
            .into_iter()
            .map(|r| r.into_anime().unwrap())
            .collect();

        let bebop = &records[0];
        assert_eq!(bebop.id, "1");
        assert_eq!(bebop.localized_title(), Some("Cowboy Bebop"));
        assert_eq!(bebop.average_rating.as_deref(), Some("82.79"));
        assert_eq!(bebop.user_count, Some(146417));
        assert_eq!(bebop.favorites_count, Some(4498));
        assert_eq!(bebop.popularity_rank, Some(28));
        assert_eq!(bebop.episode_count, Some(26));
        assert_eq!(
            bebop.poster_url(),
            Some("https://media.kitsu.io/anime/poster_images/1/medium.jpg")
        );
        assert!(bebop.cover_image.is_none());

        let movie = &records[1];
        assert_eq!(movie.display_title(), "Cowboy Bebop: Tengoku no Tobira");
        assert!(movie.average_rating.is_none());
        assert!(movie.abbreviated_titles.is_empty());
    }

    #[test]
    fn test_deserialize_single_anime() {
        let json = r#"{
            "data": {
                "id": "12",
                "type": "anime",
                "attributes": {
                    "canonicalTitle": "One Piece",
                    "titles": { "en": "One Piece", "en_jp": "One Piece" },
                    "status": "current",
                    "startDate": "1999-10-20",
                    "endDate": null
                }
            }
        }"#;

        let resp: JsonApiSingleResourceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.data.type_, "anime");
        let record = resp.data.into_anime().unwrap();
        assert_eq!(record.id, "12");
        assert_eq!(record.status.as_deref(), Some("current"));
        assert!(record.end_date.is_none());
    }

    #[test]
    fn test_deserialize_episodes() {
        let json = r#"{
            "data": [
                {
                    "id": "41",
                    "type": "episodes",
                    "attributes": {
                        "titles": { "en_jp": "Asteroid Blues", "ja_jp": "アステロイド・ブルース" },
                        "canonicalTitle": "Asteroid Blues",
                        "seasonNumber": 1,
                        "number": 1,
                        "synopsis": "Spike and Jet pursue a drug dealer.",
                        "airdate": "1998-10-24",
                        "length": 25
                    }
                },
                {
                    "id": "42",
                    "type": "episodes",
                    "attributes": {
                        "titles": {},
                        "seasonNumber": null,
                        "number": 2,
                        "airDate": "1998-10-31"
                    }
                }
            ],
            "links": {}
        }"#;

        let resp: JsonApiListResponse = serde_json::from_str(json).unwrap();
        assert!(resp.links.and_then(|l| l.next).is_none());
        let episodes: Vec<EpisodeRecord> = resp
            .data
            .into_iter()
            .map(|r| r.into_episode().unwrap())
            .collect();

        assert_eq!(episodes[0].display_title(), "Asteroid Blues");
        assert_eq!(episodes[0].air_date.as_deref(), Some("1998-10-24"));
        assert_eq!(episodes[0].length, Some(25));
        assert_eq!(episodes[1].season_number, None);
        assert_eq!(episodes[1].air_date.as_deref(), Some("1998-10-31"));
        assert_eq!(episodes[1].display_title(), "");
    }

    #[test]
    fn test_resource_without_attributes() {
        let json = r#"{ "data": { "id": "7", "type": "anime" } }"#;
        let resp: JsonApiSingleResourceResponse = serde_json::from_str(json).unwrap();
        let record = resp.data.into_anime().unwrap();
        assert_eq!(record.id, "7");
        assert_eq!(record.display_title(), "Unknown");
    }
}
