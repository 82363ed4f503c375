use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::error::KitsuError;
use super::types::{JsonApiListResponse, JsonApiResource, JsonApiSingleResourceResponse};
use crate::traits::{AnimePage, AnimeRecord, CatalogService, EpisodeRecord};

pub const DEFAULT_BASE_URL: &str = "https://kitsu.io/api/edge/";

const JSON_API: &str = "application/vnd.api+json";

/// Read-only Kitsu JSON:API client.
pub struct KitsuClient {
    base_url: Url,
    http: Client,
}

impl KitsuClient {
    /// Create a client rooted at `base_url`. A missing trailing slash is
    /// added so that relative paths join under the API root.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, KitsuError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            http: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, KitsuError> {
        Ok(self.base_url.join(path)?)
    }

    /// `anime/{id}` plus optional trailing segments, for a caller-supplied id.
    fn anime_endpoint(&self, id: &str, rest: &str) -> Result<Url, KitsuError> {
        let id = checked_id(id)?;
        self.endpoint(&format!("anime/{id}{rest}"))
    }

    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, KitsuError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "Kitsu API error");
            Err(KitsuError::Api {
                status,
                message: body,
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, KitsuError> {
        tracing::debug!(url = %url, ?query, "Kitsu request");

        let resp = self
            .http
            .get(url)
            .header("Accept", JSON_API)
            .query(query)
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| KitsuError::Parse(e.to_string()))
    }
}

impl CatalogService for KitsuClient {
    type Error = KitsuError;

    async fn list_anime(&self, offset: u32, limit: u32) -> Result<AnimePage, KitsuError> {
        let url = self.endpoint("anime")?;
        let body: JsonApiListResponse = self.get_json(url, &page_query(offset, limit)).await?;

        let has_next = body.links.as_ref().and_then(|l| l.next.as_ref()).is_some();
        let total = body.meta.and_then(|m| m.count);
        let items = decode_each(body.data, "anime", JsonApiResource::into_anime);

        Ok(AnimePage {
            items,
            has_next,
            total,
        })
    }

    async fn get_anime(&self, id: &str) -> Result<AnimeRecord, KitsuError> {
        let url = self.anime_endpoint(id, "")?;
        let body: JsonApiSingleResourceResponse = self.get_json(url, &[]).await?;
        body.data
            .into_anime()
            .map_err(|e| KitsuError::Parse(e.to_string()))
    }

    async fn list_episodes(
        &self,
        anime_id: &str,
        limit: u32,
    ) -> Result<Vec<EpisodeRecord>, KitsuError> {
        let url = self.anime_endpoint(anime_id, "/episodes")?;
        let body: JsonApiListResponse = self
            .get_json(url, &[("page[limit]", limit.to_string())])
            .await?;

        Ok(decode_each(body.data, "episodes", JsonApiResource::into_episode))
    }
}

fn parse_base_url(raw: &str) -> Result<Url, KitsuError> {
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{raw}/"))?)
    }
}

/// Decode every resource, logging and skipping the ones that do not fit.
fn decode_each<T>(
    resources: Vec<JsonApiResource>,
    kind: &str,
    decode: fn(JsonApiResource) -> Result<T, serde_json::Error>,
) -> Vec<T> {
    resources
        .into_iter()
        .filter_map(|r| {
            let id = r.id.clone();
            match decode(r) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(id = %id, kind, error = %e, "Skipping undecodable record");
                    None
                }
            }
        })
        .collect()
}

/// Kitsu ids and slugs are ASCII alphanumerics with `-` or `_`; anything
/// else would change the request path or query.
fn checked_id(id: &str) -> Result<&str, KitsuError> {
    let valid = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(id)
    } else {
        Err(KitsuError::InvalidId(id.to_string()))
    }
}

/// Query parameters for one page of an offset-paginated list.
fn page_query(offset: u32, limit: u32) -> [(&'static str, String); 2] {
    [
        ("page[limit]", limit.to_string()),
        ("page[offset]", offset.to_string()),
    ]
}
