//! Offset-paginated anime list accumulated across page fetches.

use animelist_api::traits::{AnimePage, AnimeRecord, CatalogService};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// One in-flight page fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub offset: u32,
    pub limit: u32,
}

/// The loaded portion of the remote catalog plus fetch state.
pub struct Catalog<S> {
    service: S,
    page_size: u32,
    items: Option<Vec<AnimeRecord>>,
    loading: bool,
    error: Option<String>,
    next_page: u32,
    has_more: bool,
    total: Option<u64>,
}

impl<S: CatalogService> Catalog<S> {
    pub fn new(service: S, page_size: u32) -> Self {
        Self {
            service,
            page_size: page_size.max(1),
            items: None,
            loading: false,
            error: None,
            next_page: 0,
            has_more: true,
            total: None,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Loaded records, or `None` before the first page has arrived.
    pub fn items(&self) -> Option<&[AnimeRecord]> {
        self.items.as_deref()
    }

    pub fn len(&self) -> usize {
        self.items.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed fetch, cleared by the next success.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Number of pages fetched successfully so far.
    pub fn pages_loaded(&self) -> u32 {
        self.next_page
    }

    /// Mark a fetch of the next page as in flight and describe it.
    ///
    /// Returns `None` when the catalog is exhausted or a fetch is already
    /// running. Pair every request with [`Catalog::finish_load`].
    pub fn start_load(&mut self) -> Option<PageRequest> {
        if !self.has_more || self.loading {
            return None;
        }
        let page = self.next_page;
        let request = PageRequest {
            page,
            offset: page.saturating_mul(self.page_size),
            limit: self.page_size,
        };
        self.loading = true;
        tracing::debug!(
            page,
            offset = request.offset,
            limit = request.limit,
            "Fetching anime page"
        );
        Some(request)
    }

    /// Apply the outcome of a fetch started by [`Catalog::start_load`].
    ///
    /// Returns how many records were added. A failure is recorded in
    /// [`Catalog::error`] and leaves the loaded records and the page counter
    /// alone, so the same page is requested again next time.
    pub fn finish_load<E: std::fmt::Display>(
        &mut self,
        request: PageRequest,
        result: Result<AnimePage, E>,
    ) -> usize {
        self.loading = false;
        let page = request.page;

        match result {
            Ok(fetched) => {
                self.error = None;
                self.next_page = page + 1;
                self.has_more = fetched.has_next;
                if fetched.total.is_some() {
                    self.total = fetched.total;
                }
                let added = self.merge(fetched.items);
                tracing::info!(page, added, loaded = self.len(), "Anime page loaded");
                added
            }
            Err(e) => {
                tracing::warn!(page, error = %e, "Anime page fetch failed");
                self.error = Some(e.to_string());
                0
            }
        }
    }

    /// Fetch the next page and append the records not already present.
    /// Returns how many records were added.
    pub async fn load_next(&mut self) -> usize {
        let Some(request) = self.start_load() else {
            return 0;
        };
        let result = self.service.list_anime(request.offset, request.limit).await;
        self.finish_load(request, result)
    }

    /// Alias used by the scroll handler.
    pub async fn refetch(&mut self) -> usize {
        self.load_next().await
    }

    fn merge(&mut self, fetched: Vec<AnimeRecord>) -> usize {
        let items = self.items.get_or_insert_with(Vec::new);
        let before = items.len();
        for record in fetched {
            if !items.iter().any(|existing| existing.id == record.id) {
                items.push(record);
            }
        }
        items.len() - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use animelist_api::traits::EpisodeRecord;
    use std::sync::Mutex;

    #[derive(Debug, thiserror::Error)]
    #[error("network unreachable")]
    struct FakeError;

    /// Serves scripted pages and records the requested offsets.
    struct FakeCatalog {
        pages: Mutex<Vec<Result<AnimePage, FakeError>>>,
        offsets: Mutex<Vec<(u32, u32)>>,
    }

    impl FakeCatalog {
        fn new(pages: Vec<Result<AnimePage, FakeError>>) -> Self {
            Self {
                pages: Mutex::new(pages),
                offsets: Mutex::new(Vec::new()),
            }
        }

        fn offsets(&self) -> Vec<(u32, u32)> {
            self.offsets.lock().unwrap().clone()
        }
    }

    impl CatalogService for FakeCatalog {
        type Error = FakeError;

        async fn list_anime(&self, offset: u32, limit: u32) -> Result<AnimePage, FakeError> {
            self.offsets.lock().unwrap().push((offset, limit));
            self.pages.lock().unwrap().remove(0)
        }

        async fn get_anime(&self, id: &str) -> Result<AnimeRecord, FakeError> {
            Ok(record(id))
        }

        async fn list_episodes(
            &self,
            _anime_id: &str,
            _limit: u32,
        ) -> Result<Vec<EpisodeRecord>, FakeError> {
            Ok(Vec::new())
        }
    }

    fn record(id: &str) -> AnimeRecord {
        AnimeRecord {
            id: id.into(),
            ..Default::default()
        }
    }

    fn page(ids: &[&str], has_next: bool) -> Result<AnimePage, FakeError> {
        Ok(AnimePage {
            items: ids.iter().map(|id| record(id)).collect(),
            has_next,
            total: Some(100),
        })
    }

    fn ids<S: CatalogService>(catalog: &Catalog<S>) -> Vec<String> {
        catalog
            .items()
            .unwrap_or_default()
            .iter()
            .map(|r| r.id.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_pages_use_incrementing_offset() {
        let fake = FakeCatalog::new(vec![page(&["1", "2"], true), page(&["3", "4"], true)]);
        let mut catalog = Catalog::new(fake, 2);

        assert!(catalog.items().is_none());
        assert_eq!(catalog.load_next().await, 2);
        assert_eq!(catalog.refetch().await, 2);

        assert_eq!(catalog.service().offsets(), vec![(0, 2), (2, 2)]);
        assert_eq!(ids(&catalog), vec!["1", "2", "3", "4"]);
        assert_eq!(catalog.pages_loaded(), 2);
        assert_eq!(catalog.total(), Some(100));
    }

    #[tokio::test]
    async fn test_repeated_records_are_deduplicated() {
        let fake = FakeCatalog::new(vec![
            page(&["1", "2", "3"], true),
            page(&["3", "2", "4"], true),
        ]);
        let mut catalog = Catalog::new(fake, 3);

        catalog.load_next().await;
        assert_eq!(catalog.load_next().await, 1);
        assert_eq!(ids(&catalog), vec!["1", "2", "3", "4"]);
    }

    #[tokio::test]
    async fn test_failure_keeps_data_and_retries_same_page() {
        let fake = FakeCatalog::new(vec![
            page(&["1"], true),
            Err(FakeError),
            page(&["2"], true),
        ]);
        let mut catalog = Catalog::new(fake, 1);

        catalog.load_next().await;
        assert_eq!(catalog.load_next().await, 0);
        assert_eq!(catalog.error(), Some("network unreachable"));
        assert!(!catalog.is_loading());
        assert_eq!(ids(&catalog), vec!["1"]);

        catalog.load_next().await;
        assert!(catalog.error().is_none());
        assert_eq!(ids(&catalog), vec!["1", "2"]);
        assert_eq!(catalog.service().offsets(), vec![(0, 1), (1, 1), (1, 1)]);
    }

    #[tokio::test]
    async fn test_first_page_failure_leaves_items_unset() {
        let fake = FakeCatalog::new(vec![Err(FakeError)]);
        let mut catalog = Catalog::new(fake, DEFAULT_PAGE_SIZE);

        catalog.load_next().await;
        assert!(catalog.items().is_none());
        assert!(catalog.error().is_some());
        assert_eq!(catalog.pages_loaded(), 0);
    }

    #[tokio::test]
    async fn test_loading_while_request_in_flight() {
        let fake = FakeCatalog::new(vec![page(&["1", "2"], true), page(&["3"], true)]);
        let mut catalog = Catalog::new(fake, 2);

        let request = catalog.start_load().unwrap();
        assert!(catalog.is_loading());
        assert_eq!(request.offset, 0);
        assert!(catalog.start_load().is_none());

        let result = catalog.service().list_anime(request.offset, request.limit).await;
        assert_eq!(catalog.finish_load(request, result), 2);
        assert!(!catalog.is_loading());

        let next = catalog.start_load().unwrap();
        assert_eq!((next.page, next.offset), (1, 2));
    }

    #[tokio::test]
    async fn test_loading_cleared_after_failure() {
        let fake = FakeCatalog::new(vec![Err(FakeError)]);
        let mut catalog = Catalog::new(fake, 5);

        let request = catalog.start_load().unwrap();
        assert!(catalog.is_loading());
        let result = catalog.service().list_anime(request.offset, request.limit).await;
        catalog.finish_load(request, result);
        assert!(!catalog.is_loading());
        assert_eq!(catalog.error(), Some("network unreachable"));
        assert_eq!(catalog.start_load().map(|r| r.page), Some(0));
    }

    #[tokio::test]
    async fn test_stops_after_last_page() {
        let fake = FakeCatalog::new(vec![page(&["1"], false)]);
        let mut catalog = Catalog::new(fake, 1);

        catalog.load_next().await;
        assert!(!catalog.has_more());
        assert_eq!(catalog.load_next().await, 0);
        assert_eq!(catalog.service().offsets().len(), 1);
    }
}
