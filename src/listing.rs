//! Paginated, counted image listings.
//!
//! This is the only fallible step between a URL and a page of images: the
//! codec and compiler degrade to defaults, while a store failure is surfaced
//! as-is with no partial results.

use serde::Serialize;
use thiserror::Error;

use crate::codec;
use crate::config::ListingConfig;
use crate::db::{ImageRecord, ImageStore};
use crate::filter::{Filter, FilterModel, SortOrder, DEFAULT_SORT_KEY};
use crate::query;

#[derive(Error, Debug)]
pub enum ListingError {
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl ListingError {
    /// Text safe to show an end user; details go to the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            ListingError::Store(_) => "Failed to fetch images.",
        }
    }
}

pub type Result<T> = std::result::Result<T, ListingError>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    pub items: Vec<ImageRecord>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
    /// Canonical query string of the request this page answers.
    pub query: String,
}

pub struct ListingService<S> {
    store: S,
    settings: ListingConfig,
}

impl<S: ImageStore> ListingService<S> {
    pub fn new(store: S, settings: ListingConfig) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// List one page for an explicit sort and pagination.
    pub fn list(
        &self,
        filters: &FilterModel,
        sort_key: &str,
        sort_order: SortOrder,
        page: u32,
        page_size: u32,
    ) -> Result<ListingPage> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, self.settings.max_page_size.max(1));

        let compiled = query::compile(filters, sort_key, sort_order);
        let skip = u64::from(page - 1) * u64::from(page_size);
        let take = u64::from(page_size);

        let mut snapshot = filters.clone();
        snapshot.sort_key = sort_key.to_string();
        snapshot.sort_order = sort_order;
        snapshot.page = page;
        snapshot.page_size = Some(page_size);
        let query = codec::encode(&snapshot);

        let (items, total_count) = self
            .store
            .list_page(&compiled.predicate, &compiled.order, skip, take)
            .map_err(|e| {
                tracing::error!(error = %format!("{e:#}"), query = %query, "Failed to fetch images");
                ListingError::Store(e)
            })?;

        tracing::debug!(
            query = %query,
            returned = items.len(),
            total = total_count,
            "Listed images"
        );

        Ok(ListingPage {
            items,
            total_count,
            page,
            page_size,
            total_pages: total_count.div_ceil(u64::from(page_size)),
            query,
        })
    }

    /// List using the sort and pagination carried by the model.
    pub fn list_model(&self, model: &FilterModel) -> Result<ListingPage> {
        let page_size = model.page_size.unwrap_or(self.settings.default_page_size);
        self.list(model, &model.sort_key, model.sort_order, model.page, page_size)
    }

    /// Decode a URL query string and list it.
    pub fn list_query(&self, query: &str) -> Result<ListingPage> {
        self.list_model(&codec::decode(query))
    }

    /// Every image of one post, in default order. Pages through the store
    /// so posts larger than `max_page_size` come back whole.
    pub fn post_images(&self, post_id: i64) -> Result<Vec<ImageRecord>> {
        let filters = FilterModel::new().with(Filter::PostId(post_id));
        let mut images = Vec::new();
        let mut page = 1;
        loop {
            let listing = self.list(
                &filters,
                DEFAULT_SORT_KEY,
                SortOrder::default(),
                page,
                self.settings.max_page_size,
            )?;
            let exhausted = listing.items.is_empty() || u64::from(page) >= listing.total_pages;
            images.extend(listing.items);
            if exhausted {
                return Ok(images);
            }
            page += 1;
        }
    }

    pub fn artists(&self) -> Result<Vec<String>> {
        self.store.distinct_artists().map_err(|e| {
            tracing::error!(error = %format!("{e:#}"), "Failed to fetch artists");
            ListingError::Store(e)
        })
    }

    pub fn image(&self, id: i64) -> Result<Option<ImageRecord>> {
        self.store.get_image(id).map_err(|e| {
            tracing::error!(error = %format!("{e:#}"), id, "Failed to fetch image");
            ListingError::Store(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_fixtures::{image, post};
    use crate::db::SqliteDb;
    use crate::query::{ImagePredicate, OrderSpec};

    fn service_with(count: i64) -> ListingService<SqliteDb> {
        let db = SqliteDb::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.insert_post(&post(1, "ansel")).unwrap();
        db.insert_post(&post(2, "vivian")).unwrap();
        for id in 1..=count {
            let post_id = if id % 2 == 0 { 2 } else { 1 };
            let username = if post_id == 2 { "vivian" } else { "ansel" };
            let mut img = image(id, post_id, username);
            if let Some(l) = img.luminance.as_mut() {
                l.mean_luminance = id as f64;
            }
            db.insert_image(&img).unwrap();
        }
        ListingService::new(db, ListingConfig::default())
    }

    struct FailingStore;

    impl ImageStore for FailingStore {
        fn list_page(
            &self,
            _: &ImagePredicate,
            _: &OrderSpec,
            _: u64,
            _: u64,
        ) -> anyhow::Result<(Vec<ImageRecord>, u64)> {
            Err(anyhow::anyhow!("database is locked"))
        }

        fn distinct_artists(&self) -> anyhow::Result<Vec<String>> {
            Err(anyhow::anyhow!("database is locked"))
        }

        fn get_image(&self, _: i64) -> anyhow::Result<Option<ImageRecord>> {
            Err(anyhow::anyhow!("database is locked"))
        }
    }

    #[test]
    fn test_first_page_and_count() {
        let service = service_with(12);
        let page = service.list_query("pageSize=5").unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_count, 12);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_page_beyond_last_is_empty_not_error() {
        let service = service_with(6);
        let page = service.list_query("page=1000&pageSize=50").unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 6);
    }

    #[test]
    fn test_pages_do_not_overlap() {
        let service = service_with(9);
        let model = codec::decode("sortKey=Luminance%3Bmean_luminance&sortOrder=asc");
        let first = service.list(&model, &model.sort_key, model.sort_order, 1, 4).unwrap();
        let second = service.list(&model, &model.sort_key, model.sort_order, 2, 4).unwrap();
        let ids: Vec<i64> = first.items.iter().chain(&second.items).map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_default_page_size_from_config() {
        let service = service_with(3);
        let page = service.list_query("").unwrap();
        assert_eq!(page.page_size, 50);
        assert_eq!(page.query, "page=1&pageSize=50&sortKey=post%3Bpost_date&sortOrder=desc");
    }

    #[test]
    fn test_page_size_is_clamped() {
        let service = service_with(3);
        let page = service.list_query("pageSize=100000").unwrap();
        assert_eq!(page.page_size, 500);
    }

    #[test]
    fn test_post_images_and_artists() {
        let service = service_with(7);
        let images = service.post_images(2).unwrap();
        assert_eq!(images.len(), 3);
        assert!(images.iter().all(|i| i.post_id == 2));
        assert_eq!(service.artists().unwrap(), vec!["ansel", "vivian"]);
        assert_eq!(service.image(4).unwrap().map(|i| i.id), Some(4));
    }

    #[test]
    fn test_post_images_spans_pages() {
        let mut service = service_with(15);
        service.settings.max_page_size = 2;
        let images = service.post_images(1).unwrap();
        assert_eq!(images.len(), 8);
        let mut ids: Vec<i64> = images.iter().map(|i| i.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids, vec![1, 3, 5, 7, 9, 11, 13, 15]);
    }

    #[test]
    fn test_store_failure_surfaces_without_partial_results() {
        let service = ListingService::new(FailingStore, ListingConfig::default());
        let err = service.list_query("artist=ansel").unwrap_err();
        assert_eq!(err.user_message(), "Failed to fetch images.");
        assert!(err.to_string().contains("database is locked"));
        assert!(service.artists().is_err());
        assert!(service.image(1).is_err());
    }
}
