//! Catalog query façade
//!
//! Stateless-per-request wrapper over the store: normalizes client input,
//! computes pagination and caches search results.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{CatalogKind, EpisodeEntry, ListPage, SearchResults};
use crate::services::catalog_store::CatalogStore;

const DEFAULT_PAGE: usize = 1;

/// Pagination and search limits
#[derive(Debug, Clone, Copy)]
pub struct QueryLimits {
    pub default_page_limit: usize,
    pub max_page_limit: usize,
    pub search_limit: usize,
    pub search_cache_ttl: Duration,
    pub search_cache_max_entries: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            default_page_limit: 24,
            max_page_limit: 500,
            search_limit: 50,
            search_cache_ttl: Duration::from_secs(300),
            search_cache_max_entries: 1000,
        }
    }
}

impl From<&Config> for QueryLimits {
    fn from(config: &Config) -> Self {
        Self {
            default_page_limit: config.default_page_limit.max(1),
            max_page_limit: config.max_page_limit.max(1),
            search_limit: config.search_limit.max(1),
            search_cache_ttl: Duration::from_secs(config.search_cache_ttl_secs),
            search_cache_max_entries: config.search_cache_max_entries,
        }
    }
}

struct CachedSearch {
    cached_at: Instant,
    generation: u64,
    results: SearchResults,
}

pub struct CatalogQuery {
    store: Arc<CatalogStore>,
    limits: QueryLimits,
    search_cache: Mutex<LruCache<String, CachedSearch>>,
}

impl CatalogQuery {
    pub fn new(store: Arc<CatalogStore>, limits: QueryLimits) -> Self {
        let capacity = NonZeroUsize::new(limits.search_cache_max_entries).unwrap_or(NonZeroUsize::MIN);

        Self {
            store,
            limits,
            search_cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Paginated listing for a kind label
    pub async fn list(
        &self,
        kind_label: &str,
        page: Option<&str>,
        limit: Option<&str>,
    ) -> CatalogResult<ListPage> {
        let kind = CatalogKind::from_label(kind_label)
            .ok_or_else(|| CatalogError::InvalidQuery(format!("unknown catalog kind '{}'", kind_label)))?;

        let page = parse_positive(page, DEFAULT_PAGE);
        let limit = parse_positive(limit, self.limits.default_page_limit).min(self.limits.max_page_limit);

        let (items, total_items) = self.store.page_with_total(kind, page, limit).await?;

        tracing::debug!(kind = %kind, page, limit, total_items, "Listing served");

        Ok(ListPage {
            page,
            total_pages: total_items.div_ceil(limit),
            total_items,
            items,
        })
    }

    /// Ordered episodes, or None when the series has none
    pub async fn series_episodes(&self, name: &str) -> CatalogResult<Option<Vec<EpisodeEntry>>> {
        let episodes = self.store.episodes_by_series(name).await?;

        if episodes.is_empty() {
            Ok(None)
        } else {
            Ok(Some(episodes))
        }
    }

    /// Cross-kind search with a TTL cache keyed by the normalized term
    pub async fn search(&self, term: &str) -> CatalogResult<SearchResults> {
        let key = term.trim().to_lowercase();
        let generation = self.store.generation();

        if let Some(results) = self.cached(&key, generation) {
            tracing::debug!(term = %key, "Search cache hit");
            return Ok(results);
        }

        let results = self.store.search(&key, self.limits.search_limit).await?;
        tracing::debug!(term = %key, empty = results.is_empty(), "Search served");

        if let Ok(mut cache) = self.search_cache.lock() {
            cache.put(
                key,
                CachedSearch {
                    cached_at: Instant::now(),
                    generation,
                    results: results.clone(),
                },
            );
        }

        Ok(results)
    }

    fn cached(&self, key: &str, generation: u64) -> Option<SearchResults> {
        let mut cache = self.search_cache.lock().ok()?;

        let fresh = match cache.get(key) {
            Some(entry) => {
                entry.generation == generation && entry.cached_at.elapsed() < self.limits.search_cache_ttl
            }
            None => return None,
        };

        if fresh {
            cache.get(key).map(|entry| entry.results.clone())
        } else {
            cache.pop(key);
            None
        }
    }
}

/// Parse a client integer; missing or unparsable falls back, values below 1 clamp to 1
fn parse_positive(raw: Option<&str>, fallback: usize) -> usize {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => match s.parse::<i64>() {
            Ok(n) if n >= 1 => usize::try_from(n).unwrap_or(usize::MAX),
            Ok(_) => 1,
            Err(_) => fallback,
        },
        None => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogEntry, ClassifiedCatalog};
    use crate::services::catalog_store::tests::{open_store, raw, sample_catalog, snapshot};

    async fn query_over(catalog: ClassifiedCatalog) -> (tempfile::TempDir, Arc<CatalogStore>, CatalogQuery) {
        let (dir, store) = open_store().await;
        store.import(&snapshot(catalog)).await.unwrap();
        let store = Arc::new(store);
        let query = CatalogQuery::new(store.clone(), QueryLimits::default());
        (dir, store, query)
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive(None, 24), 24);
        assert_eq!(parse_positive(Some(""), 24), 24);
        assert_eq!(parse_positive(Some("abc"), 24), 24);
        assert_eq!(parse_positive(Some("0"), 24), 1);
        assert_eq!(parse_positive(Some("-3"), 24), 1);
        assert_eq!(parse_positive(Some(" 7 "), 24), 7);
    }

    #[tokio::test]
    async fn test_list_second_page() {
        let (_dir, _store, query) = query_over(sample_catalog(25)).await;

        let page = query.list("movie", Some("2"), Some("10")).await.unwrap();

        assert_eq!(page.page, 2);
        assert_eq!(page.total_items, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 10);
        match &page.items[0] {
            CatalogEntry::Item(item) => assert_eq!(item.entry().name, "Movie 11"),
            other => panic!("unexpected entry {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_defaults_and_clamps() {
        let (_dir, _store, query) = query_over(sample_catalog(30)).await;

        let page = query.list("Movies", None, Some("nope")).await.unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 24);
        assert_eq!(page.total_pages, 2);

        let page = query.list("movies", Some("0"), Some("100000")).await.unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 30);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn test_list_huge_page_is_empty() {
        let (_dir, _store, query) = query_over(sample_catalog(25)).await;

        let page = query
            .list("movie", Some("9223372036854775807"), Some("10"))
            .await
            .unwrap();

        assert_eq!(page.page, 9_223_372_036_854_775_807);
        assert_eq!(page.total_items, 25);
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_list_unknown_kind_is_invalid() {
        let (_dir, _store, query) = query_over(sample_catalog(1)).await;

        let err = query.list("podcasts", None, None).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_list_empty_kind_has_zero_pages() {
        let (_dir, _store, query) = query_over(sample_catalog(0)).await;

        let page = query.list("movie", None, None).await.unwrap();
        assert_eq!(page.total_items, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_series_episodes_missing_is_none() {
        let (_dir, _store, query) = query_over(sample_catalog(0)).await;

        let episodes = query.series_episodes("dark").await.unwrap().unwrap();
        assert_eq!(episodes.len(), 2);
        assert!(query.series_episodes("Unknown Show").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_normalizes_and_caches_per_generation() {
        let (_dir, store, query) = query_over(sample_catalog(2)).await;

        let first = query.search("  GLOBO ").await.unwrap();
        assert_eq!(first.channels.len(), 1);
        assert!(query.cached("globo", store.generation()).is_some());

        let mut changed = sample_catalog(2);
        changed.channels.push(raw("Globo News", "http://h/live/9.ts"));
        store.import(&snapshot(changed)).await.unwrap();

        let second = query.search("globo").await.unwrap();
        assert_eq!(second.channels.len(), 2);
    }

    #[tokio::test]
    async fn test_search_zero_matches() {
        let (_dir, _store, query) = query_over(sample_catalog(2)).await;

        let results = query.search("no-such-title").await.unwrap();
        assert!(results.channels.is_empty());
        assert!(results.movies.is_empty());
        assert!(results.series.is_empty());
    }

    #[tokio::test]
    async fn test_expired_cache_entry_is_dropped() {
        let (dir, store) = open_store().await;
        store.import(&snapshot(sample_catalog(2))).await.unwrap();
        let limits = QueryLimits {
            search_cache_ttl: Duration::ZERO,
            ..QueryLimits::default()
        };
        let query = CatalogQuery::new(Arc::new(store), limits);

        query.search("movie").await.unwrap();
        assert!(query.cached("movie", 1).is_none());
        drop(dir);
    }
}
