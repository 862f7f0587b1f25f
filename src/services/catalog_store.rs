//! SQLite-backed catalog store
//!
//! Owns the pool and the import state machine
//! (`Uninitialized -> Importing -> Ready`). The state lives behind a tokio
//! `RwLock`: an import holds the write guard for its whole transaction, so
//! importers never interleave and readers wait only while an import is in
//! flight.

use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::{RwLock, RwLockReadGuard};

use crate::db::models::{NewEpisode, NewItem};
use crate::db::repository::{items, like_pattern, meta, series, ItemTable};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    CatalogEntry, CatalogKind, ClassifiedCatalog, EpisodeEntry, MediaKind, SearchResults, Snapshot,
};
use crate::services::snapshot::fingerprint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreState {
    Uninitialized,
    Importing,
    Ready,
}

/// Row counts written by one import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    pub movies: usize,
    pub channels: usize,
    pub episodes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The stored catalog already matches the snapshot fingerprint
    AlreadyCurrent,
    Imported(ImportStats),
}

/// Durable, indexed catalog of classified items
pub struct CatalogStore {
    pool: SqlitePool,
    state: RwLock<StoreState>,
    generation: AtomicU64,
}

impl CatalogStore {
    /// Open a store over a migrated pool
    ///
    /// Starts `Ready` when a previous import was committed.
    pub async fn open(pool: SqlitePool) -> CatalogResult<Self> {
        let initial = match meta::get(&pool, meta::KEY_FINGERPRINT).await? {
            Some(_) => StoreState::Ready,
            None => StoreState::Uninitialized,
        };

        tracing::info!(state = ?initial, "Catalog store opened");

        Ok(Self {
            pool,
            state: RwLock::new(initial),
            generation: AtomicU64::new(0),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Current state without waiting; a held write guard means an import is running
    pub fn state(&self) -> StoreState {
        match self.state.try_read() {
            Ok(state) => *state,
            Err(_) => StoreState::Importing,
        }
    }

    /// Incremented on every committed import
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Bulk-load a snapshot
    ///
    /// No-op when the recorded fingerprint matches. Otherwise clears all three
    /// tables and inserts every item in one transaction; any failure rolls the
    /// whole batch back and leaves the previous catalog visible.
    pub async fn import(&self, snapshot: &Snapshot) -> CatalogResult<ImportOutcome> {
        let mut state = self.state.write().await;
        let previous = *state;
        let fingerprint = fingerprint(&snapshot.catalog).map_err(|e| CatalogError::Snapshot {
            path: snapshot.source.clone().into(),
            message: e.to_string(),
        })?;

        let stored = meta::get(&self.pool, meta::KEY_FINGERPRINT).await?;
        if stored.as_deref() == Some(fingerprint.as_str()) {
            *state = StoreState::Ready;
            tracing::info!(fingerprint = %fingerprint, "Catalog already current, import skipped");
            return Ok(ImportOutcome::AlreadyCurrent);
        }

        *state = StoreState::Importing;
        let started = Instant::now();
        tracing::info!(source = %snapshot.source, "Catalog import started");

        match self.write_catalog(snapshot, &fingerprint).await {
            Ok(stats) => {
                *state = StoreState::Ready;
                self.generation.fetch_add(1, Ordering::AcqRel);
                tracing::info!(
                    movies = stats.movies,
                    channels = stats.channels,
                    episodes = stats.episodes,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Catalog import committed"
                );
                Ok(ImportOutcome::Imported(stats))
            }
            Err(e) => {
                *state = previous;
                tracing::error!(error = %e, "Catalog import rolled back");
                Err(e)
            }
        }
    }

    async fn write_catalog(&self, snapshot: &Snapshot, fingerprint: &str) -> CatalogResult<ImportStats> {
        let (movies, channels, episodes) = build_rows(snapshot)?;

        let mut tx = self.pool.begin().await.map_err(CatalogError::from_import)?;

        items::delete_all(&mut tx, ItemTable::Movies)
            .await
            .map_err(CatalogError::from_import)?;
        items::delete_all(&mut tx, ItemTable::Channels)
            .await
            .map_err(CatalogError::from_import)?;
        series::delete_all(&mut tx).await.map_err(CatalogError::from_import)?;

        let movie_count = items::insert_many(&mut tx, ItemTable::Movies, &movies)
            .await
            .map_err(CatalogError::from_import)?;
        let channel_count = items::insert_many(&mut tx, ItemTable::Channels, &channels)
            .await
            .map_err(CatalogError::from_import)?;
        let episode_count = series::upsert_many(&mut tx, &episodes)
            .await
            .map_err(CatalogError::from_import)?;

        meta::set(&mut tx, meta::KEY_FINGERPRINT, fingerprint)
            .await
            .map_err(CatalogError::from_import)?;
        meta::set(&mut tx, meta::KEY_IMPORTED_AT, &chrono::Utc::now().to_rfc3339())
            .await
            .map_err(CatalogError::from_import)?;

        tx.commit().await.map_err(CatalogError::from_import)?;

        Ok(ImportStats {
            movies: movie_count,
            channels: channel_count,
            episodes: episode_count,
        })
    }

    /// Read guard that only exists while the store is Ready
    async fn ready(&self) -> CatalogResult<RwLockReadGuard<'_, StoreState>> {
        let state = self.state.read().await;
        if *state != StoreState::Ready {
            return Err(CatalogError::NotReady);
        }
        Ok(state)
    }

    /// Items of a kind; distinct series names for series
    pub async fn count_by_kind(&self, kind: CatalogKind) -> CatalogResult<usize> {
        let _ready = self.ready().await?;
        self.count(kind).await
    }

    /// Page of stored-order records, `page` and `limit` starting at 1
    pub async fn page_by_kind(
        &self,
        kind: CatalogKind,
        page: usize,
        limit: usize,
    ) -> CatalogResult<Vec<CatalogEntry>> {
        let _ready = self.ready().await?;
        self.page(kind, page, limit).await
    }

    /// Page and total count read under one guard
    pub async fn page_with_total(
        &self,
        kind: CatalogKind,
        page: usize,
        limit: usize,
    ) -> CatalogResult<(Vec<CatalogEntry>, usize)> {
        let _ready = self.ready().await?;
        let total = self.count(kind).await?;
        let entries = self.page(kind, page, limit).await?;
        Ok((entries, total))
    }

    /// All episodes of a series, deduplicated and numerically ordered
    pub async fn episodes_by_series(&self, name: &str) -> CatalogResult<Vec<EpisodeEntry>> {
        let _ready = self.ready().await?;

        let rows = series::get_episodes(&self.pool, name).await?;
        Ok(rows.iter().filter_map(|row| row.decode_episode()).collect())
    }

    /// Case-insensitive substring search, capped per kind
    pub async fn search(&self, term: &str, limit: usize) -> CatalogResult<SearchResults> {
        let _ready = self.ready().await?;

        let pattern = like_pattern(term);
        let limit = limit.max(1) as i64;

        let channels = items::search(&self.pool, ItemTable::Channels, &pattern, limit)
            .await?
            .iter()
            .filter_map(|row| row.decode(ItemTable::Channels.name(), MediaKind::Channel))
            .collect();
        let movies = items::search(&self.pool, ItemTable::Movies, &pattern, limit)
            .await?
            .iter()
            .filter_map(|row| row.decode(ItemTable::Movies.name(), MediaKind::Movie))
            .collect();
        let series = series::search(&self.pool, &pattern, limit)
            .await?
            .into_iter()
            .filter_map(|row| row.into_summary_with_episode())
            .collect();

        Ok(SearchResults {
            channels,
            movies,
            series,
        })
    }

    /// Row totals for health reporting
    pub async fn stats(&self) -> CatalogResult<ImportStats> {
        let _ready = self.ready().await?;

        Ok(ImportStats {
            movies: items::count(&self.pool, ItemTable::Movies).await? as usize,
            channels: items::count(&self.pool, ItemTable::Channels).await? as usize,
            episodes: series::count_episodes(&self.pool).await? as usize,
        })
    }

    async fn count(&self, kind: CatalogKind) -> CatalogResult<usize> {
        let total = match kind {
            CatalogKind::Movie => items::count(&self.pool, ItemTable::Movies).await?,
            CatalogKind::Channel => items::count(&self.pool, ItemTable::Channels).await?,
            CatalogKind::Series => series::count_series(&self.pool).await?,
        };
        Ok(total.max(0) as usize)
    }

    async fn page(&self, kind: CatalogKind, page: usize, limit: usize) -> CatalogResult<Vec<CatalogEntry>> {
        let limit = limit.max(1);
        // An offset past i64::MAX lies beyond any stored row
        let offset = (page.max(1) - 1)
            .checked_mul(limit)
            .and_then(|offset| i64::try_from(offset).ok());
        let Some(offset) = offset else {
            return Ok(Vec::new());
        };
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let entries = match kind {
            CatalogKind::Movie | CatalogKind::Channel => {
                let table = if kind == CatalogKind::Movie {
                    ItemTable::Movies
                } else {
                    ItemTable::Channels
                };
                items::get_page(&self.pool, table, limit, offset)
                    .await?
                    .iter()
                    .filter_map(|row| row.decode(table.name(), table.kind()))
                    .map(CatalogEntry::Item)
                    .collect()
            }
            CatalogKind::Series => series::get_page(&self.pool, limit, offset)
                .await?
                .into_iter()
                .map(|row| CatalogEntry::Series(row.into_summary()))
                .collect(),
        };

        Ok(entries)
    }
}

type CatalogRows = (Vec<NewItem>, Vec<NewItem>, Vec<NewEpisode>);

fn build_rows(snapshot: &Snapshot) -> CatalogResult<CatalogRows> {
    let catalog: &ClassifiedCatalog = &snapshot.catalog;
    let to_error = |e: serde_json::Error| CatalogError::Snapshot {
        path: snapshot.source.clone().into(),
        message: e.to_string(),
    };

    let movies = catalog
        .movies
        .iter()
        .map(|m| NewItem::from_entry(m, MediaKind::Movie))
        .collect::<Result<Vec<_>, _>>()
        .map_err(to_error)?;
    let channels = catalog
        .channels
        .iter()
        .map(|c| NewItem::from_entry(c, MediaKind::Channel))
        .collect::<Result<Vec<_>, _>>()
        .map_err(to_error)?;
    let episodes = catalog
        .series
        .iter()
        .flat_map(|bucket| bucket.episodes.iter())
        .map(NewEpisode::from_episode)
        .collect::<Result<Vec<_>, _>>()
        .map_err(to_error)?;

    Ok((movies, channels, episodes))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::{connect, run_migrations};
    use crate::models::{RawEntry, SeriesBucket};
    use std::sync::Arc;
    use tempfile::TempDir;

    pub(crate) async fn open_store() -> (TempDir, CatalogStore) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("catalog.db").display());
        let pool = connect(&url, 4).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let store = CatalogStore::open(pool).await.unwrap();
        (dir, store)
    }

    pub(crate) fn raw(name: &str, url: &str) -> RawEntry {
        RawEntry {
            group: "Group".to_string(),
            name: name.to_string(),
            artwork: format!("http://img/{}.png", name.replace(' ', "_")),
            external_id: String::new(),
            label: name.to_string(),
            media_url: url.to_string(),
        }
    }

    pub(crate) fn episode(series: &str, season: &str, ep: &str) -> EpisodeEntry {
        let name = format!("{series} S{season}E{ep}");
        EpisodeEntry {
            entry: raw(&name, &format!("http://h/series/{}/{season}/{ep}.mp4", series.replace(' ', "_"))),
            series_name: series.to_string(),
            season: season.to_string(),
            episode: ep.to_string(),
        }
    }

    pub(crate) fn snapshot(catalog: ClassifiedCatalog) -> Snapshot {
        Snapshot {
            generated_at: chrono::Utc::now(),
            source: "test.m3u".to_string(),
            catalog,
        }
    }

    pub(crate) fn sample_catalog(movie_count: usize) -> ClassifiedCatalog {
        ClassifiedCatalog {
            movies: (1..=movie_count)
                .map(|i| raw(&format!("Movie {i}"), &format!("http://h/movie/{i}.mp4")))
                .collect(),
            channels: vec![
                raw("Globo HD", "http://h/live/1.ts"),
                raw("ESPN", "http://h/live/2.ts"),
            ],
            series: vec![
                SeriesBucket {
                    name: "Dark".to_string(),
                    episodes: vec![episode("Dark", "1", "1"), episode("Dark", "1", "2")],
                },
                SeriesBucket {
                    name: "The Office".to_string(),
                    episodes: vec![episode("The Office", "2", "5")],
                },
            ],
        }
    }

    fn names(entries: &[CatalogEntry]) -> Vec<String> {
        entries
            .iter()
            .map(|e| match e {
                CatalogEntry::Item(item) => item.entry().name.clone(),
                CatalogEntry::Series(s) => s.name.clone(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_queries_before_import_are_not_ready() {
        let (_dir, store) = open_store().await;

        assert_eq!(store.state(), StoreState::Uninitialized);
        let err = store.count_by_kind(CatalogKind::Movie).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotReady));
        assert!(err.is_retryable());
        assert!(matches!(store.search("x", 50).await, Err(CatalogError::NotReady)));
    }

    #[tokio::test]
    async fn test_import_and_counts() {
        let (_dir, store) = open_store().await;

        let outcome = store.import(&snapshot(sample_catalog(3))).await.unwrap();
        assert_eq!(
            outcome,
            ImportOutcome::Imported(ImportStats { movies: 3, channels: 2, episodes: 3 })
        );
        assert_eq!(store.state(), StoreState::Ready);
        assert_eq!(store.generation(), 1);

        assert_eq!(store.count_by_kind(CatalogKind::Movie).await.unwrap(), 3);
        assert_eq!(store.count_by_kind(CatalogKind::Channel).await.unwrap(), 2);
        // distinct names, not episode rows
        assert_eq!(store.count_by_kind(CatalogKind::Series).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_reimport_unchanged_snapshot_is_idempotent() {
        let (_dir, store) = open_store().await;
        let snap = snapshot(sample_catalog(5));

        store.import(&snap).await.unwrap();
        let outcome = store.import(&snap).await.unwrap();

        assert_eq!(outcome, ImportOutcome::AlreadyCurrent);
        assert_eq!(store.generation(), 1);
        assert_eq!(store.count_by_kind(CatalogKind::Movie).await.unwrap(), 5);
        assert_eq!(store.stats().await.unwrap().episodes, 3);
    }

    #[tokio::test]
    async fn test_reimport_picks_up_new_channels() {
        let (_dir, store) = open_store().await;
        store.import(&snapshot(sample_catalog(5))).await.unwrap();

        let mut changed = sample_catalog(5);
        changed.channels.push(raw("Band", "http://h/live/3.ts"));
        let outcome = store.import(&snapshot(changed)).await.unwrap();

        assert!(matches!(outcome, ImportOutcome::Imported(_)));
        assert_eq!(store.count_by_kind(CatalogKind::Channel).await.unwrap(), 3);
        assert_eq!(store.count_by_kind(CatalogKind::Movie).await.unwrap(), 5);
        assert_eq!(store.generation(), 2);
    }

    #[tokio::test]
    async fn test_store_reopens_ready_after_import() {
        let (dir, store) = open_store().await;
        store.import(&snapshot(sample_catalog(1))).await.unwrap();
        let pool = store.pool().clone();
        drop(store);

        let reopened = CatalogStore::open(pool).await.unwrap();
        assert_eq!(reopened.state(), StoreState::Ready);
        assert_eq!(reopened.count_by_kind(CatalogKind::Movie).await.unwrap(), 1);
        drop(dir);
    }

    #[tokio::test]
    async fn test_page_by_kind_bounds() {
        let (_dir, store) = open_store().await;
        store.import(&snapshot(sample_catalog(25))).await.unwrap();

        let (entries, total) = store.page_with_total(CatalogKind::Movie, 2, 10).await.unwrap();
        assert_eq!(total, 25);
        let expected: Vec<String> = (11..=20).map(|i| format!("Movie {i}")).collect();
        assert_eq!(names(&entries), expected);

        let last = store.page_by_kind(CatalogKind::Movie, 3, 10).await.unwrap();
        assert_eq!(last.len(), 5);
        let beyond = store.page_by_kind(CatalogKind::Movie, 9, 10).await.unwrap();
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn test_page_far_past_the_end_is_empty() {
        let (_dir, store) = open_store().await;
        store.import(&snapshot(sample_catalog(25))).await.unwrap();

        for page in [usize::MAX, i64::MAX as usize, (i64::MAX as usize) / 10 + 2] {
            let entries = store.page_by_kind(CatalogKind::Movie, page, 10).await.unwrap();
            assert!(entries.is_empty(), "page {page} returned {} entries", entries.len());
        }

        let series = store.page_by_kind(CatalogKind::Series, usize::MAX, 24).await.unwrap();
        assert!(series.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_readers_never_see_a_partial_import() {
        let (_dir, store) = open_store().await;
        let store = Arc::new(store);
        store.import(&snapshot(sample_catalog(5))).await.unwrap();

        let import = tokio::spawn({
            let store = store.clone();
            async move { store.import(&snapshot(sample_catalog(5000))).await }
        });

        let mut observed = Vec::new();
        while !import.is_finished() {
            let count = store.count_by_kind(CatalogKind::Movie).await.unwrap();
            let (entries, total) = store.page_with_total(CatalogKind::Movie, 1, 24).await.unwrap();
            assert_eq!(entries.len(), total.min(24));
            observed.push(count);
            observed.push(total);
            tokio::task::yield_now().await;
        }

        assert!(matches!(import.await.unwrap().unwrap(), ImportOutcome::Imported(_)));
        assert!(
            observed.iter().all(|&count| count == 5 || count == 5000),
            "partial counts observed: {observed:?}"
        );
        assert_eq!(store.count_by_kind(CatalogKind::Movie).await.unwrap(), 5000);
    }

    #[tokio::test]
    async fn test_series_page_lists_one_summary_per_series() {
        let (_dir, store) = open_store().await;
        store.import(&snapshot(sample_catalog(0))).await.unwrap();

        let entries = store.page_by_kind(CatalogKind::Series, 1, 24).await.unwrap();
        assert_eq!(names(&entries), vec!["Dark", "The Office"]);
        match &entries[0] {
            CatalogEntry::Series(summary) => {
                assert!(summary.episodes.is_empty());
                assert_eq!(summary.artwork, "http://img/Dark_S1E1.png");
            }
            other => panic!("unexpected entry {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_episodes_sort_numerically() {
        let (_dir, store) = open_store().await;
        let catalog = ClassifiedCatalog {
            series: vec![SeriesBucket {
                name: "Dark".to_string(),
                episodes: vec![
                    episode("Dark", "1", "10"),
                    episode("Dark", "1", "2"),
                    episode("Dark", "1", "1"),
                    episode("Dark", "2", "1"),
                ],
            }],
            ..Default::default()
        };
        store.import(&snapshot(catalog)).await.unwrap();

        let episodes = store.episodes_by_series("dark").await.unwrap();
        let order: Vec<(&str, &str)> = episodes
            .iter()
            .map(|e| (e.season.as_str(), e.episode.as_str()))
            .collect();
        assert_eq!(order, vec![("1", "1"), ("1", "2"), ("1", "10"), ("2", "1")]);
    }

    #[tokio::test]
    async fn test_duplicate_episode_identity_is_upserted() {
        let (_dir, store) = open_store().await;
        let mut replacement = episode("Dark", "1", "1");
        replacement.entry.media_url = "http://h/series/dark/replacement.mp4".to_string();

        let catalog = ClassifiedCatalog {
            series: vec![SeriesBucket {
                name: "Dark".to_string(),
                episodes: vec![episode("Dark", "1", "1"), replacement],
            }],
            ..Default::default()
        };
        store.import(&snapshot(catalog)).await.unwrap();

        let episodes = store.episodes_by_series("Dark").await.unwrap();
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].entry.media_url, "http://h/series/dark/replacement.mp4");
        assert_eq!(store.stats().await.unwrap().episodes, 1);
    }

    #[tokio::test]
    async fn test_episodes_dedupe_across_name_case() {
        let (_dir, store) = open_store().await;
        let catalog = ClassifiedCatalog {
            series: vec![
                SeriesBucket {
                    name: "Dark".to_string(),
                    episodes: vec![episode("Dark", "1", "1")],
                },
                SeriesBucket {
                    name: "DARK".to_string(),
                    episodes: vec![episode("DARK", "1", "1"), episode("DARK", "1", "2")],
                },
            ],
            ..Default::default()
        };
        store.import(&snapshot(catalog)).await.unwrap();

        let episodes = store.episodes_by_series("dark").await.unwrap();
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].series_name, "Dark");
        assert!(store.episodes_by_series("Nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search() {
        let (_dir, store) = open_store().await;
        store.import(&snapshot(sample_catalog(3))).await.unwrap();

        let results = store.search("glo", 50).await.unwrap();
        assert_eq!(results.channels.len(), 1);
        assert!(results.movies.is_empty());

        let results = store.search("OFFICE", 50).await.unwrap();
        assert_eq!(results.series.len(), 1);
        assert_eq!(results.series[0].name, "The Office");
        assert_eq!(results.series[0].episodes.len(), 1);

        let results = store.search("zzz-nothing", 50).await.unwrap();
        assert!(results.is_empty());

        // wildcards match literally
        assert!(store.search("%", 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_caps_each_kind() {
        let (_dir, store) = open_store().await;
        store.import(&snapshot(sample_catalog(60))).await.unwrap();

        let results = store.search("movie", 50).await.unwrap();
        assert_eq!(results.movies.len(), 50);
        assert_eq!(results.movies[0].entry().name, "Movie 1");
    }

    #[tokio::test]
    async fn test_corrupt_rows_are_quarantined() {
        let (_dir, store) = open_store().await;
        store.import(&snapshot(sample_catalog(2))).await.unwrap();

        sqlx::query(
            "INSERT INTO movies (name, group_title, artwork, media_url, original_json) VALUES ('Movie X', '', '', '', '{\"kind\":\"channel\"}')",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let entries = store.page_by_kind(CatalogKind::Movie, 1, 24).await.unwrap();
        assert_eq!(names(&entries), vec!["Movie 1", "Movie 2"]);
        assert_eq!(store.search("Movie X", 50).await.unwrap().movies.len(), 0);
    }

    #[tokio::test]
    async fn test_constraint_violation_rolls_back() {
        let (_dir, store) = open_store().await;
        store.import(&snapshot(sample_catalog(2))).await.unwrap();

        sqlx::query("CREATE UNIQUE INDEX test_unique_movie_name ON movies(name)")
            .execute(store.pool())
            .await
            .unwrap();

        let mut conflicting = sample_catalog(0);
        conflicting.movies = vec![raw("Same", "http://h/movie/1.mp4"), raw("Same", "http://h/movie/2.mp4")];
        let err = store.import(&snapshot(conflicting)).await.unwrap_err();

        assert!(matches!(err, CatalogError::ImportConflict(_)));
        assert_eq!(store.state(), StoreState::Ready);
        assert_eq!(store.generation(), 1);
        let entries = store.page_by_kind(CatalogKind::Movie, 1, 24).await.unwrap();
        assert_eq!(names(&entries), vec!["Movie 1", "Movie 2"]);
    }

    #[tokio::test]
    async fn test_failed_first_import_stays_uninitialized() {
        let (_dir, store) = open_store().await;

        sqlx::query("CREATE UNIQUE INDEX test_unique_movie_name ON movies(name)")
            .execute(store.pool())
            .await
            .unwrap();

        let mut conflicting = sample_catalog(0);
        conflicting.movies = vec![raw("Same", "http://h/movie/1.mp4"), raw("Same", "http://h/movie/2.mp4")];
        assert!(store.import(&snapshot(conflicting)).await.is_err());

        assert_eq!(store.state(), StoreState::Uninitialized);
        assert!(matches!(
            store.count_by_kind(CatalogKind::Channel).await,
            Err(CatalogError::NotReady)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_imports_do_not_interleave() {
        let (_dir, store) = open_store().await;
        let store = Arc::new(store);
        let snap = Arc::new(snapshot(sample_catalog(40)));

        let a = tokio::spawn({
            let (store, snap) = (store.clone(), snap.clone());
            async move { store.import(&snap).await }
        });
        let b = tokio::spawn({
            let (store, snap) = (store.clone(), snap.clone());
            async move { store.import(&snap).await }
        });

        let outcomes = [a.await.unwrap().unwrap(), b.await.unwrap().unwrap()];
        let imported = outcomes
            .iter()
            .filter(|o| matches!(o, ImportOutcome::Imported(_)))
            .count();

        assert_eq!(imported, 1);
        assert!(outcomes.contains(&ImportOutcome::AlreadyCurrent));
        assert_eq!(store.count_by_kind(CatalogKind::Movie).await.unwrap(), 40);
    }
}
