//! Startup ingestion
//!
//! Loads (or builds) the snapshot and imports it into the store. Spawned as a
//! background task so the server answers `/health` while importing.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::error::CatalogResult;
use crate::services::catalog_store::{CatalogStore, ImportOutcome};
use crate::services::snapshot::load_or_build;

/// Inputs for one ingestion run
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub playlist_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub excluded_groups: Vec<String>,
    /// Re-scan the playlist even when a snapshot exists
    pub rebuild_snapshot: bool,
}

impl From<&Config> for IngestConfig {
    fn from(config: &Config) -> Self {
        Self {
            playlist_path: PathBuf::from(&config.playlist_path),
            snapshot_path: PathBuf::from(&config.snapshot_path),
            excluded_groups: config.excluded_groups.clone(),
            rebuild_snapshot: config.rebuild_snapshot,
        }
    }
}

/// Load or build the snapshot, then import it
pub async fn run_ingestion(store: &CatalogStore, config: &IngestConfig) -> CatalogResult<ImportOutcome> {
    let snapshot = load_or_build(
        &config.snapshot_path,
        &config.playlist_path,
        &config.excluded_groups,
        config.rebuild_snapshot,
    )
    .await?;

    if snapshot.catalog.is_empty() {
        tracing::warn!(source = %snapshot.source, "Snapshot holds no playable entries");
    }

    tracing::info!(
        movies = snapshot.catalog.movies.len(),
        channels = snapshot.catalog.channels.len(),
        series = snapshot.catalog.series.len(),
        episodes = snapshot.catalog.episode_count(),
        "Snapshot ready for import"
    );

    store.import(&snapshot).await
}

/// Background ingestion task
///
/// Failures are logged; the server keeps serving and queries report
/// not-ready until a later import succeeds.
pub async fn start_ingestion_task(store: Arc<CatalogStore>, config: IngestConfig) {
    let started = Instant::now();
    tracing::info!(
        playlist = %config.playlist_path.display(),
        snapshot = %config.snapshot_path.display(),
        rebuild = config.rebuild_snapshot,
        "Starting catalog ingestion"
    );

    match run_ingestion(&store, &config).await {
        Ok(ImportOutcome::AlreadyCurrent) => {
            tracing::info!("Catalog unchanged since last import");
        }
        Ok(ImportOutcome::Imported(stats)) => {
            tracing::info!(
                movies = stats.movies,
                channels = stats.channels,
                episodes = stats.episodes,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Catalog ingestion complete"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Catalog ingestion failed");
        }
    }
}
