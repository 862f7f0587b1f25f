//! Snapshot persistence
//!
//! The classified playlist is written once as JSON so that imports can run
//! again without re-scanning the source file.

use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{ClassifiedCatalog, Snapshot};
use crate::services::classifier::ContentClassifier;
use crate::services::m3u_parser::parse_playlist;

/// SHA-1 of the catalog content, used to detect an unchanged snapshot
pub fn fingerprint(catalog: &ClassifiedCatalog) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(catalog)?;
    let mut hasher = Sha1::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Scan, extract and classify a playlist file
pub async fn build_snapshot(playlist_path: &Path, excluded_groups: &[String]) -> CatalogResult<Snapshot> {
    let (groups, _stats) = parse_playlist(playlist_path).await?;
    let catalog = ContentClassifier::organize(&groups, excluded_groups);

    Ok(Snapshot {
        generated_at: chrono::Utc::now(),
        source: playlist_path.display().to_string(),
        catalog,
    })
}

/// Write the snapshot atomically (temp file + rename)
pub async fn write_snapshot(path: &Path, snapshot: &Snapshot) -> CatalogResult<()> {
    let data = serde_json::to_vec_pretty(snapshot).map_err(|e| snapshot_error(path, e))?;
    let tmp_path = tmp_path(path);

    fs::write(&tmp_path, &data).await.map_err(|e| snapshot_error(path, e))?;

    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(snapshot_error(path, e));
    }

    tracing::info!(path = %path.display(), bytes = data.len(), "Snapshot written");
    Ok(())
}

/// Read a snapshot; None when the file does not exist
pub async fn read_snapshot(path: &Path) -> CatalogResult<Option<Snapshot>> {
    let data = match fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(snapshot_error(path, e)),
    };

    let snapshot = serde_json::from_slice(&data).map_err(|e| snapshot_error(path, e))?;
    Ok(Some(snapshot))
}

/// Load the snapshot from disk, or build and persist it from the playlist
pub async fn load_or_build(
    snapshot_path: &Path,
    playlist_path: &Path,
    excluded_groups: &[String],
    rebuild: bool,
) -> CatalogResult<Snapshot> {
    if !rebuild {
        if let Some(snapshot) = read_snapshot(snapshot_path).await? {
            tracing::info!(
                path = %snapshot_path.display(),
                generated_at = %snapshot.generated_at,
                "Snapshot loaded"
            );
            return Ok(snapshot);
        }
    }

    let snapshot = build_snapshot(playlist_path, excluded_groups).await?;
    write_snapshot(snapshot_path, &snapshot).await?;
    Ok(snapshot)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn snapshot_error(path: &Path, err: impl std::fmt::Display) -> CatalogError {
    CatalogError::Snapshot {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
