use async_stream::try_stream;
use futures::Stream;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{EntryGroup, RawEntry, UNGROUPED};

const READ_BUFFER_BYTES: usize = 64 * 1024;

/// Attribute keys recognized on a metadata line
const KEY_ID: &str = "tvg-id";
const KEY_NAME: &str = "tvg-name";
const KEY_LOGO: &str = "tvg-logo";
const KEY_GROUP: &str = "group-title";

/// A metadata line paired with the line that follows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePair {
    pub metadata: String,
    pub url: String,
}

/// Counters for one parse run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub pairs: usize,
    pub entries: usize,
    pub dropped: usize,
}

fn is_metadata_line(line: &str) -> bool {
    line.starts_with("#EXTINF")
}

/// Stream (metadata, url) pairs out of a playlist file
///
/// Holds at most one pending metadata line, paired with the next non-blank
/// line whatever it is. A metadata line in URL position still becomes
/// pending for the line after it.
pub fn scan_pairs(path: &Path) -> impl Stream<Item = CatalogResult<LinePair>> {
    let path = path.to_path_buf();

    try_stream! {
        let file = File::open(&path)
            .await
            .map_err(|source| source_unavailable(&path, source))?;

        let mut reader = BufReader::with_capacity(READ_BUFFER_BYTES, file);
        let mut buf: Vec<u8> = Vec::new();
        let mut pending: Option<String> = None;

        loop {
            buf.clear();

            let bytes_read = reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(|source| source_unavailable(&path, source))?;

            if bytes_read == 0 {
                break;
            }

            let line = String::from_utf8_lossy(&buf);
            let trimmed = line.trim();

            if trimmed.is_empty() {
                continue;
            }

            // Whatever follows a metadata line is its URL; non-URLs drop at extraction
            if let Some(metadata) = pending.take() {
                yield LinePair {
                    metadata,
                    url: trimmed.to_string(),
                };
            }

            if is_metadata_line(trimmed) {
                pending = Some(trimmed.to_string());
            }
        }
    }
}

fn source_unavailable(path: &Path, source: std::io::Error) -> CatalogError {
    CatalogError::SourceUnavailable {
        path: PathBuf::from(path),
        source,
    }
}

/// Value of the first quoted substring after `key`, or empty
pub fn extract_value(line: &str, key: &str) -> String {
    let Some(start) = line.find(key) else {
        return String::new();
    };

    let rest = &line[start + key.len()..];
    let Some(open) = rest.find('"') else {
        return String::new();
    };

    let value = &rest[open + 1..];
    match value.find('"') {
        Some(close) => value[..close].to_string(),
        None => String::new(),
    }
}

/// Trailing free text after the last comma
pub fn extract_label(line: &str) -> String {
    line.rfind(',')
        .map(|idx| line[idx + 1..].trim().to_string())
        .unwrap_or_default()
}

/// Build a RawEntry from a metadata line and its URL line
///
/// Returns None when the URL is empty or not http(s).
pub fn extract_entry(metadata: &str, url_line: &str) -> Option<RawEntry> {
    let media_url = url_line.trim();
    if media_url.is_empty()
        || !(media_url.starts_with("http://") || media_url.starts_with("https://"))
    {
        return None;
    }

    let group = extract_value(metadata, KEY_GROUP);
    let group = if group.is_empty() {
        UNGROUPED.to_string()
    } else {
        group
    };

    Some(RawEntry {
        group,
        name: extract_value(metadata, KEY_NAME),
        artwork: extract_value(metadata, KEY_LOGO),
        external_id: extract_value(metadata, KEY_ID),
        label: extract_label(metadata),
        media_url: media_url.to_string(),
    })
}

/// Bucket entries by group, keeping first-seen group order
pub fn group_entries<I>(entries: I) -> Vec<EntryGroup>
where
    I: IntoIterator<Item = RawEntry>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<EntryGroup> = Vec::new();

    for entry in entries {
        match index.get(&entry.group) {
            Some(&pos) => groups[pos].items.push(entry),
            None => {
                index.insert(entry.group.clone(), groups.len());
                groups.push(EntryGroup {
                    group: entry.group.clone(),
                    items: vec![entry],
                });
            }
        }
    }

    groups
}

/// Scan and extract a playlist file into grouped entries
pub async fn parse_playlist(path: &Path) -> CatalogResult<(Vec<EntryGroup>, ParseStats)> {
    let started = Instant::now();
    tracing::info!(path = %path.display(), "Parsing playlist");

    let mut stats = ParseStats::default();
    let mut entries = Vec::new();

    let pairs = scan_pairs(path);
    tokio::pin!(pairs);

    while let Some(pair) = pairs.next().await {
        let pair = pair?;
        stats.pairs += 1;

        match extract_entry(&pair.metadata, &pair.url) {
            Some(entry) => entries.push(entry),
            None => stats.dropped += 1,
        }
    }

    stats.entries = entries.len();
    let groups = group_entries(entries);

    tracing::info!(
        pairs = stats.pairs,
        entries = stats.entries,
        dropped = stats.dropped,
        groups = groups.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Playlist parsed"
    );

    Ok((groups, stats))
}
