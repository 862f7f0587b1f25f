use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use crate::models::{ClassifiedCatalog, EntryGroup, EpisodeEntry, MediaKind, RawEntry, SeriesBucket};

/// URL path fragments marking series episodes (Xtream-style layout)
const SERIES_PATH_MARKERS: &[&str] = &["/series/"];

/// URL path fragments marking movies
const MOVIE_PATH_MARKERS: &[&str] = &["/movie/"];

/// Defaults when a path-marked episode carries no SxxEyy label
const DEFAULT_SEASON: &str = "1";
const DEFAULT_EPISODE: &str = "?";

/// Separators allowed between a series title and its SxxEyy tag
const TITLE_SEPARATORS: &[char] = &[' ', '.', '_', '-'];

lazy_static! {
    // "The Office S02E05", "Dark.s01e03", "Lost_S1E2"
    static ref SEASON_EPISODE_PATTERN: Regex =
        Regex::new(r"(?i)^(.*?)[\s._-]*S(\d{1,2})E(\d{1,2})").unwrap();
}

/// Result of classifying one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Movie,
    Channel,
    Episode {
        series_name: String,
        season: String,
        episode: String,
    },
}

impl Classification {
    pub fn kind(&self) -> MediaKind {
        match self {
            Classification::Movie => MediaKind::Movie,
            Classification::Channel => MediaKind::Channel,
            Classification::Episode { .. } => MediaKind::Episode,
        }
    }
}

/// Season/episode identity parsed from a label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonEpisode {
    pub title: String,
    pub season: String,
    pub episode: String,
}

/// Content classifier for playlist entries
pub struct ContentClassifier;

impl ContentClassifier {
    /// Classify one entry by URL path and label
    ///
    /// Total and deterministic: every entry is a movie, a channel or an episode.
    pub fn classify(entry: &RawEntry) -> Classification {
        let path = url_path(&entry.media_url);
        let parsed = Self::parse_season_episode(&entry.label);
        let has_series_path = SERIES_PATH_MARKERS.iter().any(|m| path.contains(m));

        if let Some(parsed) = parsed {
            let series_name = if parsed.title.is_empty() {
                entry.name.clone()
            } else {
                parsed.title
            };
            return Classification::Episode {
                series_name,
                season: parsed.season,
                episode: parsed.episode,
            };
        }

        if has_series_path {
            let series_name = if entry.label.is_empty() {
                entry.name.clone()
            } else {
                entry.label.clone()
            };
            return Classification::Episode {
                series_name,
                season: DEFAULT_SEASON.to_string(),
                episode: DEFAULT_EPISODE.to_string(),
            };
        }

        if MOVIE_PATH_MARKERS.iter().any(|m| path.contains(m)) {
            return Classification::Movie;
        }

        Classification::Channel
    }

    /// Parse "<title><sep>S<season>E<episode>" out of a label
    pub fn parse_season_episode(label: &str) -> Option<SeasonEpisode> {
        let caps = SEASON_EPISODE_PATTERN.captures(label)?;

        let title = caps
            .get(1)
            .map(|m| m.as_str().trim().trim_end_matches(TITLE_SEPARATORS).trim().to_string())
            .unwrap_or_default();
        let season = caps
            .get(2)
            .map(|m| normalize_number(m.as_str()))
            .unwrap_or_else(|| DEFAULT_SEASON.to_string());
        let episode = caps
            .get(3)
            .map(|m| normalize_number(m.as_str()))
            .unwrap_or_else(|| DEFAULT_EPISODE.to_string());

        Some(SeasonEpisode {
            title,
            season,
            episode,
        })
    }

    /// Partition grouped entries into movies, channels and series
    ///
    /// Groups whose name case-insensitively equals an excluded category are
    /// dropped, as are entries without a media URL or display name. Episode
    /// lists come out reversed (see [`reverse_episode_order`]).
    pub fn organize(groups: &[EntryGroup], excluded_groups: &[String]) -> ClassifiedCatalog {
        let mut catalog = ClassifiedCatalog::default();
        let mut series_index: HashMap<String, usize> = HashMap::new();
        let mut skipped = 0usize;

        let entries = groups
            .iter()
            .filter(|g| !is_excluded(&g.group, excluded_groups))
            .flat_map(|g| g.items.iter());

        for entry in entries {
            if entry.media_url.trim().is_empty() || entry.name.is_empty() {
                skipped += 1;
                continue;
            }

            let classification = Self::classify(entry);
            tracing::trace!(kind = %classification.kind(), name = %entry.name, "Entry classified");

            match classification {
                Classification::Movie => catalog.movies.push(entry.clone()),
                Classification::Channel => catalog.channels.push(entry.clone()),
                Classification::Episode {
                    series_name,
                    season,
                    episode,
                } => {
                    let pos = *series_index.entry(series_name.clone()).or_insert_with(|| {
                        catalog.series.push(SeriesBucket {
                            name: series_name.clone(),
                            episodes: Vec::new(),
                        });
                        catalog.series.len() - 1
                    });

                    catalog.series[pos].episodes.push(EpisodeEntry {
                        entry: entry.clone(),
                        series_name,
                        season,
                        episode,
                    });
                }
            }
        }

        reverse_episode_order(&mut catalog);

        tracing::info!(
            movies = catalog.movies.len(),
            channels = catalog.channels.len(),
            series = catalog.series.len(),
            episodes = catalog.episode_count(),
            skipped = skipped,
            "Playlist classified"
        );

        catalog
    }
}

/// Reverse each series' episode list
///
/// Source playlists list episodes newest-first; storage order is oldest-first.
pub fn reverse_episode_order(catalog: &mut ClassifiedCatalog) {
    for bucket in &mut catalog.series {
        bucket.episodes.reverse();
    }
}

fn is_excluded(group: &str, excluded_groups: &[String]) -> bool {
    excluded_groups
        .iter()
        .any(|excluded| excluded.to_lowercase() == group.to_lowercase())
}

/// Path component of a media URL, or the raw string when it does not parse
fn url_path(media_url: &str) -> String {
    match url::Url::parse(media_url.trim()) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => media_url.to_string(),
    }
}

/// "02" -> "2"; leaves non-numeric text untouched
fn normalize_number(digits: &str) -> String {
    digits
        .parse::<u32>()
        .map(|n| n.to_string())
        .unwrap_or_else(|_| digits.to_string())
}
