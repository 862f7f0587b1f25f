use serde::Serialize;

use super::playlist::{ClassifiedItem, EpisodeEntry};

/// Catalog section a listing addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Movie,
    Channel,
    Series,
}

impl CatalogKind {
    /// Parse a client-supplied kind label
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "movie" | "movies" => Some(CatalogKind::Movie),
            "channel" | "channels" => Some(CatalogKind::Channel),
            "series" => Some(CatalogKind::Series),
            _ => None,
        }
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogKind::Movie => write!(f, "movie"),
            CatalogKind::Channel => write!(f, "channel"),
            CatalogKind::Series => write!(f, "series"),
        }
    }
}

/// One series as shown in listings and search results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
    pub name: String,
    pub artwork: String,
    /// Empty in listings; the representative episode in search results
    pub episodes: Vec<EpisodeEntry>,
}

/// Listing row: a stored item, or a series summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CatalogEntry {
    Item(ClassifiedItem),
    Series(SeriesSummary),
}

/// Paginated listing response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items: Vec<CatalogEntry>,
}

/// Cross-kind search response
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    pub channels: Vec<ClassifiedItem>,
    pub movies: Vec<ClassifiedItem>,
    pub series: Vec<SeriesSummary>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() && self.movies.is_empty() && self.series.is_empty()
    }
}
