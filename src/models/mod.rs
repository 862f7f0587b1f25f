pub mod catalog;
pub mod playlist;

pub use catalog::{CatalogEntry, CatalogKind, ListPage, SearchResults, SeriesSummary};
pub use playlist::{
    ClassifiedCatalog, ClassifiedItem, EntryGroup, EpisodeEntry, MediaKind, RawEntry,
    SeriesBucket, Snapshot, UNGROUPED,
};
