use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub node_env: String,

    // SQLite
    pub database_url: String,
    pub db_max_connections: u32,

    // Ingestion
    pub playlist_path: String,
    pub snapshot_path: String,
    pub rebuild_snapshot: bool,
    pub excluded_groups: Vec<String>,

    // Queries
    pub default_page_limit: usize,
    pub max_page_limit: usize,
    pub search_limit: usize,

    // Search cache
    pub search_cache_ttl_secs: u64,
    pub search_cache_max_entries: usize,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            // Server
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .unwrap_or(3001),
            node_env: env::var("NODE_ENV").unwrap_or_else(|_| "development".to_string()),

            // SQLite
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://midias.db".to_string()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),

            // Ingestion
            playlist_path: env::var("PLAYLIST_PATH").unwrap_or_else(|_| "lista.txt".to_string()),
            snapshot_path: env::var("SNAPSHOT_PATH").unwrap_or_else(|_| "lista.json".to_string()),
            rebuild_snapshot: env::var("REBUILD_SNAPSHOT")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            excluded_groups: parse_list(
                &env::var("EXCLUDED_GROUPS").unwrap_or_else(|_| "onlyfans".to_string()),
            ),

            // Queries
            default_page_limit: env::var("DEFAULT_PAGE_LIMIT")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),
            max_page_limit: env::var("MAX_PAGE_LIMIT")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .unwrap_or(500),
            search_limit: env::var("SEARCH_LIMIT")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .unwrap_or(50),

            // Search cache
            search_cache_ttl_secs: env::var("SEARCH_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap_or(300), // 5 minutes
            search_cache_max_entries: env::var("SEARCH_CACHE_MAX_ENTRIES")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap_or(1000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Split a comma-separated env value, dropping empty parts
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}
