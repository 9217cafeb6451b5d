use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub watchmode: WatchmodeConfig,

    #[serde(default)]
    pub graphql: GraphqlConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite file; relative paths resolve against the config file directory.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("wishlist.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatchmodeConfig {
    /// API key; overridden by `WATCHMODE_API_KEY` when set.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Client-side rate limit.
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.watchmode.com/v1".to_string()
}
fn default_requests_per_second() -> u32 {
    10
}
fn default_timeout() -> u64 {
    30
}

impl Default for WatchmodeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            requests_per_second: default_requests_per_second(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GraphqlConfig {
    /// Whole-request deadline. In-flight provider calls are dropped on expiry.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum provider fetches in flight for one `similarTitles` list.
    #[serde(default = "default_similar_titles_concurrency")]
    pub similar_titles_concurrency: usize,

    /// Deepest field nesting a query may use.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Most selections a query may expand to, fragments included.
    #[serde(default = "default_max_complexity")]
    pub max_complexity: usize,
}

fn default_request_timeout() -> u64 {
    30
}
fn default_similar_titles_concurrency() -> usize {
    4
}
fn default_max_depth() -> usize {
    12
}
fn default_max_complexity() -> usize {
    500
}

impl Default for GraphqlConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            similar_titles_concurrency: default_similar_titles_concurrency(),
            max_depth: default_max_depth(),
            max_complexity: default_max_complexity(),
        }
    }
}
