//! Server configuration loaded from environment variables

use crate::types::{ItemPolicy, RoomRules};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_STATIC_DIR: &str = "dist";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Presentation bundle; unknown paths fall back to its index.html
    pub static_dir: PathBuf,
    /// Allowed CORS origins (empty = permissive)
    pub cors_origins: Vec<String>,
    pub rules: RoomRules,
    /// JSON catalog replacing the built-in one
    pub catalog_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            cors_origins: Vec::new(),
            rules: RoomRules::default(),
            catalog_path: None,
        }
    }
}

/// Parse a numeric env var, falling back (with a warning) on garbage
fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(var = name, value = %raw, "Invalid value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn flag_var(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

impl ServerConfig {
    /// Load config from environment variables
    pub fn from_env() -> Self {
        let defaults = RoomRules::default();

        let port = parse_var("PORT", DEFAULT_PORT);

        let static_dir = std::env::var("STATIC_DIR")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let min_players = parse_var("ROOM_MIN_PLAYERS", defaults.min_players).max(1);
        let mut max_players = parse_var("ROOM_MAX_PLAYERS", defaults.max_players);
        if max_players < min_players {
            tracing::warn!(
                min_players,
                max_players,
                "ROOM_MAX_PLAYERS below ROOM_MIN_PLAYERS, raising it"
            );
            max_players = min_players;
        }

        let item_policy = if flag_var("DISTINCT_ITEMS") {
            ItemPolicy::Distinct
        } else {
            ItemPolicy::Independent
        };

        let catalog_path = std::env::var("CATALOG_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        tracing::info!(
            port,
            min_players,
            max_players,
            ?item_policy,
            cors_origins = cors_origins.len(),
            "Server config loaded"
        );

        Self {
            port,
            static_dir,
            cors_origins,
            rules: RoomRules {
                min_players,
                max_players,
                item_policy,
            },
            catalog_path,
        }
    }
}
