//! ============================================================================
//! Server Configuration
//! ============================================================================
//! Defaults come from GUILDHALL_* environment variables (load `.env` with
//! dotenvy before constructing). Binaries override individual fields from
//! their command-line flags.
//! ============================================================================

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Default bind address for the HTTP server
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Default token lifetime (7 days)
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 86400;

/// Default request body cap
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Starting values for freshly registered players
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDefaults {
    pub avatar: String,
    pub coins: u64,
    pub gems: u64,
    pub level: u32,
    pub experience: u64,
    pub health: u32,
    pub max_health: u32,
    pub attack: u32,
    pub defense: u32,
}

impl Default for PlayerDefaults {
    fn default() -> Self {
        Self {
            avatar: "🧙".to_string(),
            coins: 100,
            gems: 10,
            level: 1,
            experience: 0,
            health: 100,
            max_health: 100,
            attack: 10,
            defense: 5,
        }
    }
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server listens on
    pub bind: String,
    /// Database file; None resolves to ~/.guildhall/guildhall.redb
    pub db_path: Option<String>,
    /// Lifetime of issued bearer tokens
    pub token_ttl_secs: i64,
    /// Reject purchases that carry no bearer token
    pub require_token: bool,
    /// Refuse a second purchase of a non-stackable item
    pub dedupe_unique_items: bool,
    /// Largest accepted request body
    pub max_body_bytes: usize,
    pub player_defaults: PlayerDefaults,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: std::env::var("GUILDHALL_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string()),
            db_path: std::env::var("GUILDHALL_DB_PATH").ok(),
            token_ttl_secs: env_or("GUILDHALL_TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS),
            require_token: env_or("GUILDHALL_REQUIRE_TOKEN", false),
            dedupe_unique_items: env_or("GUILDHALL_DEDUPE_UNIQUE", false),
            max_body_bytes: env_or("GUILDHALL_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
            player_defaults: PlayerDefaults::default(),
        }
    }
}

/// Parse an env var, falling back (with a warning) on missing or bad values
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                warn!("Ignoring invalid {}={:?}", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_parses_and_falls_back() {
        std::env::set_var("GUILDHALL_TEST_TTL", "120");
        assert_eq!(env_or("GUILDHALL_TEST_TTL", 5i64), 120);

        std::env::set_var("GUILDHALL_TEST_FLAG", "not-a-bool");
        assert!(!env_or("GUILDHALL_TEST_FLAG", false));

        assert_eq!(env_or("GUILDHALL_TEST_MISSING", 7usize), 7);
    }

    #[test]
    fn test_player_defaults() {
        let d = PlayerDefaults::default();
        assert_eq!(d.coins, 100);
        assert_eq!(d.attack, 10);
        assert_eq!(d.max_health, d.health);
    }
}
