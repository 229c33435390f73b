//! ============================================================================
//! Database Types - Serializable records for redb storage
//! ============================================================================

use serde::{Deserialize, Serialize};

use crate::types::{ItemCategory, Rarity};

/// Player account row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: u64,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string (algorithm, params, salt, hash)
    pub password_hash: String,
    pub avatar: String,
    pub coins: u64,
    pub gems: u64,
    pub level: u32,
    pub experience: u64,
    pub health: u32,
    pub max_health: u32,
    pub attack: u32,
    pub defense: u32,
    pub online: bool,
    pub last_seen: Option<i64>,
    pub created_at: i64,
}

/// Catalog item row. Written once at seeding, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: u64,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub category: ItemCategory,
    pub rarity: Rarity,
    pub price_coins: u64,
    pub price_gems: u64,
    pub attack_bonus: u32,
    pub defense_bonus: u32,
    pub health_bonus: u32,
    pub stackable: bool,
    pub tradeable: bool,
}

/// One purchase grant. Keyed by (player_id, entry_id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub entry_id: u64,
    pub player_id: u64,
    pub item_id: u64,
    pub quantity: u32,
    pub acquired_at: i64,
}

/// Issued bearer token. Keyed by the hex SHA-256 of the raw token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub player_id: u64,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl TokenRecord {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

/// Row counts for the CLI `stats` command
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DbStats {
    pub total_players: usize,
    pub online_players: usize,
    pub total_items: usize,
    pub inventory_entries: usize,
    pub live_tokens: usize,
    pub expired_tokens: usize,
    pub catalog_version: Option<u64>,
}
