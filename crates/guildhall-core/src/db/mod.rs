// ============================================================================
// Store - Embedded Database (redb)
// ============================================================================
// Persistent storage for players, catalog items, inventory grants and issued
// tokens. Default path: ~/.guildhall/guildhall.redb (override via
// GUILDHALL_DB_PATH env var).
//
// redb admits one write transaction at a time. Every balance-affecting
// operation reads and writes inside a single write transaction, so those
// operations are serialized against each other.
// ============================================================================

pub mod types;

pub use types::{DbStats, InventoryRecord, ItemRecord, PlayerRecord, TokenRecord};

use redb::backends::InMemoryBackend;
use redb::{
    Database, ReadableTable, ReadableTableMetadata, Table, TableDefinition, WriteTransaction,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::PlayerDefaults;
use crate::error::{Resource, ShopError, ShopResult};

// Table definitions
pub(crate) const PLAYERS: TableDefinition<u64, &[u8]> = TableDefinition::new("players");
pub(crate) const USERNAMES: TableDefinition<&str, u64> = TableDefinition::new("usernames");
pub(crate) const EMAILS: TableDefinition<&str, u64> = TableDefinition::new("emails");
pub(crate) const ITEMS: TableDefinition<u64, &[u8]> = TableDefinition::new("items");
pub(crate) const INVENTORY: TableDefinition<(u64, u64), &[u8]> = TableDefinition::new("inventory");
pub(crate) const TOKENS: TableDefinition<&str, &[u8]> = TableDefinition::new("tokens");
pub(crate) const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

// Meta keys
pub(crate) const SEQ_PLAYERS: &str = "seq:players";
pub(crate) const SEQ_ITEMS: &str = "seq:items";
pub(crate) const SEQ_INVENTORY: &str = "seq:inventory";
pub(crate) const CATALOG_VERSION_KEY: &str = "catalog:version";

/// Fields needed to insert a new player
pub struct NewPlayer<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: String,
    pub avatar: &'a str,
    pub defaults: &'a PlayerDefaults,
}

/// Embedded database for the game backend
pub struct Store {
    db: Database,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (or create) the database at the given path.
    /// If `path` is None, uses GUILDHALL_DB_PATH env var or ~/.guildhall/guildhall.redb
    pub fn open(path: Option<&str>) -> ShopResult<Self> {
        let db_path = if let Some(p) = path {
            PathBuf::from(p)
        } else if let Ok(env_path) = std::env::var("GUILDHALL_DB_PATH") {
            PathBuf::from(env_path)
        } else {
            let home = dirs::home_dir().ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Cannot determine home directory",
                )
            })?;
            let dir = home.join(".guildhall");
            std::fs::create_dir_all(&dir)?;
            dir.join("guildhall.redb")
        };

        info!("Opening database at: {}", db_path.display());
        let db = Database::create(&db_path)?;
        let store = Self {
            db,
            path: Some(db_path),
        };
        store.init_tables()?;
        info!("Database ready");
        Ok(store)
    }

    /// Volatile store backed by memory; used by tests and dry runs
    pub fn in_memory() -> ShopResult<Self> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        let store = Self { db, path: None };
        store.init_tables()?;
        Ok(store)
    }

    /// Ensure tables exist by doing a write transaction
    fn init_tables(&self) -> ShopResult<()> {
        let txn = self.db.begin_write()?;
        {
            txn.open_table(PLAYERS)?;
            txn.open_table(USERNAMES)?;
            txn.open_table(EMAILS)?;
            txn.open_table(ITEMS)?;
            txn.open_table(INVENTORY)?;
            txn.open_table(TOKENS)?;
            txn.open_table(META)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Database file path (None for in-memory stores)
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn begin_write(&self) -> ShopResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========================================================================
    // Player Operations
    // ========================================================================

    /// Insert a player, enforcing username/email uniqueness in the same
    /// transaction as the insert.
    pub fn create_player(&self, new: NewPlayer<'_>) -> ShopResult<PlayerRecord> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin_write()?;
        let player = {
            let mut usernames = txn.open_table(USERNAMES)?;
            if usernames.get(new.username)?.is_some() {
                return Err(ShopError::Conflict("username already taken".into()));
            }
            let mut emails = txn.open_table(EMAILS)?;
            if emails.get(new.email)?.is_some() {
                return Err(ShopError::Conflict("email already registered".into()));
            }

            let mut meta = txn.open_table(META)?;
            let id = next_id(&mut meta, SEQ_PLAYERS)?;
            let d = new.defaults;
            let player = PlayerRecord {
                id,
                username: new.username.to_string(),
                email: new.email.to_string(),
                password_hash: new.password_hash,
                avatar: new.avatar.to_string(),
                coins: d.coins,
                gems: d.gems,
                level: d.level,
                experience: d.experience,
                health: d.health,
                max_health: d.max_health,
                attack: d.attack,
                defense: d.defense,
                online: false,
                last_seen: None,
                created_at: now,
            };

            let mut players = txn.open_table(PLAYERS)?;
            put_player(&mut players, &player)?;
            usernames.insert(new.username, id)?;
            emails.insert(new.email, id)?;
            player
        };
        txn.commit()?;

        debug!("Created player {} ({})", player.id, player.username);
        Ok(player)
    }

    pub fn get_player(&self, player_id: u64) -> ShopResult<Option<PlayerRecord>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(PLAYERS)?;
        get_player(&table, player_id)
    }

    pub fn find_player_by_username(&self, username: &str) -> ShopResult<Option<PlayerRecord>> {
        let txn = self.db.begin_read()?;
        let usernames = txn.open_table(USERNAMES)?;
        let id = match usernames.get(username)? {
            Some(guard) => guard.value(),
            None => return Ok(None),
        };
        let players = txn.open_table(PLAYERS)?;
        get_player(&players, id)
    }

    pub fn list_players(&self) -> ShopResult<Vec<PlayerRecord>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(PLAYERS)?;

        let mut results = Vec::new();
        for entry in table.iter()? {
            let (_key, value) = entry?;
            results.push(decode(value.value())?);
        }
        Ok(results)
    }

    /// Update the online flag; `last_seen` is stamped with the current time
    pub fn set_presence(&self, player_id: u64, online: bool) -> ShopResult<PlayerRecord> {
        let txn = self.db.begin_write()?;
        let player = {
            let mut players = txn.open_table(PLAYERS)?;
            let mut player =
                get_player(&players, player_id)?.ok_or(ShopError::NotFound(Resource::Player))?;
            player.online = online;
            player.last_seen = Some(chrono::Utc::now().timestamp());
            put_player(&mut players, &player)?;
            player
        };
        txn.commit()?;

        debug!("Player {} online={}", player_id, online);
        Ok(player)
    }

    /// Add currency to a player's balance
    pub fn credit(&self, player_id: u64, coins: u64, gems: u64) -> ShopResult<PlayerRecord> {
        let txn = self.db.begin_write()?;
        let player = {
            let mut players = txn.open_table(PLAYERS)?;
            let mut player =
                get_player(&players, player_id)?.ok_or(ShopError::NotFound(Resource::Player))?;
            player.coins = player
                .coins
                .checked_add(coins)
                .ok_or(ShopError::Overflow("coins"))?;
            player.gems = player
                .gems
                .checked_add(gems)
                .ok_or(ShopError::Overflow("gems"))?;
            put_player(&mut players, &player)?;
            player
        };
        txn.commit()?;

        info!(
            "Credited player {} with {} coins, {} gems",
            player_id, coins, gems
        );
        Ok(player)
    }

    // ========================================================================
    // Item + Inventory Operations
    // ========================================================================

    pub fn get_item(&self, item_id: u64) -> ShopResult<Option<ItemRecord>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ITEMS)?;
        get_item(&table, item_id)
    }

    /// All stored items in id order (no seeding)
    pub fn list_item_records(&self) -> ShopResult<Vec<ItemRecord>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ITEMS)?;

        let mut results = Vec::new();
        for entry in table.iter()? {
            let (_key, value) = entry?;
            results.push(decode(value.value())?);
        }
        Ok(results)
    }

    /// A player's grants in acquisition order
    pub fn inventory(&self, player_id: u64) -> ShopResult<Vec<InventoryRecord>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(INVENTORY)?;

        let mut results = Vec::new();
        for entry in table.range((player_id, 0)..=(player_id, u64::MAX))? {
            let (_key, value) = entry?;
            results.push(decode(value.value())?);
        }
        Ok(results)
    }

    pub fn catalog_version(&self) -> ShopResult<Option<u64>> {
        let txn = self.db.begin_read()?;
        let meta = txn.open_table(META)?;
        let version = meta.get(CATALOG_VERSION_KEY)?.map(|v| v.value());
        Ok(version)
    }

    // ========================================================================
    // Token Operations
    // ========================================================================

    pub fn store_token(&self, digest: &str, record: &TokenRecord) -> ShopResult<()> {
        let value = encode(record)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(TOKENS)?;
            table.insert(digest, value.as_slice())?;
        }
        txn.commit()?;

        debug!("Stored token for player {}", record.player_id);
        Ok(())
    }

    pub fn get_token(&self, digest: &str) -> ShopResult<Option<TokenRecord>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(TOKENS)?;
        match table.get(digest)? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn delete_token(&self, digest: &str) -> ShopResult<Option<TokenRecord>> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(TOKENS)?;
            let removed = table.remove(digest)?;
            match removed {
                Some(value) => Some(decode::<TokenRecord>(value.value())?),
                None => None,
            }
        };
        txn.commit()?;
        Ok(removed)
    }

    pub fn list_tokens(&self) -> ShopResult<Vec<(String, TokenRecord)>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(TOKENS)?;

        let mut results = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            results.push((key.value().to_string(), decode(value.value())?));
        }
        Ok(results)
    }

    /// Delete tokens that expired at or before `now`.
    /// Returns the number of tokens deleted.
    pub fn prune_expired_tokens(&self, now: i64) -> ShopResult<usize> {
        let txn = self.db.begin_write()?;
        let pruned = {
            let mut table = txn.open_table(TOKENS)?;
            let mut expired = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                let record: TokenRecord = decode(value.value())?;
                if record.is_expired(now) {
                    expired.push(key.value().to_string());
                }
            }
            for digest in &expired {
                table.remove(digest.as_str())?;
            }
            expired.len()
        };
        txn.commit()?;

        if pruned > 0 {
            info!("Pruned {} expired tokens", pruned);
        }
        Ok(pruned)
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    pub fn stats(&self) -> ShopResult<DbStats> {
        let now = chrono::Utc::now().timestamp();
        let players = self.list_players()?;
        let tokens = self.list_tokens()?;

        let txn = self.db.begin_read()?;
        let items = txn.open_table(ITEMS)?;
        let inventory = txn.open_table(INVENTORY)?;
        let meta = txn.open_table(META)?;

        let expired_tokens = tokens.iter().filter(|(_, t)| t.is_expired(now)).count();

        Ok(DbStats {
            total_players: players.len(),
            online_players: players.iter().filter(|p| p.online).count(),
            total_items: items.len()? as usize,
            inventory_entries: inventory.len()? as usize,
            live_tokens: tokens.len() - expired_tokens,
            expired_tokens,
            catalog_version: meta.get(CATALOG_VERSION_KEY)?.map(|v| v.value()),
        })
    }
}

// ============================================================================
// Record helpers (shared by the catalog, auth and shop transactions)
// ============================================================================

pub(crate) fn encode<T: Serialize>(value: &T) -> ShopResult<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> ShopResult<T> {
    Ok(bincode::deserialize(bytes)?)
}

/// Bump and return a sequence counter (first value is 1)
pub(crate) fn next_id(meta: &mut Table<'_, &'static str, u64>, key: &str) -> ShopResult<u64> {
    let current = meta.get(key)?.map(|v| v.value()).unwrap_or(0);
    let next = current.checked_add(1).ok_or(ShopError::Overflow("sequence"))?;
    meta.insert(key, next)?;
    Ok(next)
}

pub(crate) fn get_player(
    table: &impl ReadableTable<u64, &'static [u8]>,
    player_id: u64,
) -> ShopResult<Option<PlayerRecord>> {
    match table.get(player_id)? {
        Some(value) => Ok(Some(decode(value.value())?)),
        None => Ok(None),
    }
}

pub(crate) fn put_player(
    table: &mut Table<'_, u64, &'static [u8]>,
    player: &PlayerRecord,
) -> ShopResult<()> {
    let value = encode(player)?;
    table.insert(player.id, value.as_slice())?;
    Ok(())
}

pub(crate) fn get_item(
    table: &impl ReadableTable<u64, &'static [u8]>,
    item_id: u64,
) -> ShopResult<Option<ItemRecord>> {
    match table.get(item_id)? {
        Some(value) => Ok(Some(decode(value.value())?)),
        None => Ok(None),
    }
}
