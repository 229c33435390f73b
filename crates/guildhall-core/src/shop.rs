//! ============================================================================
//! Purchase Engine - Atomic check → debit → grant → buff
//! ============================================================================
//! A purchase reads the player's balance inside a redb write transaction and
//! holds it through commit. redb runs one writer at a time, so no other
//! purchase or credit on the same player can act on a stale balance.
//!
//! Any failure aborts the transaction: balances, stats and inventory are
//! either all updated or all untouched.
//! ============================================================================

use redb::{ReadableTable, Table, WriteTransaction};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::db::{
    decode, encode, get_item, get_player, next_id, put_player, InventoryRecord, Store, INVENTORY,
    ITEMS, META, PLAYERS, SEQ_INVENTORY,
};
use crate::error::{Currency, Resource, ShopError, ShopResult};
use crate::types::{OwnedItem, PurchaseReceipt};

/// Executes purchases against the store
pub struct PurchaseEngine {
    store: Arc<Store>,
    /// Refuse a second copy of a non-stackable item
    dedupe_unique_items: bool,
}

impl PurchaseEngine {
    pub fn new(store: Arc<Store>, config: &ServerConfig) -> Self {
        Self {
            store,
            dedupe_unique_items: config.dedupe_unique_items,
        }
    }

    /// Buy one unit of `item_id` for `player_id`
    pub fn purchase(&self, player_id: u64, item_id: u64) -> ShopResult<PurchaseReceipt> {
        let txn = self.store.begin_write()?;
        match self.apply(&txn, player_id, item_id) {
            Ok(receipt) => {
                txn.commit()?;
                info!(
                    "Player {} bought item {} (coins={}, gems={})",
                    player_id, item_id, receipt.coins, receipt.gems
                );
                Ok(receipt)
            }
            Err(e) => {
                txn.abort()?;
                debug!(
                    "Purchase of item {} by player {} rolled back: {}",
                    item_id, player_id, e
                );
                Err(e)
            }
        }
    }

    fn apply(
        &self,
        txn: &WriteTransaction,
        player_id: u64,
        item_id: u64,
    ) -> ShopResult<PurchaseReceipt> {
        let mut players = txn.open_table(PLAYERS)?;
        let mut player =
            get_player(&players, player_id)?.ok_or(ShopError::NotFound(Resource::Player))?;

        let items = txn.open_table(ITEMS)?;
        let item = get_item(&items, item_id)?.ok_or(ShopError::NotFound(Resource::Item))?;

        let mut inventory = txn.open_table(INVENTORY)?;
        if self.dedupe_unique_items && !item.stackable && owns(&inventory, player_id, item_id)? {
            return Err(ShopError::Conflict("item already owned".into()));
        }

        // Gems are checked first
        if item.price_gems > 0 && player.gems < item.price_gems {
            return Err(ShopError::InsufficientFunds(Currency::Gems));
        }
        if item.price_coins > 0 && player.coins < item.price_coins {
            return Err(ShopError::InsufficientFunds(Currency::Coins));
        }

        if item.price_gems > 0 {
            player.gems -= item.price_gems;
        }
        if item.price_coins > 0 {
            player.coins -= item.price_coins;
        }

        let mut meta = txn.open_table(META)?;
        let entry = InventoryRecord {
            entry_id: next_id(&mut meta, SEQ_INVENTORY)?,
            player_id,
            item_id,
            quantity: 1,
            acquired_at: chrono::Utc::now().timestamp(),
        };
        inventory.insert((player_id, entry.entry_id), encode(&entry)?.as_slice())?;

        player.attack = player.attack.saturating_add(item.attack_bonus);
        player.defense = player.defense.saturating_add(item.defense_bonus);
        player.max_health = player.max_health.saturating_add(item.health_bonus);
        put_player(&mut players, &player)?;

        Ok(PurchaseReceipt {
            coins: player.coins,
            gems: player.gems,
            attack: player.attack,
            defense: player.defense,
            max_health: player.max_health,
        })
    }

    /// A player's purchases joined with catalog names
    pub fn inventory(&self, player_id: u64) -> ShopResult<Vec<OwnedItem>> {
        if self.store.get_player(player_id)?.is_none() {
            return Err(ShopError::NotFound(Resource::Player));
        }

        let entries = self.store.inventory(player_id)?;
        let catalog: HashMap<u64, _> = self
            .store
            .list_item_records()?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        Ok(entries
            .into_iter()
            .map(|entry| {
                let (name, icon) = catalog
                    .get(&entry.item_id)
                    .map(|item| (item.name.clone(), item.icon.clone()))
                    .unwrap_or_default();
                OwnedItem {
                    entry_id: entry.entry_id,
                    item_id: entry.item_id,
                    name,
                    icon,
                    quantity: entry.quantity,
                    acquired_at: entry.acquired_at,
                }
            })
            .collect())
    }
}

fn owns(
    inventory: &Table<'_, (u64, u64), &'static [u8]>,
    player_id: u64,
    item_id: u64,
) -> ShopResult<bool> {
    for entry in inventory.range((player_id, 0)..=(player_id, u64::MAX))? {
        let (_key, value) = entry?;
        let record: InventoryRecord = decode(value.value())?;
        if record.item_id == item_id {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerDefaults;
    use crate::db::{ItemRecord, NewPlayer};
    use crate::types::{ItemCategory, Rarity};
    use std::thread;

    fn setup(dedupe: bool) -> (Arc<Store>, PurchaseEngine, u64) {
        let store = Arc::new(Store::in_memory().unwrap());
        store.seed_catalog().unwrap();
        let defaults = PlayerDefaults::default();
        let player = store
            .create_player(NewPlayer {
                username: "ayla",
                email: "ayla@example.com",
                password_hash: "x".into(),
                avatar: "🧙",
                defaults: &defaults,
            })
            .unwrap();
        let config = ServerConfig {
            dedupe_unique_items: dedupe,
            ..ServerConfig::default()
        };
        let engine = PurchaseEngine::new(Arc::clone(&store), &config);
        (store, engine, player.id)
    }

    fn item_id(store: &Store, name: &str) -> u64 {
        store
            .list_item_records()
            .unwrap()
            .into_iter()
            .find(|i| i.name == name)
            .unwrap()
            .id
    }

    /// Add an off-catalog item (e.g. priced in both currencies)
    fn insert_item(store: &Store, price_coins: u64, price_gems: u64) -> u64 {
        let txn = store.begin_write().unwrap();
        let id = {
            let mut meta = txn.open_table(META).unwrap();
            let id = next_id(&mut meta, crate::db::SEQ_ITEMS).unwrap();
            let record = ItemRecord {
                id,
                name: format!("Test Item {}", id),
                icon: "🧪".into(),
                description: String::new(),
                category: ItemCategory::Tool,
                rarity: Rarity::Common,
                price_coins,
                price_gems,
                attack_bonus: 1,
                defense_bonus: 0,
                health_bonus: 0,
                stackable: false,
                tradeable: true,
            };
            let mut items = txn.open_table(ITEMS).unwrap();
            items
                .insert(id, encode(&record).unwrap().as_slice())
                .unwrap();
            id
        };
        txn.commit().unwrap();
        id
    }

    #[test]
    fn test_successful_purchase_applies_everything() {
        let (store, engine, pid) = setup(false);
        let sword = item_id(&store, "Wooden Sword"); // 50 coins, +5 attack

        let receipt = engine.purchase(pid, sword).unwrap();
        assert_eq!(receipt.coins, 50);
        assert_eq!(receipt.attack, 15);
        assert_eq!(receipt.gems, 10);
        assert_eq!(receipt.defense, 5);
        assert_eq!(receipt.max_health, 100);

        let inventory = store.inventory(pid).unwrap();
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory[0].item_id, sword);
        assert_eq!(inventory[0].quantity, 1);

        let player = store.get_player(pid).unwrap().unwrap();
        assert_eq!(player.coins, 50);
        assert_eq!(player.attack, 15);
    }

    #[test]
    fn test_gem_purchase_and_health_bonus() {
        let (store, engine, pid) = setup(false);
        store.credit(pid, 0, 40).unwrap();
        let ring = item_id(&store, "Ring of Life"); // 40 gems, +50 max HP

        let receipt = engine.purchase(pid, ring).unwrap();
        assert_eq!(receipt.gems, 10);
        assert_eq!(receipt.coins, 100);
        assert_eq!(receipt.max_health, 150);
    }

    #[test]
    fn test_insufficient_gems_has_no_effect() {
        let (store, engine, pid) = setup(false);
        let before = store.get_player(pid).unwrap().unwrap();
        let flame = item_id(&store, "Flame Sword"); // 50 gems

        let err = engine.purchase(pid, flame).unwrap_err();
        assert!(matches!(err, ShopError::InsufficientFunds(Currency::Gems)));
        assert_eq!(store.get_player(pid).unwrap().unwrap(), before);
        assert!(store.inventory(pid).unwrap().is_empty());
    }

    #[test]
    fn test_insufficient_coins_has_no_effect() {
        let (store, engine, pid) = setup(false);
        let before = store.get_player(pid).unwrap().unwrap();
        let steel = item_id(&store, "Steel Sword"); // 250 coins

        let err = engine.purchase(pid, steel).unwrap_err();
        assert!(matches!(err, ShopError::InsufficientFunds(Currency::Coins)));
        assert_eq!(store.get_player(pid).unwrap().unwrap(), before);
        assert!(store.inventory(pid).unwrap().is_empty());
    }

    #[test]
    fn test_gems_checked_before_coins() {
        let (store, engine, pid) = setup(false);
        let both = insert_item(&store, 1_000, 1_000);
        assert!(matches!(
            engine.purchase(pid, both),
            Err(ShopError::InsufficientFunds(Currency::Gems))
        ));
    }

    #[test]
    fn test_dual_priced_item_debits_both() {
        let (store, engine, pid) = setup(false);
        let both = insert_item(&store, 30, 4);
        let receipt = engine.purchase(pid, both).unwrap();
        assert_eq!(receipt.coins, 70);
        assert_eq!(receipt.gems, 6);
    }

    #[test]
    fn test_unknown_player_and_item() {
        let (_store, engine, pid) = setup(false);
        assert!(matches!(
            engine.purchase(999, 1),
            Err(ShopError::NotFound(Resource::Player))
        ));
        assert!(matches!(
            engine.purchase(pid, 99_999),
            Err(ShopError::NotFound(Resource::Item))
        ));
    }

    #[test]
    fn test_duplicate_unique_items_allowed_by_default() {
        let (store, engine, pid) = setup(false);
        let pickaxe = item_id(&store, "Pickaxe"); // 60 coins, not stackable
        store.credit(pid, 100, 0).unwrap();

        engine.purchase(pid, pickaxe).unwrap();
        engine.purchase(pid, pickaxe).unwrap();
        assert_eq!(store.inventory(pid).unwrap().len(), 2);
    }

    #[test]
    fn test_dedupe_mode_rejects_second_unique_copy() {
        let (store, engine, pid) = setup(true);
        let pickaxe = item_id(&store, "Pickaxe");
        let bread = item_id(&store, "Bread"); // stackable
        store.credit(pid, 100, 0).unwrap();

        engine.purchase(pid, pickaxe).unwrap();
        let coins_after_first = store.get_player(pid).unwrap().unwrap().coins;
        assert!(matches!(
            engine.purchase(pid, pickaxe),
            Err(ShopError::Conflict(_))
        ));
        assert_eq!(
            store.get_player(pid).unwrap().unwrap().coins,
            coins_after_first
        );

        engine.purchase(pid, bread).unwrap();
        engine.purchase(pid, bread).unwrap();
        assert_eq!(store.inventory(pid).unwrap().len(), 3);
    }

    #[test]
    fn test_concurrent_purchases_never_overdraw() {
        let (store, engine, pid) = setup(false);
        let engine = Arc::new(engine);
        let pricey = insert_item(&store, 60, 0); // more than half of 100

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || engine.purchase(pid, pricey))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        for r in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(matches!(r, ShopError::InsufficientFunds(Currency::Coins)));
        }
        let player = store.get_player(pid).unwrap().unwrap();
        assert_eq!(player.coins, 40);
        assert_eq!(player.attack, 11);
        assert_eq!(store.inventory(pid).unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_small_purchases_sum_correctly() {
        let (store, engine, pid) = setup(false);
        let engine = Arc::new(engine);
        let cheap = insert_item(&store, 30, 0);

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || engine.purchase(pid, cheap).is_ok())
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 3);
        let player = store.get_player(pid).unwrap().unwrap();
        assert_eq!(player.coins, 10);
        assert_eq!(player.attack, 13);
        assert_eq!(store.inventory(pid).unwrap().len(), 3);
    }

    #[test]
    fn test_inventory_view_joins_catalog() {
        let (store, engine, pid) = setup(false);
        let sword = item_id(&store, "Wooden Sword");
        engine.purchase(pid, sword).unwrap();

        let owned = engine.inventory(pid).unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].name, "Wooden Sword");
        assert!(matches!(
            engine.inventory(404),
            Err(ShopError::NotFound(Resource::Player))
        ));
    }
}
