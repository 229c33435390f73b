//! ============================================================================
//! Catalog - Static item dataset and lazy seeding
//! ============================================================================
//! The items table is filled from `CATALOG` the first time it is listed while
//! empty. The emptiness check and the inserts share one write transaction, so
//! two concurrent first listings cannot both seed.
//! ============================================================================

mod data;

pub use data::{CatalogEntry, CATALOG, CATALOG_VERSION};

use redb::ReadableTableMetadata;
use tracing::{debug, info};

use crate::db::{encode, next_id, ItemRecord, Store, CATALOG_VERSION_KEY, ITEMS, META, SEQ_ITEMS};
use crate::error::ShopResult;
use crate::types::ItemView;

impl Store {
    /// Seed the items table if it is empty. Returns true if rows were written.
    pub fn seed_catalog(&self) -> ShopResult<bool> {
        let txn = self.begin_write()?;
        let seeded = {
            let mut items = txn.open_table(ITEMS)?;
            if !items.is_empty()? {
                false
            } else {
                let mut meta = txn.open_table(META)?;
                for entry in CATALOG {
                    let id = next_id(&mut meta, SEQ_ITEMS)?;
                    let record = to_record(id, entry);
                    items.insert(id, encode(&record)?.as_slice())?;
                }
                meta.insert(CATALOG_VERSION_KEY, CATALOG_VERSION)?;
                true
            }
        };
        txn.commit()?;

        if seeded {
            info!(
                "Seeded catalog v{} with {} items",
                CATALOG_VERSION,
                CATALOG.len()
            );
        }
        Ok(seeded)
    }

    /// Shop listing: seeds on first use, then orders by rarity, coin price,
    /// gem price (id breaks remaining ties).
    pub fn list_items(&self) -> ShopResult<Vec<ItemView>> {
        self.seed_catalog()?;

        let mut records = self.list_item_records()?;
        records.sort_by_key(|i| (i.rarity, i.price_coins, i.price_gems, i.id));

        debug!("Listing {} catalog items", records.len());
        Ok(records.iter().map(ItemView::from).collect())
    }
}

fn to_record(id: u64, entry: &CatalogEntry) -> ItemRecord {
    ItemRecord {
        id,
        name: entry.name.to_string(),
        icon: entry.icon.to_string(),
        description: entry.description.to_string(),
        category: entry.category,
        rarity: entry.rarity,
        price_coins: entry.price_coins,
        price_gems: entry.price_gems,
        attack_bonus: entry.attack_bonus,
        defense_bonus: entry.defense_bonus,
        health_bonus: entry.health_bonus,
        stackable: entry.stackable,
        tradeable: entry.tradeable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rarity;

    #[test]
    fn test_first_listing_seeds_once() {
        let store = Store::in_memory().unwrap();
        assert!(store.seed_catalog().unwrap());
        assert!(!store.seed_catalog().unwrap());
        assert_eq!(store.list_item_records().unwrap().len(), CATALOG.len());
        assert_eq!(store.catalog_version().unwrap(), Some(CATALOG_VERSION));
    }

    #[test]
    fn test_listing_is_idempotent_and_ordered() {
        let store = Store::in_memory().unwrap();
        let first = store.list_items().unwrap();
        let second = store.list_items().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), CATALOG.len());

        for pair in first.windows(2) {
            let a = (pair[0].rarity, pair[0].price_coins, pair[0].price_gems);
            let b = (pair[1].rarity, pair[1].price_coins, pair[1].price_gems);
            assert!(a <= b, "{:?} listed before {:?}", a, b);
        }
        assert_eq!(first.first().unwrap().rarity, Rarity::Common);
        assert_eq!(first.last().unwrap().rarity, Rarity::Legendary);
    }

    #[test]
    fn test_ids_follow_declaration_order() {
        let store = Store::in_memory().unwrap();
        store.seed_catalog().unwrap();

        let first = store.get_item(1).unwrap().unwrap();
        assert_eq!(first.name, CATALOG[0].name);
        let last = store.get_item(CATALOG.len() as u64).unwrap().unwrap();
        assert_eq!(last.name, CATALOG[CATALOG.len() - 1].name);
        assert!(store.get_item(CATALOG.len() as u64 + 1).unwrap().is_none());
    }

    #[test]
    fn test_cheapest_common_item_listed_first() {
        let store = Store::in_memory().unwrap();
        let items = store.list_items().unwrap();
        assert_eq!(items[0].name, "Bread");
    }
}
