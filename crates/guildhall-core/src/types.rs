//! ============================================================================
//! Core Types for Guildhall
//! ============================================================================
//! Item classification enums and the JSON shapes returned to the browser
//! client. Field names follow the client's camelCase contract.
//! ============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::{ItemRecord, PlayerRecord};

/// Item rarity, ordered common < rare < epic < legendary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shop item category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Weapon,
    Armor,
    Potion,
    Shield,
    Ring,
    Magic,
    Helmet,
    Amulet,
    Gloves,
    Boots,
    Cloak,
    Tool,
    Food,
    Scroll,
    Rune,
    Decoration,
    Pet,
    Skin,
}

impl ItemCategory {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "weapon" => Some(Self::Weapon),
            "armor" => Some(Self::Armor),
            "potion" => Some(Self::Potion),
            "shield" => Some(Self::Shield),
            "ring" => Some(Self::Ring),
            "magic" => Some(Self::Magic),
            "helmet" => Some(Self::Helmet),
            "amulet" => Some(Self::Amulet),
            "gloves" => Some(Self::Gloves),
            "boots" => Some(Self::Boots),
            "cloak" => Some(Self::Cloak),
            "tool" => Some(Self::Tool),
            "food" => Some(Self::Food),
            "scroll" => Some(Self::Scroll),
            "rune" => Some(Self::Rune),
            "decoration" => Some(Self::Decoration),
            "pet" => Some(Self::Pet),
            "skin" => Some(Self::Skin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Potion => "potion",
            Self::Shield => "shield",
            Self::Ring => "ring",
            Self::Magic => "magic",
            Self::Helmet => "helmet",
            Self::Amulet => "amulet",
            Self::Gloves => "gloves",
            Self::Boots => "boots",
            Self::Cloak => "cloak",
            Self::Tool => "tool",
            Self::Food => "food",
            Self::Scroll => "scroll",
            Self::Rune => "rune",
            Self::Decoration => "decoration",
            Self::Pet => "pet",
            Self::Skin => "skin",
        }
    }
}

/// Player profile as sent to the client (everything except credentials)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: u64,
    pub username: String,
    pub coins: u64,
    pub gems: u64,
    pub level: u32,
    pub experience: u64,
    pub health: u32,
    pub max_health: u32,
    pub attack: u32,
    pub defense: u32,
    pub avatar: String,
}

impl From<&PlayerRecord> for PublicProfile {
    fn from(p: &PlayerRecord) -> Self {
        Self {
            id: p.id,
            username: p.username.clone(),
            coins: p.coins,
            gems: p.gems,
            level: p.level,
            experience: p.experience,
            health: p.health,
            max_health: p.max_health,
            attack: p.attack,
            defense: p.defense,
            avatar: p.avatar.clone(),
        }
    }
}

/// Result of a successful register or login
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub player: PublicProfile,
}

/// Catalog entry as listed by the shop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
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
}

impl From<&ItemRecord> for ItemView {
    fn from(i: &ItemRecord) -> Self {
        Self {
            id: i.id,
            name: i.name.clone(),
            icon: i.icon.clone(),
            description: i.description.clone(),
            category: i.category,
            rarity: i.rarity,
            price_coins: i.price_coins,
            price_gems: i.price_gems,
            attack_bonus: i.attack_bonus,
            defense_bonus: i.defense_bonus,
            health_bonus: i.health_bonus,
        }
    }
}

/// Post-purchase balance and stat snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    pub coins: u64,
    pub gems: u64,
    pub attack: u32,
    pub defense: u32,
    pub max_health: u32,
}

/// Owned item, joined with its catalog name and icon
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedItem {
    pub entry_id: u64,
    pub item_id: u64,
    pub name: String,
    pub icon: String,
    pub quantity: u32,
    pub acquired_at: i64,
}
