//! Static shop catalog.
//!
//! Declaration order is the seeding order, so item ids are stable for a given
//! `CATALOG_VERSION`. Bump the version whenever an entry is added, removed or
//! changed.

use crate::types::{ItemCategory as C, Rarity as R};

/// Version recorded in the meta table when the catalog is seeded
pub const CATALOG_VERSION: u64 = 1;

/// One catalog definition. Omitted attributes default to zero prices and
/// bonuses, non-stackable, tradeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub category: C,
    pub rarity: R,
    pub price_coins: u64,
    pub price_gems: u64,
    pub attack_bonus: u32,
    pub defense_bonus: u32,
    pub health_bonus: u32,
    pub stackable: bool,
    pub tradeable: bool,
}

impl CatalogEntry {
    const fn new(
        name: &'static str,
        icon: &'static str,
        category: C,
        rarity: R,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            icon,
            description,
            category,
            rarity,
            price_coins: 0,
            price_gems: 0,
            attack_bonus: 0,
            defense_bonus: 0,
            health_bonus: 0,
            stackable: false,
            tradeable: true,
        }
    }

    const fn coins(mut self, price: u64) -> Self {
        self.price_coins = price;
        self
    }

    const fn gems(mut self, price: u64) -> Self {
        self.price_gems = price;
        self
    }

    const fn attack(mut self, bonus: u32) -> Self {
        self.attack_bonus = bonus;
        self
    }

    const fn defense(mut self, bonus: u32) -> Self {
        self.defense_bonus = bonus;
        self
    }

    const fn health(mut self, bonus: u32) -> Self {
        self.health_bonus = bonus;
        self
    }

    const fn stackable(mut self) -> Self {
        self.stackable = true;
        self
    }

    const fn untradeable(mut self) -> Self {
        self.tradeable = false;
        self
    }
}

const fn item(
    name: &'static str,
    icon: &'static str,
    category: C,
    rarity: R,
    description: &'static str,
) -> CatalogEntry {
    CatalogEntry::new(name, icon, category, rarity, description)
}

pub const CATALOG: &[CatalogEntry] = &[
    // Swords
    item("Wooden Sword", "🗡️", C::Weapon, R::Common, "A simple weapon for beginners").coins(50).attack(5),
    item("Iron Sword", "⚔️", C::Weapon, R::Common, "A reliable blade").coins(120).attack(12),
    item("Steel Sword", "🔪", C::Weapon, R::Rare, "Sharp as a razor").coins(250).attack(20),
    item("Flame Sword", "🔥", C::Weapon, R::Epic, "Burns in your hands").gems(50).attack(35),
    item("Frost Sword", "❄️", C::Weapon, R::Epic, "Freezes enemies").gems(55).attack(38),
    item("Lightning Sword", "⚡", C::Weapon, R::Epic, "Strikes with a shock").gems(60).attack(42),
    item("Excalibur", "🗡️", C::Weapon, R::Legendary, "The legendary sword of the king").gems(200).attack(80),
    item("Dragon Blade", "🐉", C::Weapon, R::Legendary, "Forged from dragon scales").gems(250).attack(95),
    // Armor
    item("Leather Armor", "🛡️", C::Armor, R::Common, "Basic protection").coins(60).defense(5),
    item("Chainmail", "⛓️", C::Armor, R::Common, "Sturdy protection").coins(150).defense(12),
    item("Steel Armor", "🛡️", C::Armor, R::Rare, "Excellent protection").coins(300).defense(22),
    item("Knight Armor", "🏰", C::Armor, R::Epic, "Armor of a true knight").gems(45).defense(35),
    item("Diamond Armor", "💎", C::Armor, R::Epic, "Sparkles like a diamond").gems(65).defense(45),
    item("Dragon Armor", "🐲", C::Armor, R::Legendary, "Made of dragon scales").gems(180).defense(70),
    item("Armor of the Gods", "👑", C::Armor, R::Legendary, "Divine protection").gems(300).defense(100),
    // Potions
    item("Small Health Potion", "🧪", C::Potion, R::Common, "+20 HP").coins(20).health(20).stackable(),
    item("Health Potion", "⚗️", C::Potion, R::Common, "+50 HP").coins(50).health(50).stackable(),
    item("Large Potion", "🍶", C::Potion, R::Rare, "+100 HP").coins(100).health(100).stackable(),
    item("Elixir of Life", "💊", C::Potion, R::Epic, "+200 HP").gems(30).health(200).stackable(),
    item("Potion of Immortality", "🌟", C::Potion, R::Legendary, "Full recovery").gems(100).health(500).stackable(),
    // Bows
    item("Bow", "🏹", C::Weapon, R::Common, "A ranged weapon").coins(80).attack(8),
    item("Crossbow", "🎯", C::Weapon, R::Rare, "A powerful crossbow").coins(200).attack(18),
    item("Enchanted Bow", "✨", C::Weapon, R::Epic, "Fires magic arrows").gems(70).attack(40),
    // Shields
    item("Wooden Shield", "🛡️", C::Shield, R::Common, "A simple shield").coins(40).defense(3),
    item("Iron Shield", "🔰", C::Shield, R::Common, "A sturdy shield").coins(90).defense(8),
    item("Magic Shield", "🌀", C::Shield, R::Epic, "Reflects magic").gems(50).defense(25),
    item("Hero Shield", "⭐", C::Shield, R::Legendary, "Impenetrable").gems(150).defense(50),
    // Rings
    item("Ring of Strength", "💍", C::Ring, R::Rare, "+10 attack").coins(180).attack(10),
    item("Ring of Protection", "💎", C::Ring, R::Rare, "+10 defense").coins(180).defense(10),
    item("Ring of Life", "❤️", C::Ring, R::Epic, "+50 max HP").gems(40).health(50),
    item("Ring of Dominion", "🔮", C::Ring, R::Legendary, "Absolute power").gems(200).attack(30).defense(30),
    // Axes and hammers
    item("Battle Axe", "🪓", C::Weapon, R::Common, "A heavy weapon").coins(110).attack(11),
    item("War Hammer", "🔨", C::Weapon, R::Rare, "A crushing blow").coins(220).attack(19),
    item("Mjolnir", "⚒️", C::Weapon, R::Legendary, "The hammer of Thor").gems(220).attack(90),
    // Staves
    item("Mage Staff", "🪄", C::Magic, R::Rare, "A magical weapon").coins(240).attack(16),
    item("Fire Staff", "🔥", C::Magic, R::Epic, "Fire magic").gems(75).attack(45),
    item("Ice Staff", "🧊", C::Magic, R::Epic, "Ice magic").gems(75).attack(45),
    item("Archmage Staff", "✨", C::Magic, R::Legendary, "The highest magic").gems(280).attack(100),
    // Helmets
    item("Warrior Helmet", "⛑️", C::Helmet, R::Common, "Basic head protection").coins(70).defense(4),
    item("Royal Crown", "👑", C::Helmet, R::Legendary, "The crown of a ruler").gems(250).defense(40).attack(20),
    // Daggers
    item("Dagger", "🗡️", C::Weapon, R::Common, "A quick weapon").coins(45).attack(6),
    item("Poisoned Dagger", "☠️", C::Weapon, R::Epic, "Deals poison damage").gems(55).attack(35),
    // Spears
    item("Spear", "🔱", C::Weapon, R::Rare, "A long weapon").coins(180).attack(17),
    item("Trident of Poseidon", "🌊", C::Weapon, R::Legendary, "Power over the seas").gems(240).attack(92),
    // Fencing blades
    item("Rapier", "🤺", C::Weapon, R::Rare, "An elegant weapon").coins(190).attack(18),
    item("Katana", "⚔️", C::Weapon, R::Epic, "The weapon of a samurai").gems(80).attack(48),
    // Firearms
    item("Musket", "🔫", C::Weapon, R::Rare, "A firearm").coins(280).attack(22),
    item("Plasma Cannon", "🚀", C::Weapon, R::Legendary, "A weapon from the future").gems(350).attack(110),
    // Amulets
    item("Amulet of Strength", "📿", C::Amulet, R::Rare, "Boosts attack").coins(160).attack(8),
    item("Amulet of Fortitude", "🔱", C::Amulet, R::Rare, "Boosts defense").coins(160).defense(8),
    item("Amulet of Life", "💚", C::Amulet, R::Epic, "+60 max HP").gems(45).health(60),
    item("Amulet of the Undying", "🌟", C::Amulet, R::Legendary, "A huge reserve of health").gems(190).health(150),
    // Gloves
    item("Thief Gloves", "🧤", C::Gloves, R::Common, "Nimble hands").coins(55).attack(3),
    item("Gauntlets of Might", "✊", C::Gloves, R::Epic, "Incredible strength").gems(50).attack(25),
    // Boots
    item("Traveler Boots", "👢", C::Boots, R::Common, "Comfortable footwear").coins(50).defense(2),
    item("Swift Boots", "👟", C::Boots, R::Epic, "Increase speed").gems(60).defense(20),
    // Cloaks
    item("Cloak of Invisibility", "🧥", C::Cloak, R::Legendary, "Makes you invisible").gems(280).defense(50),
    item("Hero Cloak", "🦸", C::Cloak, R::Epic, "A hero's protection").gems(70).defense(30),
    // Tomes and crystals
    item("Spellbook", "📖", C::Magic, R::Rare, "Ancient spells").coins(200).attack(15),
    item("Tome of Forbidden Magic", "📕", C::Magic, R::Legendary, "Dark magic").gems(260).attack(88),
    item("Mana Crystal", "💠", C::Magic, R::Rare, "A source of magic").coins(140).attack(12),
    item("Orb of Omniscience", "🔮", C::Magic, R::Legendary, "Sees the future").gems(270).attack(50).defense(40),
    // Tools
    item("Torch", "🔦", C::Tool, R::Common, "Lights the way").coins(15).stackable(),
    item("Pickaxe", "⛏️", C::Tool, R::Common, "For mining ore").coins(60),
    item("Fishing Rod", "🎣", C::Tool, R::Common, "For fishing").coins(50),
    // Food
    item("Bread", "🍞", C::Food, R::Common, "+5 HP").coins(5).health(5).stackable(),
    item("Meat", "🍖", C::Food, R::Common, "+15 HP").coins(15).health(15).stackable(),
    item("Golden Apple", "🍎", C::Food, R::Epic, "Instant healing").gems(20).health(100).stackable(),
    // Scrolls
    item("Scroll of Fire", "📜", C::Scroll, R::Rare, "A single-use spell").coins(120).attack(30).stackable(),
    item("Scroll of Ice", "🗒️", C::Scroll, R::Rare, "Freezes enemies").coins(120).attack(30).stackable(),
    item("Scroll of Teleportation", "🌀", C::Scroll, R::Epic, "Fast travel").gems(35).stackable(),
    // Runes
    item("Rune of Strength", "🔷", C::Rune, R::Epic, "A permanent bonus").gems(40).attack(20),
    item("Rune of Protection", "🔶", C::Rune, R::Epic, "Permanent protection").gems(40).defense(20),
    item("Rune of Immortality", "♾️", C::Rune, R::Legendary, "A huge reserve of HP").gems(300).health(200),
    // More potions
    item("Holy Water", "💧", C::Potion, R::Rare, "Cleanses and heals").coins(90).health(60).stackable(),
    item("Elixir of Strength", "⚡", C::Potion, R::Epic, "A temporary boost").gems(45).attack(30).stackable(),
    item("Elixir of Protection", "🛡️", C::Potion, R::Epic, "Temporary protection").gems(45).defense(30).stackable(),
    // Exploration
    item("Compass", "🧭", C::Tool, R::Common, "Points the way").coins(40),
    item("Treasure Map", "🗺️", C::Tool, R::Rare, "Leads to riches").coins(200),
    item("Treasury Key", "🔑", C::Tool, R::Epic, "Opens secret doors").gems(80),
    // Decorations
    item("Guild Banner", "🚩", C::Decoration, R::Rare, "A symbol of the guild").coins(150),
    item("Throne", "👑", C::Decoration, R::Legendary, "The seat of a ruler").gems(400),
    // Pets
    item("Pet: Dog", "🐕", C::Pet, R::Common, "A loyal friend").coins(200).attack(5),
    item("Pet: Cat", "🐈", C::Pet, R::Common, "A nimble companion").coins(180).defense(5),
    item("Pet: Wolf", "🐺", C::Pet, R::Rare, "A predatory beast").coins(350).attack(15),
    item("Pet: Eagle", "🦅", C::Pet, R::Rare, "A keen-eyed hunter").coins(320).attack(12),
    item("Pet: Phoenix", "🔥", C::Pet, R::Legendary, "Rises from the ashes").gems(320).attack(60).health(100),
    item("Pet: Dragon", "🐉", C::Pet, R::Legendary, "A mighty dragon").gems(500).attack(100).defense(50),
    // Skins
    item("Skin: Knight", "⚔️", C::Skin, R::Rare, "The look of a knight").coins(250).untradeable(),
    item("Skin: Mage", "🧙", C::Skin, R::Rare, "The look of a mage").coins(250).untradeable(),
    item("Skin: Assassin", "🥷", C::Skin, R::Epic, "The look of an assassin").gems(70).untradeable(),
    item("Skin: King", "🤴", C::Skin, R::Legendary, "A royal look").gems(250).untradeable(),
    item("Skin: Angel", "👼", C::Skin, R::Legendary, "A heavenly look").gems(280).untradeable(),
    item("Skin: Demon", "😈", C::Skin, R::Legendary, "An infernal look").gems(280).untradeable(),
];
