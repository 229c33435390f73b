// ============================================================================
// guildhall-db - CLI database inspection tool for the Guildhall backend
// ============================================================================
// Usage:
//   guildhall-db stats                           Show database statistics
//   guildhall-db list-players [--online]         List player accounts
//   guildhall-db list-items [--rarity R] [--category C]  List the shop catalog
//   guildhall-db inventory --player ID           Show a player's purchases
//   guildhall-db export --format json            Export database as JSON
//   guildhall-db prune-tokens [--dry-run]        Delete expired tokens
//   guildhall-db grant --player ID --coins N     Credit currency to a player
//   guildhall-db seed                            Seed the catalog if empty
// ============================================================================

use anyhow::Result;
use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use guildhall_core::{ItemCategory, PublicProfile, Rarity, Store};

/// Guildhall database inspection tool
#[derive(Parser)]
#[command(name = "guildhall-db", version, about = "Inspect and manage the Guildhall game database")]
struct Cli {
    /// Path to the database file (default: ~/.guildhall/guildhall.redb)
    #[arg(long, global = true)]
    db_path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show database statistics (players, items, inventory, tokens)
    Stats,

    /// List player accounts
    ListPlayers {
        /// Only show players currently marked online
        #[arg(long)]
        online: bool,
    },

    /// List catalog items in shop order
    ListItems {
        /// Filter by rarity: common, rare, epic, legendary
        #[arg(long)]
        rarity: Option<String>,

        /// Filter by category (weapon, armor, potion, ...)
        #[arg(long)]
        category: Option<String>,
    },

    /// Show a player's inventory
    Inventory {
        #[arg(long)]
        player: u64,
    },

    /// Export database contents as JSON (password hashes and tokens excluded)
    Export {
        /// Output format (currently only json is supported)
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Delete expired bearer tokens
    PruneTokens {
        /// Show what would be pruned without actually deleting
        #[arg(long)]
        dry_run: bool,
    },

    /// Credit coins and/or gems to a player
    Grant {
        #[arg(long)]
        player: u64,

        #[arg(long, default_value = "0")]
        coins: u64,

        #[arg(long, default_value = "0")]
        gems: u64,
    },

    /// Seed the catalog now (no-op if items already exist)
    Seed,
}

fn parse_rarity(s: &str) -> Result<Rarity> {
    match s.to_lowercase().as_str() {
        "common" => Ok(Rarity::Common),
        "rare" => Ok(Rarity::Rare),
        "epic" => Ok(Rarity::Epic),
        "legendary" => Ok(Rarity::Legendary),
        _ => anyhow::bail!(
            "Unknown rarity '{}'. Valid values: common, rare, epic, legendary",
            s
        ),
    }
}

fn format_timestamp(ts: i64) -> String {
    Utc.timestamp_opt(ts, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("(invalid: {})", ts))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let store = Store::open(cli.db_path.as_deref())?;

    match cli.command {
        Commands::Stats => cmd_stats(&store),
        Commands::ListPlayers { online } => cmd_list_players(&store, online),
        Commands::ListItems { rarity, category } => cmd_list_items(&store, rarity, category),
        Commands::Inventory { player } => cmd_inventory(&store, player),
        Commands::Export { format } => cmd_export(&store, &format),
        Commands::PruneTokens { dry_run } => cmd_prune_tokens(&store, dry_run),
        Commands::Grant {
            player,
            coins,
            gems,
        } => cmd_grant(&store, player, coins, gems),
        Commands::Seed => cmd_seed(&store),
    }
}

fn cmd_stats(store: &Store) -> Result<()> {
    let stats = store.stats()?;

    println!("=== Guildhall Database Stats ===");
    if let Some(path) = store.path() {
        println!("Database: {}", path.display());
    }
    println!();
    println!(
        "Players:   {} total ({} online)",
        stats.total_players, stats.online_players
    );
    match stats.catalog_version {
        Some(v) => println!("Items:     {} (catalog v{})", stats.total_items, v),
        None => println!("Items:     {} (not seeded)", stats.total_items),
    }
    println!("Inventory: {} entries", stats.inventory_entries);
    println!(
        "Tokens:    {} live, {} expired",
        stats.live_tokens, stats.expired_tokens
    );

    Ok(())
}

fn cmd_list_players(store: &Store, online_only: bool) -> Result<()> {
    let players: Vec<_> = store
        .list_players()?
        .into_iter()
        .filter(|p| !online_only || p.online)
        .collect();

    if players.is_empty() {
        println!("No players found.");
        return Ok(());
    }

    println!(
        "{:<6}  {:<20}  {:>8}  {:>6}  {:>4}  {:>4}  {:>5}  {}",
        "ID", "USERNAME", "COINS", "GEMS", "ATK", "DEF", "MAXHP", "LAST SEEN"
    );
    println!("{}", "-".repeat(90));

    for p in &players {
        let last_seen = p
            .last_seen
            .map(format_timestamp)
            .unwrap_or_else(|| "never".into());
        println!(
            "{:<6}  {:<20}  {:>8}  {:>6}  {:>4}  {:>4}  {:>5}  {}{}",
            p.id,
            p.username,
            p.coins,
            p.gems,
            p.attack,
            p.defense,
            p.max_health,
            last_seen,
            if p.online { " (online)" } else { "" }
        );
    }

    println!("\nTotal: {} players", players.len());
    Ok(())
}

fn cmd_list_items(
    store: &Store,
    rarity_filter: Option<String>,
    category_filter: Option<String>,
) -> Result<()> {
    let rarity = rarity_filter.as_deref().map(parse_rarity).transpose()?;
    let category = match category_filter.as_deref() {
        Some(c) => match ItemCategory::from_str(c) {
            Some(cat) => Some(cat),
            None => anyhow::bail!("Unknown category '{}'", c),
        },
        None => None,
    };
    let items: Vec<_> = store
        .list_items()?
        .into_iter()
        .filter(|i| rarity.map_or(true, |r| i.rarity == r))
        .filter(|i| category.map_or(true, |c| i.category == c))
        .collect();

    println!(
        "{:<4}  {:<24}  {:<10}  {:<10}  {:>6}  {:>5}  {}",
        "ID", "NAME", "RARITY", "CATEGORY", "COINS", "GEMS", "BONUSES"
    );
    println!("{}", "-".repeat(90));

    for i in &items {
        println!(
            "{:<4}  {:<24}  {:<10}  {:<10}  {:>6}  {:>5}  atk+{} def+{} hp+{}",
            i.id,
            i.name,
            i.rarity.as_str(),
            i.category.as_str(),
            i.price_coins,
            i.price_gems,
            i.attack_bonus,
            i.defense_bonus,
            i.health_bonus
        );
    }

    println!("\nTotal: {} items", items.len());
    Ok(())
}

fn cmd_inventory(store: &Store, player_id: u64) -> Result<()> {
    let player = match store.get_player(player_id)? {
        Some(p) => p,
        None => anyhow::bail!("Player {} not found", player_id),
    };
    let entries = store.inventory(player_id)?;

    println!("=== Inventory of {} (#{}) ===", player.username, player.id);
    if entries.is_empty() {
        println!("No items.");
        return Ok(());
    }

    for entry in &entries {
        let name = store
            .get_item(entry.item_id)?
            .map(|i| format!("{} {}", i.icon, i.name))
            .unwrap_or_else(|| format!("(item {})", entry.item_id));
        println!(
            "  #{:<6} {:<30} x{}  {}",
            entry.entry_id,
            name,
            entry.quantity,
            format_timestamp(entry.acquired_at)
        );
    }

    println!("\nTotal: {} entries", entries.len());
    Ok(())
}

fn cmd_export(store: &Store, format: &str) -> Result<()> {
    if format != "json" {
        anyhow::bail!("Unsupported format '{}'. Only 'json' is supported.", format);
    }

    let players = store.list_players()?;
    let stats = store.stats()?;
    let items = store.list_item_records()?;

    let mut inventory = Vec::new();
    for p in &players {
        inventory.extend(store.inventory(p.id)?);
    }
    let profiles: Vec<_> = players.iter().map(PublicProfile::from).collect();

    let export = serde_json::json!({
        "exported_at": Utc::now().to_rfc3339(),
        "stats": stats,
        "players": profiles,
        "items": items,
        "inventory": inventory,
    });

    println!("{}", serde_json::to_string_pretty(&export)?);
    Ok(())
}

fn cmd_prune_tokens(store: &Store, dry_run: bool) -> Result<()> {
    let now = Utc::now().timestamp();

    if dry_run {
        println!("=== DRY RUN — no data will be deleted ===\n");

        let expired: Vec<_> = store
            .list_tokens()?
            .into_iter()
            .filter(|(_, t)| t.is_expired(now))
            .collect();

        println!("Would prune {} expired tokens", expired.len());
        for (digest, token) in &expired {
            println!(
                "  - {}… player {} (expired: {})",
                &digest[..12.min(digest.len())],
                token.player_id,
                format_timestamp(token.expires_at)
            );
        }
    } else {
        let pruned = store.prune_expired_tokens(now)?;
        println!("Pruned {} expired tokens", pruned);
    }

    Ok(())
}

fn cmd_grant(store: &Store, player_id: u64, coins: u64, gems: u64) -> Result<()> {
    if coins == 0 && gems == 0 {
        anyhow::bail!("Nothing to grant: pass --coins and/or --gems");
    }

    let player = store.credit(player_id, coins, gems)?;
    println!(
        "Granted {} coins, {} gems to {} (#{}): now {} coins, {} gems",
        coins, gems, player.username, player.id, player.coins, player.gems
    );
    Ok(())
}

fn cmd_seed(store: &Store) -> Result<()> {
    if store.seed_catalog()? {
        println!("Catalog seeded.");
    } else {
        println!("Catalog already present; nothing to do.");
    }
    Ok(())
}
