//! ============================================================================
//! GUILDHALL-CORE: Game Backend Library
//! ============================================================================
//! This crate handles all backend logic for the Guildhall browser game:
//! - Player accounts with Argon2 passwords and expiring bearer tokens
//! - Static item catalog, seeded on first listing
//! - Atomic purchases (check → debit → grant → buff) on redb
//! - JSON API routing with a tiny_http server adapter
//! ============================================================================

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod shop;
pub mod types;

// Re-export main types for convenience
pub use api::{ApiRequest, ApiResponse, ApiServer, Method, ShopApi, ShutdownHandle};
pub use auth::AuthService;
pub use config::{PlayerDefaults, ServerConfig};
pub use db::{DbStats, InventoryRecord, ItemRecord, PlayerRecord, Store, TokenRecord};
pub use error::{Currency, Resource, ShopError, ShopResult};
pub use shop::PurchaseEngine;
pub use types::*;
