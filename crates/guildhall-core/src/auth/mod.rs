//! ============================================================================
//! Auth Module - Registration, Login and Bearer Tokens
//! ============================================================================
//! - Argon2id password hashing (salted)
//! - Opaque random tokens persisted by digest, with expiry
//! - Presence tracking: login marks a player online, logout offline
//!
//! Unknown usernames and wrong passwords fail with the same error.
//! ============================================================================

pub mod password;
pub mod tokens;

pub use tokens::{generate_token, parse_bearer, token_digest};

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{PlayerDefaults, ServerConfig};
use crate::db::{NewPlayer, Store, TokenRecord};
use crate::error::{ShopError, ShopResult};
use crate::types::{AuthSession, PublicProfile};

/// Registers players, checks credentials and manages issued tokens
pub struct AuthService {
    store: Arc<Store>,
    token_ttl_secs: i64,
    defaults: PlayerDefaults,
}

impl AuthService {
    pub fn new(store: Arc<Store>, config: &ServerConfig) -> Self {
        Self {
            store,
            token_ttl_secs: config.token_ttl_secs,
            defaults: config.player_defaults.clone(),
        }
    }

    /// Create an account and sign it in.
    /// Username and email are trimmed; the password is hashed as given.
    pub fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
        avatar: Option<&str>,
    ) -> ShopResult<AuthSession> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() || password.trim().is_empty() || email.is_empty() {
            return Err(ShopError::validation("Fill in all fields"));
        }
        let avatar = avatar
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(self.defaults.avatar.as_str());

        // Hash before taking the write lock
        let password_hash = password::hash_password(password)?;
        let player = self.store.create_player(NewPlayer {
            username,
            email,
            password_hash,
            avatar,
            defaults: &self.defaults,
        })?;

        let token = self.issue_token(player.id)?;
        info!("Registered player {} ({})", player.id, player.username);

        Ok(AuthSession {
            token,
            player: PublicProfile::from(&player),
        })
    }

    /// Check credentials, mark the player online and issue a new token
    pub fn login(&self, username: &str, password: &str) -> ShopResult<AuthSession> {
        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            return Err(ShopError::validation("Enter username and password"));
        }

        let player = match self.store.find_player_by_username(username)? {
            Some(p) => p,
            None => {
                password::verify_against_dummy(password);
                warn!("Login failed: unknown user");
                return Err(ShopError::InvalidCredentials);
            }
        };
        if !password::verify_password(password, &player.password_hash)? {
            warn!("Login failed for player {}", player.id);
            return Err(ShopError::InvalidCredentials);
        }

        let player = self.store.set_presence(player.id, true)?;
        let token = self.issue_token(player.id)?;
        info!("Player {} logged in", player.id);

        Ok(AuthSession {
            token,
            player: PublicProfile::from(&player),
        })
    }

    /// Resolve a token to its player id
    pub fn validate_token(&self, token: &str) -> ShopResult<u64> {
        let record = self
            .store
            .get_token(&token_digest(token))?
            .ok_or_else(|| ShopError::Unauthorized("invalid token".into()))?;

        if record.is_expired(chrono::Utc::now().timestamp()) {
            debug!("Rejected expired token for player {}", record.player_id);
            return Err(ShopError::Unauthorized("token expired".into()));
        }
        Ok(record.player_id)
    }

    /// Revoke a token and mark its player offline
    pub fn logout(&self, token: &str) -> ShopResult<u64> {
        let record = self
            .store
            .delete_token(&token_digest(token))?
            .ok_or_else(|| ShopError::Unauthorized("invalid token".into()))?;

        if record.is_expired(chrono::Utc::now().timestamp()) {
            return Err(ShopError::Unauthorized("token expired".into()));
        }

        self.store.set_presence(record.player_id, false)?;
        info!("Player {} logged out", record.player_id);
        Ok(record.player_id)
    }

    pub fn prune_expired_tokens(&self) -> ShopResult<usize> {
        self.store
            .prune_expired_tokens(chrono::Utc::now().timestamp())
    }

    fn issue_token(&self, player_id: u64) -> ShopResult<String> {
        let now = chrono::Utc::now().timestamp();
        let token = generate_token();
        let record = TokenRecord {
            player_id,
            issued_at: now,
            expires_at: now.saturating_add(self.token_ttl_secs),
        };
        self.store.store_token(&token_digest(&token), &record)?;
        Ok(token)
    }
}
