//! ============================================================================
//! Shop Errors - Request-scoped failure kinds
//! ============================================================================
//! Every failure a request can hit maps to exactly one variant. Client-facing
//! kinds carry a stable `code()` and an HTTP status; storage and codec
//! failures collapse into a generic 500 at the API boundary.
//! ============================================================================

use serde::Serialize;

/// Record kinds that can be missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Player,
    Item,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Player => "player",
            Resource::Item => "item",
        }
    }
}

/// In-game currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    Coins,
    Gems,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Coins => "coins",
            Currency::Gems => "gems",
        }
    }
}

/// Error type for every shop and auth operation
#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{} not found", .0.as_str())]
    NotFound(Resource),

    #[error("Not enough {}", .0.as_str())]
    InsufficientFunds(Currency),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Numeric overflow in {0}")]
    Overflow(&'static str),
}

pub type ShopResult<T> = Result<T, ShopError>;

impl ShopError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::Validation(_) | ShopError::InsufficientFunds(_) => 400,
            ShopError::InvalidCredentials | ShopError::Unauthorized(_) => 401,
            ShopError::Forbidden(_) => 403,
            ShopError::NotFound(_) => 404,
            ShopError::Conflict(_) => 409,
            ShopError::Storage(_)
            | ShopError::Codec(_)
            | ShopError::Json(_)
            | ShopError::Io(_)
            | ShopError::PasswordHash(_)
            | ShopError::Overflow(_) => 500,
        }
    }

    /// Stable machine-readable error kind
    pub fn code(&self) -> &'static str {
        match self {
            ShopError::Validation(_) => "validation",
            ShopError::InvalidCredentials => "invalid_credentials",
            ShopError::Unauthorized(_) => "unauthorized",
            ShopError::Forbidden(_) => "forbidden",
            ShopError::Conflict(_) => "conflict",
            ShopError::NotFound(_) => "not_found",
            ShopError::InsufficientFunds(Currency::Gems) => "insufficient_gems",
            ShopError::InsufficientFunds(Currency::Coins) => "insufficient_coins",
            _ => "internal",
        }
    }

    /// Whether the failure is on our side (logged, never shown verbatim)
    pub fn is_internal(&self) -> bool {
        self.status_code() >= 500
    }
}

// redb splits its errors per phase; funnel them all through redb::Error.
macro_rules! storage_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ShopError {
                fn from(e: $ty) -> Self {
                    ShopError::Storage(e.into())
                }
            }
        )*
    };
}

storage_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ShopError::validation("x").status_code(), 400);
        assert_eq!(ShopError::InvalidCredentials.status_code(), 401);
        assert_eq!(ShopError::NotFound(Resource::Item).status_code(), 404);
        assert_eq!(ShopError::Conflict("username".into()).status_code(), 409);
        assert_eq!(
            ShopError::InsufficientFunds(Currency::Gems).status_code(),
            400
        );
        assert!(ShopError::Overflow("coins").is_internal());
    }

    #[test]
    fn test_error_codes_distinguish_currencies() {
        assert_eq!(
            ShopError::InsufficientFunds(Currency::Gems).code(),
            "insufficient_gems"
        );
        assert_eq!(
            ShopError::InsufficientFunds(Currency::Coins).code(),
            "insufficient_coins"
        );
        assert_eq!(ShopError::PasswordHash("x".into()).code(), "internal");
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ShopError::NotFound(Resource::Player).to_string(),
            "player not found"
        );
        assert_eq!(
            ShopError::InsufficientFunds(Currency::Coins).to_string(),
            "Not enough coins"
        );
    }
}
