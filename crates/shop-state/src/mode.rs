//! Which persistence mode a store runs in.

use shop_auth::Identity;
use shop_commerce::ids::UserId;
use std::fmt;

/// Guest stores keep state locally; authenticated stores mirror the server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreMode {
    #[default]
    Guest,
    Authenticated(UserId),
}

impl StoreMode {
    /// The mode an identity calls for.
    pub fn for_identity(identity: &Identity) -> Self {
        match identity.account() {
            Some(user_id) => StoreMode::Authenticated(user_id.clone()),
            None => StoreMode::Guest,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, StoreMode::Authenticated(_))
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            StoreMode::Guest => None,
            StoreMode::Authenticated(user_id) => Some(user_id),
        }
    }
}

impl fmt::Display for StoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreMode::Guest => write!(f, "guest"),
            StoreMode::Authenticated(user_id) => write!(f, "user {}", user_id),
        }
    }
}
