//! Identity type.

use serde::{Deserialize, Serialize};
use shop_commerce::ids::UserId;

/// Name shown for a signed-in visitor who never gave one.
pub const DEFAULT_DISPLAY_NAME: &str = "Guest";

/// Who the visitor is.
///
/// Every field is defaulted on deserialization so that a partially written
/// record still reads back as something usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    /// Whether the visitor is signed in.
    pub authenticated: bool,
    /// Server-known user id.
    pub user_id: Option<UserId>,
    /// Bearer token for the remote store.
    pub session_token: Option<String>,
    /// Name to greet the visitor with.
    pub display_name: Option<String>,
}

impl Identity {
    /// The signed-out identity.
    pub fn guest() -> Self {
        Self::default()
    }

    /// A signed-in identity for `user_id`.
    pub fn authenticated(user_id: impl Into<UserId>) -> Self {
        Self {
            authenticated: true,
            user_id: Some(user_id.into()),
            session_token: None,
            display_name: None,
        }
    }

    /// Attach a session token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Attach a display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Check if the visitor is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// The account the visitor is signed in to, if any.
    ///
    /// A record flagged authenticated but missing its user id counts as
    /// signed out.
    pub fn account(&self) -> Option<&UserId> {
        if self.authenticated {
            self.user_id.as_ref().filter(|id| !id.is_blank())
        } else {
            None
        }
    }

    /// Token to send as `Authorization: Bearer`, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.session_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }

    /// Name to show in greetings.
    pub fn greeting_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(DEFAULT_DISPLAY_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_has_no_account() {
        let guest = Identity::guest();
        assert!(!guest.is_authenticated());
        assert!(guest.account().is_none());
        assert!(guest.bearer_token().is_none());
    }

    #[test]
    fn test_authenticated_account() {
        let id = Identity::authenticated("u-1").with_token("tok");
        assert_eq!(id.account().map(|u| u.as_str()), Some("u-1"));
        assert_eq!(id.bearer_token(), Some("tok"));
    }

    #[test]
    fn test_flag_without_user_id_is_not_an_account() {
        let id = Identity {
            authenticated: true,
            ..Identity::default()
        };
        assert!(id.account().is_none());
    }

    #[test]
    fn test_partial_record_deserializes() {
        let id: Identity = serde_json::from_str(r#"{"authenticated":true,"user_id":"7"}"#).unwrap();
        assert_eq!(id.account().map(|u| u.as_str()), Some("7"));
        assert!(id.session_token.is_none());
        assert_eq!(id.greeting_name(), "Guest");
    }
}
