//! Identity provider.

use crate::identity::{Identity, DEFAULT_DISPLAY_NAME};
use crate::AuthError;
use shop_cache::Cache;
use tokio::sync::watch;

/// Storage key for the persisted identity.
pub const IDENTITY_KEY: &str = "shop_auth";

/// Owns the visitor's identity.
///
/// Subscribers get a [`watch::Receiver`] and see every login and logout.
/// Persistence is synchronous; a failed write is logged and the in-memory
/// change stands.
pub struct IdentityProvider {
    cache: Cache,
    tx: watch::Sender<Identity>,
}

impl std::fmt::Debug for IdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityProvider")
            .field("identity", &*self.tx.borrow())
            .finish_non_exhaustive()
    }
}

impl IdentityProvider {
    /// Restore the identity from `cache`, falling back to a guest.
    pub fn new(cache: Cache) -> Self {
        let identity: Identity = cache.load_or_default(IDENTITY_KEY);
        tracing::debug!(
            authenticated = identity.is_authenticated(),
            "restored identity"
        );
        let (tx, _rx) = watch::channel(identity);
        Self { cache, tx }
    }

    /// Sign in.
    ///
    /// The identity is marked authenticated and gets the default display
    /// name when it has none. Returns the identity as stored.
    pub fn login(&self, identity: Identity) -> Result<Identity, AuthError> {
        let user_id = match identity.user_id {
            Some(ref id) if !id.is_blank() => id.clone(),
            _ => return Err(AuthError::MissingUserId),
        };

        let display_name = identity
            .display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());

        let identity = Identity {
            authenticated: true,
            user_id: Some(user_id),
            session_token: identity.session_token,
            display_name: Some(display_name),
        };

        if let Err(e) = self.cache.set(IDENTITY_KEY, &identity) {
            tracing::warn!(error = %e, "failed to persist identity on login");
        }
        tracing::info!(user_id = ?identity.user_id, "logged in");
        self.tx.send_replace(identity.clone());
        Ok(identity)
    }

    /// Sign out and forget the stored identity.
    pub fn logout(&self) {
        if let Err(e) = self.cache.delete(IDENTITY_KEY) {
            tracing::warn!(error = %e, "failed to clear persisted identity on logout");
        }
        tracing::info!("logged out");
        self.tx.send_replace(Identity::guest());
    }

    /// Snapshot of the current identity.
    pub fn current_identity(&self) -> Identity {
        self.tx.borrow().clone()
    }

    /// Watch identity changes.
    pub fn subscribe(&self) -> watch::Receiver<Identity> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_cache::{CacheError, KvStore, MemoryStore};
    use std::sync::Arc;

    #[test]
    fn test_defaults_to_guest() {
        let provider = IdentityProvider::new(Cache::in_memory());
        assert_eq!(provider.current_identity(), Identity::guest());
    }

    #[test]
    fn test_malformed_record_is_guest() {
        let store = Arc::new(MemoryStore::new());
        store.set(IDENTITY_KEY, b"{{{").unwrap();
        let provider = IdentityProvider::new(Cache::new(store));
        assert!(!provider.current_identity().is_authenticated());
    }

    #[test]
    fn test_login_persists_and_defaults_name() {
        let cache = Cache::in_memory();
        let provider = IdentityProvider::new(cache.clone());

        let stored = provider
            .login(Identity::authenticated("u-1").with_token("tok"))
            .unwrap();
        assert_eq!(stored.display_name.as_deref(), Some("Guest"));

        let reloaded = IdentityProvider::new(cache);
        assert_eq!(reloaded.current_identity(), stored);
    }

    #[test]
    fn test_login_requires_user_id() {
        let provider = IdentityProvider::new(Cache::in_memory());
        let err = provider
            .login(Identity {
                authenticated: true,
                user_id: Some("  ".into()),
                ..Identity::default()
            })
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert!(!provider.current_identity().is_authenticated());
    }

    #[test]
    fn test_logout_clears_storage() {
        let cache = Cache::in_memory();
        let provider = IdentityProvider::new(cache.clone());
        provider.login(Identity::authenticated("u-1")).unwrap();
        provider.logout();

        assert!(!cache.exists(IDENTITY_KEY).unwrap());
        assert_eq!(provider.current_identity(), Identity::guest());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let provider = IdentityProvider::new(Cache::in_memory());
        let mut rx = provider.subscribe();

        provider.login(Identity::authenticated("u-9")).unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_authenticated());

        provider.logout();
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_authenticated());
    }

    struct ReadOnlyStore;

    impl KvStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &[u8]) -> Result<(), CacheError> {
            Err(CacheError::StoreError("read-only".to_string()))
        }

        fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::StoreError("read-only".to_string()))
        }

        fn keys(&self) -> Result<Vec<String>, CacheError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_persist_failure_keeps_in_memory_change() {
        let provider = IdentityProvider::new(Cache::new(Arc::new(ReadOnlyStore)));
        provider.login(Identity::authenticated("u-1")).unwrap();
        assert!(provider.current_identity().is_authenticated());
        provider.logout();
        assert!(!provider.current_identity().is_authenticated());
    }
}
