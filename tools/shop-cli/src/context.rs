//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use shop_auth::IdentityProvider;
use shop_cache::Cache;
use shop_state::{
    CartStore, CheckoutService, HttpStoreApi, StoreApi, StorefrontConfig, WishlistStore,
};

use crate::output::Output;

/// Config file names searched for, nearest directory first.
const CONFIG_NAMES: [&str; 3] = ["shop.toml", ".shop.toml", "shop.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// Storefront configuration.
    pub config: StorefrontConfig,
    /// The file the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    pub identity: IdentityProvider,
    pub cart: CartStore,
    pub wishlist: WishlistStore,
    pub checkout: CheckoutService,
}

impl Context {
    /// Load configuration and open the session's stores.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => {
                let path = resolve_path(&cwd, path);
                (StorefrontConfig::load(&path)?, Some(path))
            }
            None => match find_config(&cwd) {
                Some(path) => (StorefrontConfig::load(&path)?, Some(path)),
                None => (StorefrontConfig::default(), None),
            },
        };
        let config = config.with_env()?;
        tracing::debug!(path = ?config_path, api = %config.api_base_url, "configuration loaded");

        let data_dir = config.data_dir_or_default();
        output.debug(&format!("data directory: {}", data_dir.display()));
        let cache = Cache::open_dir(&data_dir)
            .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;

        let identity = IdentityProvider::new(cache.clone());
        let api: Arc<dyn StoreApi> = Arc::new(
            HttpStoreApi::from_config(&config, identity.subscribe())
                .context("Failed to set up the HTTP client")?,
        );
        let cart = CartStore::new(api.clone(), cache, identity.subscribe(), config.currency);
        let wishlist = WishlistStore::new(api.clone(), identity.subscribe());
        let checkout = CheckoutService::new(api, config.pricing);

        Ok(Self {
            config,
            config_path,
            output,
            identity,
            cart,
            wishlist,
            checkout,
        })
    }
}

/// Find the nearest config file walking up from `start`.
fn find_config(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    })
}

/// Resolve a path relative to the working directory.
fn resolve_path(cwd: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join(".shop.toml"), "").unwrap();

        assert_eq!(find_config(&nested), Some(root.path().join(".shop.toml")));
    }

    #[test]
    fn test_find_config_prefers_nearest() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("store");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join("shop.toml"), "").unwrap();
        std::fs::write(nested.join("shop.json"), "{}").unwrap();

        assert_eq!(find_config(&nested), Some(nested.join("shop.json")));
    }

    #[test]
    fn test_resolve_path() {
        let cwd = Path::new("/work");
        assert_eq!(resolve_path(cwd, "shop.toml"), PathBuf::from("/work/shop.toml"));
        assert_eq!(resolve_path(cwd, "/etc/shop.toml"), PathBuf::from("/etc/shop.toml"));
    }
}
