//! Type-safe durable key-value storage for the storefront engine.
//!
//! Guest carts and the signed-in identity have to survive a restart, so the
//! engine keeps them in a small key-value store with automatic JSON
//! serialization. Reads through [`Cache::load_or_default`] never fail: a
//! missing or corrupt entry reads back as the type's default.
//!
//! # Example
//!
//! ```rust
//! use shop_cache::Cache;
//!
//! let cache = Cache::in_memory();
//! cache.set("cart", &vec![1, 2, 3]).unwrap();
//!
//! let lines: Vec<u32> = cache.load_or_default("cart");
//! assert_eq!(lines, vec![1, 2, 3]);
//!
//! cache.delete("cart").unwrap();
//! assert!(cache.load_or_default::<Vec<u32>>("cart").is_empty());
//! ```

mod error;
mod kv;
mod store;

pub use error::CacheError;
pub use kv::Cache;
pub use store::{FileStore, KvStore, MemoryStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, KvStore, MemoryStore};
}
