//! Visitor identity for the storefront engine.
//!
//! Tracks whether the visitor is signed in and who they are. The identity is
//! read once from durable storage at startup, changes only through
//! [`IdentityProvider::login`] and [`IdentityProvider::logout`], and is
//! written back on every change. Stores watch it through
//! [`IdentityProvider::subscribe`].

mod error;
mod identity;
mod provider;

pub use error::AuthError;
pub use identity::{Identity, DEFAULT_DISPLAY_NAME};
pub use provider::{IdentityProvider, IDENTITY_KEY};
