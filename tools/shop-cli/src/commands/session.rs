//! Session commands: login, logout, whoami.

use anyhow::Result;
use serde_json::json;
use shop_auth::Identity;

use super::{note_degraded, LoginArgs};
use crate::context::Context;
use crate::output::mode_badge;

/// Sign in and switch the stores over to the account.
pub async fn login(args: LoginArgs, ctx: &Context) -> Result<()> {
    let mut identity = Identity::authenticated(args.user_id);
    if let Some(token) = args.token {
        identity = identity.with_token(token);
    }
    if let Some(name) = args.name {
        identity = identity.with_display_name(name);
    }
    let identity = ctx.identity.login(identity)?;

    let cart = ctx.cart.sync_identity().await;
    note_degraded(ctx, &cart);
    let wishlist = ctx.wishlist.sync_identity().await;
    note_degraded(ctx, &wishlist);

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "user_id": identity.user_id,
            "display_name": identity.greeting_name(),
            "cart_items": ctx.cart.total_count(),
            "wishlist_items": ctx.wishlist.count(),
        }));
        return Ok(());
    }

    ctx.output
        .success(&format!("Signed in. Welcome, {}!", identity.greeting_name()));
    ctx.output.kv("cart", &format!("{} item(s)", ctx.cart.total_count()));
    ctx.output
        .kv("wishlist", &format!("{} product(s)", ctx.wishlist.count()));
    Ok(())
}

/// Sign out and return to the guest cart.
pub async fn logout(ctx: &Context) -> Result<()> {
    let was_signed_in = ctx.identity.current_identity().is_authenticated();
    ctx.identity.logout();

    ctx.cart.sync_identity().await;
    ctx.wishlist.sync_identity().await;

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "signed_out": was_signed_in,
            "cart_items": ctx.cart.total_count(),
        }));
        return Ok(());
    }

    if was_signed_in {
        ctx.output.success("Signed out");
    } else {
        ctx.output.info("Not signed in");
    }
    ctx.output
        .kv("guest cart", &format!("{} item(s)", ctx.cart.total_count()));
    Ok(())
}

/// Show the current identity.
pub async fn whoami(ctx: &Context) -> Result<()> {
    let identity = ctx.identity.current_identity();

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "authenticated": identity.is_authenticated(),
            "user_id": identity.user_id,
            "display_name": identity.greeting_name(),
            "has_token": identity.bearer_token().is_some(),
        }));
        return Ok(());
    }

    ctx.output.header("Session");
    ctx.output.kv("mode", &mode_badge(&ctx.cart.mode()));
    ctx.output.kv("name", identity.greeting_name());
    if identity.is_authenticated() {
        let token = if identity.bearer_token().is_some() {
            "present"
        } else {
            "none"
        };
        ctx.output.kv("token", token);
    }
    Ok(())
}
