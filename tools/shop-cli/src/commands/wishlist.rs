//! Wishlist commands.

use anyhow::{bail, Result};
use serde_json::json;
use shop_state::LOGIN_PROMPT;

use super::{note_degraded, report, WishlistArgs, WishlistCommand};
use crate::context::Context;

const WIDTHS: [usize; 3] = [6, 32, 12];

/// Run the wishlist command.
pub async fn run(args: WishlistArgs, ctx: &Context) -> Result<()> {
    let loaded = ctx.wishlist.load().await;
    note_degraded(ctx, &loaded);

    match args.command.unwrap_or(WishlistCommand::Show) {
        WishlistCommand::Show => show(ctx),
        WishlistCommand::Add { product } => {
            let outcome = ctx.wishlist.add_product(product).await;
            report(ctx, outcome, &format!("Saved product {}", product))?;
            show(ctx)
        }
        WishlistCommand::Remove { product } => {
            let outcome = ctx.wishlist.remove_entry(product).await;
            report(ctx, outcome, &format!("Removed product {}", product))?;
            show(ctx)
        }
        WishlistCommand::Toggle { product } => {
            let saved = ctx
                .wishlist
                .entries()
                .into_iter()
                .find(|entry| entry.product_id == product);
            let (outcome, done) = match saved {
                Some(entry) => (ctx.wishlist.toggle(entry).await, "Removed"),
                None => (ctx.wishlist.add_product(product).await, "Saved"),
            };
            report(ctx, outcome, &format!("{} product {}", done, product))?;
            show(ctx)
        }
        WishlistCommand::Clear => {
            let count = ctx.wishlist.count();
            let outcome = ctx.wishlist.clear_all().await;
            report(ctx, outcome, &format!("Removed {} product(s)", count))
        }
    }
}

fn show(ctx: &Context) -> Result<()> {
    if !ctx.wishlist.mode().is_authenticated() {
        bail!(LOGIN_PROMPT);
    }
    let entries = ctx.wishlist.entries();

    if ctx.output.is_json() {
        let entries: Vec<_> = entries
            .iter()
            .map(|entry| {
                json!({
                    "product_id": entry.product_id,
                    "name": entry.display_name,
                    "price": entry.display_price().display_amount(),
                    "on_sale": entry.display_price() != entry.price,
                    "image": entry.image_ref,
                })
            })
            .collect();
        ctx.output.json(&json!({ "entries": entries, "count": entries.len() }));
        return Ok(());
    }

    ctx.output.header("Wishlist");
    if entries.is_empty() {
        ctx.output.info("Nothing saved yet");
        return Ok(());
    }
    ctx.output.table_row(&["ID", "PRODUCT", "PRICE"], &WIDTHS);
    for entry in &entries {
        ctx.output.table_row(
            &[
                &entry.product_id.to_string(),
                &entry.display_name,
                &entry.display_price().to_string(),
            ],
            &WIDTHS,
        );
    }
    ctx.output.kv("saved", &entries.len().to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_state::StoreOutcome;

    #[test]
    fn test_login_prompt_matches_outcome() {
        assert_eq!(
            StoreOutcome::LoginRequired.user_message().as_deref(),
            Some(LOGIN_PROMPT)
        );
    }
}
