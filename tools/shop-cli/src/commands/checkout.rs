//! Summary and checkout commands.

use anyhow::{bail, Result};
use serde_json::json;
use shop_commerce::cart::CartSummary;
use shop_commerce::checkout::CustomerDetails;
use shop_state::{CheckoutForm, StoreOutcome};

use super::{note_degraded, CheckoutArgs};
use crate::context::Context;

/// Show the cart total with shipping and taxes.
pub async fn summary(ctx: &Context) -> Result<()> {
    let loaded = ctx.cart.load().await;
    note_degraded(ctx, &loaded);

    if ctx.cart.total_count() == 0 {
        if ctx.output.is_json() {
            ctx.output.json(&json!({ "items": 0 }));
        } else {
            ctx.output.info("Your cart is empty");
        }
        return Ok(());
    }

    let summary = ctx.checkout.summary(&ctx.cart)?;
    print_summary(ctx, &summary);
    Ok(())
}

/// Place an order for the cart.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let loaded = ctx.cart.load().await;
    note_degraded(ctx, &loaded);

    if let Some(code) = &args.coupon {
        match ctx.checkout.apply_coupon(code, &ctx.cart) {
            StoreOutcome::Applied => ctx.output.success(&format!("Coupon {} applied", code)),
            other => {
                if let Some(message) = other.user_message() {
                    ctx.output.warn(&message);
                }
            }
        }
    }

    let form = CheckoutForm {
        details: CustomerDetails {
            name: args.name,
            email: args.email,
            phone: args.phone,
            shipping_address: args.address,
            notes: args.notes,
        },
        shipping_method: args.shipping.into(),
        payment_method: args.payment.into(),
    };

    let summary = match ctx.checkout.summary(&ctx.cart) {
        Ok(summary) => summary,
        Err(e) => bail!("Cannot price the cart: {}", e),
    };
    let items = ctx.cart.total_count();
    let order_id = ctx.checkout.place_order(&ctx.cart, &form).await?;

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "order_id": order_id,
            "items": items,
            "total": summary.total.display_amount(),
            "shipping_method": form.shipping_method.as_str(),
            "payment_method": form.payment_method.as_str(),
        }));
        return Ok(());
    }

    ctx.output.success(&format!("Order #{} placed", order_id));
    print_summary(ctx, &summary);
    ctx.output.kv("shipping method", form.shipping_method.as_str());
    ctx.output.kv("payment method", form.payment_method.as_str());
    Ok(())
}

fn print_summary(ctx: &Context, summary: &CartSummary) {
    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "subtotal": summary.subtotal.display_amount(),
            "shipping": summary.shipping.display_amount(),
            "cgst": summary.cgst.display_amount(),
            "sgst": summary.sgst.display_amount(),
            "total": summary.total.display_amount(),
            "currency": summary.total.currency.code(),
        }));
        return;
    }

    let rules = ctx.checkout.pricing();
    ctx.output.header("Order summary");
    ctx.output.kv("subtotal", &summary.subtotal.to_string());
    ctx.output.kv("shipping", &summary.shipping.to_string());
    ctx.output
        .kv(&format!("CGST ({}%)", rules.cgst_percent), &summary.cgst.to_string());
    ctx.output
        .kv(&format!("SGST ({}%)", rules.sgst_percent), &summary.sgst.to_string());
    ctx.output.kv("total", &summary.total.to_string());
}
