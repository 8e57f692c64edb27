//! Cart commands.

use anyhow::{bail, Result};
use serde_json::{json, Value};
use shop_commerce::cart::{Cart, CartLine};
use shop_commerce::ids::ProductId;
use shop_state::{StagedQuantities, StagedRow};

use super::{note_degraded, report, CartArgs, CartCommand};
use crate::context::Context;
use crate::output::{mode_badge, outcome_label};

const WIDTHS: [usize; 5] = [6, 28, 10, 8, 12];

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let loaded = ctx.cart.load().await;
    note_degraded(ctx, &loaded);

    match args.command.unwrap_or(CartCommand::Show) {
        CartCommand::Show => show(ctx),
        CartCommand::Add { product, quantity } => {
            let outcome = ctx.cart.add_product(product, quantity).await;
            report(ctx, outcome, &format!("Added {} x product {}", quantity, product))?;
            show(ctx)
        }
        CartCommand::Remove { product } => {
            let outcome = ctx.cart.remove_line(product).await;
            report(ctx, outcome, &format!("Removed product {}", product))?;
            show(ctx)
        }
        CartCommand::Set { product, quantity } => {
            let outcome = ctx.cart.set_quantity(product, quantity).await;
            report(ctx, outcome, &format!("Product {} set to {}", product, quantity))?;
            show(ctx)
        }
        CartCommand::Clear => {
            ctx.cart.clear().await;
            ctx.output.success("Cart cleared");
            show(ctx)
        }
        CartCommand::Edit {
            set,
            increment,
            decrement,
            apply,
        } => edit(ctx, &set, &increment, &decrement, apply).await,
    }
}

fn show(ctx: &Context) -> Result<()> {
    let view = ctx.cart.snapshot();
    let total = ctx.cart.total_price()?;

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "mode": view.mode.to_string(),
            "lines": view.lines().iter().map(line_json).collect::<Vec<_>>(),
            "total_count": view.total_count(),
            "total_price": total.display_amount(),
            "currency": total.currency.code(),
        }));
        return Ok(());
    }

    ctx.output
        .header(&format!("Cart ({})", mode_badge(&view.mode)));
    if view.cart.is_empty() {
        ctx.output.info("Your cart is empty");
        return Ok(());
    }

    ctx.output
        .table_row(&["ID", "PRODUCT", "PRICE", "QTY", "SUBTOTAL"], &WIDTHS);
    for line in view.lines() {
        let subtotal = line.line_total()?;
        ctx.output.table_row(
            &[
                &line.product_id.to_string(),
                &line.display_name,
                &line.effective_unit_price().to_string(),
                &line.quantity.to_string(),
                &subtotal.to_string(),
            ],
            &WIDTHS,
        );
    }
    ctx.output.kv("items", &view.total_count().to_string());
    ctx.output.kv("total", &total.to_string());
    Ok(())
}

/// Stage quantity changes against the cart and apply them on request.
async fn edit(
    ctx: &Context,
    set: &[(ProductId, i64)],
    increment: &[ProductId],
    decrement: &[ProductId],
    apply: bool,
) -> Result<()> {
    let mut staged = StagedQuantities::new();
    let cart = ctx.cart.snapshot().cart;
    if !staged.observe(&cart) {
        bail!("Your cart is empty");
    }

    for &(product, quantity) in set {
        require_line(&cart, product)?;
        if quantity < 1 {
            ctx.output
                .warn(&format!("Ignoring quantity {} for product {}", quantity, product));
        }
        staged.set_pending(product, quantity);
    }
    for &product in increment {
        staged.increment(require_line(&cart, product)?);
    }
    for &product in decrement {
        staged.decrement(require_line(&cart, product)?);
    }

    if !apply {
        print_staged(ctx, &staged, &cart)?;
        if staged.has_unapplied_changes(&cart) && !ctx.output.is_json() {
            ctx.output.info("Changes not applied. Re-run with --apply to update the cart.");
        }
        return Ok(());
    }

    let outcomes = staged.commit(&ctx.cart).await;
    let mut failed = 0;
    for (product, outcome) in &outcomes {
        match outcome.user_message() {
            Some(message) if outcome.is_failure() => {
                failed += 1;
                ctx.output
                    .warn(&format!("Product {}: {}", product, message));
            }
            _ => ctx.output.debug(&format!(
                "product {}: {}",
                product,
                outcome_label(outcome)
            )),
        }
    }

    let cart = ctx.cart.snapshot().cart;
    print_staged(ctx, &staged, &cart)?;
    if failed > 0 {
        bail!("{} of {} update(s) failed", failed, outcomes.len());
    }
    ctx.output.success("Cart updated");
    Ok(())
}

fn require_line(cart: &Cart, product: ProductId) -> Result<&CartLine> {
    match cart.find(product) {
        Some(line) => Ok(line),
        None => bail!("Product {} is not in your cart", product),
    }
}

fn print_staged(ctx: &Context, staged: &StagedQuantities, cart: &Cart) -> Result<()> {
    let rows = staged.rows(cart)?;
    let total = ctx.cart.total_price()?;

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "rows": rows.iter().map(row_json).collect::<Vec<_>>(),
            "unapplied_changes": staged.has_unapplied_changes(cart),
            "total_price": total.display_amount(),
        }));
        return Ok(());
    }

    ctx.output.header("Cart");
    ctx.output
        .table_row(&["ID", "PRODUCT", "IN CART", "STAGED", "SUBTOTAL"], &WIDTHS);
    for row in &rows {
        let staged_qty = if row.stepper_quantity == row.committed_quantity {
            row.stepper_quantity.to_string()
        } else {
            format!("{}*", row.stepper_quantity)
        };
        ctx.output.table_row(
            &[
                &row.line.product_id.to_string(),
                &row.line.display_name,
                &row.committed_quantity.to_string(),
                &staged_qty,
                &row.line_subtotal.to_string(),
            ],
            &WIDTHS,
        );
    }
    ctx.output.kv("total", &total.to_string());
    Ok(())
}

fn line_json(line: &CartLine) -> Value {
    json!({
        "product_id": line.product_id,
        "name": line.display_name,
        "slug": line.slug,
        "quantity": line.quantity,
        "unit_price": line.effective_unit_price().display_amount(),
        "on_sale": line.is_on_sale(),
        "line_id": line.remote_line_id,
    })
}

fn row_json(row: &StagedRow<'_>) -> Value {
    json!({
        "product_id": row.line.product_id,
        "name": row.line.display_name,
        "committed_quantity": row.committed_quantity,
        "stepper_quantity": row.stepper_quantity,
        "line_subtotal": row.line_subtotal.display_amount(),
    })
}
