//! CLI command implementations.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod session;
pub mod wishlist;

use anyhow::{bail, Result};
use clap::{Args, Subcommand, ValueEnum};
use shop_commerce::checkout::{PaymentMethod, ShippingMethod};
use shop_commerce::ids::ProductId;
use shop_state::StoreOutcome;

use crate::context::Context;

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// User ID issued by the backend.
    pub user_id: String,

    /// Session token sent as a bearer token.
    #[arg(short, long)]
    pub token: Option<String>,

    /// Name to greet you by.
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart.
    Show,
    /// Add a product.
    Add {
        /// Product ID.
        product: ProductId,
        /// Quantity to add.
        #[arg(short, long, default_value = "1")]
        quantity: i64,
    },
    /// Remove a product.
    Remove {
        /// Product ID.
        product: ProductId,
    },
    /// Set a product's quantity; zero removes it.
    Set {
        /// Product ID.
        product: ProductId,
        /// New quantity.
        quantity: i64,
    },
    /// Empty the cart.
    Clear,
    /// Stage quantity changes and optionally apply them.
    Edit {
        /// Stage a quantity, as PRODUCT=QUANTITY.
        #[arg(short, long = "set", value_parser = parse_staged)]
        set: Vec<(ProductId, i64)>,
        /// Step a product's quantity up by one.
        #[arg(long = "inc")]
        increment: Vec<ProductId>,
        /// Step a product's quantity down by one.
        #[arg(long = "dec")]
        decrement: Vec<ProductId>,
        /// Write the staged quantities to the cart.
        #[arg(short, long)]
        apply: bool,
    },
}

/// Arguments for the wishlist command.
#[derive(Args)]
pub struct WishlistArgs {
    #[command(subcommand)]
    pub command: Option<WishlistCommand>,
}

#[derive(Subcommand)]
pub enum WishlistCommand {
    /// Show the wishlist.
    Show,
    /// Save a product.
    Add {
        /// Product ID.
        product: ProductId,
    },
    /// Forget a product.
    Remove {
        /// Product ID.
        product: ProductId,
    },
    /// Save a product, or forget it if already saved.
    Toggle {
        /// Product ID.
        product: ProductId,
    },
    /// Forget every product.
    Clear,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Full name.
    #[arg(long)]
    pub name: String,

    /// Email address.
    #[arg(long)]
    pub email: String,

    /// Phone number.
    #[arg(long)]
    pub phone: String,

    /// Shipping address.
    #[arg(long)]
    pub address: String,

    /// Note for the order.
    #[arg(long)]
    pub notes: Option<String>,

    /// Shipping method.
    #[arg(long, value_enum, default_value_t = ShippingArg::Standard)]
    pub shipping: ShippingArg,

    /// Payment method.
    #[arg(long, value_enum, default_value_t = PaymentArg::Cod)]
    pub payment: PaymentArg,

    /// Coupon code to try before ordering.
    #[arg(long)]
    pub coupon: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ShippingArg {
    Standard,
    Express,
}

impl From<ShippingArg> for ShippingMethod {
    fn from(arg: ShippingArg) -> Self {
        match arg {
            ShippingArg::Standard => ShippingMethod::Standard,
            ShippingArg::Express => ShippingMethod::Express,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PaymentArg {
    Cod,
    Online,
}

impl From<PaymentArg> for PaymentMethod {
    fn from(arg: PaymentArg) -> Self {
        match arg {
            PaymentArg::Cod => PaymentMethod::Cod,
            PaymentArg::Online => PaymentMethod::Online,
        }
    }
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Print the config file path in use.
    Path,
}

fn parse_staged(value: &str) -> Result<(ProductId, i64), String> {
    let (product, quantity) = value
        .split_once('=')
        .ok_or_else(|| format!("expected PRODUCT=QUANTITY, got '{}'", value))?;
    let product = product
        .parse::<ProductId>()
        .map_err(|e| format!("bad product id '{}': {}", product, e))?;
    let quantity = quantity
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("bad quantity '{}': {}", quantity, e))?;
    Ok((product, quantity))
}

/// Print a store outcome and turn refusals into errors.
fn report(ctx: &Context, outcome: StoreOutcome, done: &str) -> Result<()> {
    match outcome {
        StoreOutcome::Applied => {
            ctx.output.success(done);
            Ok(())
        }
        degraded @ StoreOutcome::Degraded { .. } => {
            ctx.output.success(done);
            note_degraded(ctx, &degraded);
            Ok(())
        }
        failure => match failure.user_message() {
            Some(message) => bail!(message),
            None => bail!("{}", crate::output::outcome_label(&failure)),
        },
    }
}

/// Warn if the store fell back to saved data.
fn note_degraded(ctx: &Context, outcome: &StoreOutcome) {
    if let StoreOutcome::Degraded { reason } = outcome {
        ctx.output
            .warn(&format!("Could not refresh from the server ({}); showing saved data", reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_staged() {
        assert_eq!(parse_staged("7=3"), Ok((ProductId::new(7), 3)));
        assert_eq!(parse_staged(" 7 = 0"), Ok((ProductId::new(7), 0)));
        assert!(parse_staged("7").is_err());
        assert!(parse_staged("seven=1").is_err());
        assert!(parse_staged("7=lots").is_err());
    }

    #[test]
    fn test_methods_map_to_wire_values() {
        assert_eq!(ShippingMethod::from(ShippingArg::Express).as_str(), "express");
        assert_eq!(PaymentMethod::from(PaymentArg::Online).as_str(), "online");
    }
}
