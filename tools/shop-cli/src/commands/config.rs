//! Configuration commands.

use anyhow::Result;

use super::{ConfigArgs, ConfigCommand};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Path => show_path(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    if let Some(path) = &ctx.config_path {
        ctx.output.kv("file", &path.display().to_string());
    }
    ctx.output.kv("api_base_url", &ctx.config.api_base_url);
    ctx.output
        .kv("request_timeout_secs", &ctx.config.request_timeout_secs.to_string());
    ctx.output.kv(
        "data_dir",
        &ctx.config.data_dir_or_default().display().to_string(),
    );
    ctx.output.kv("currency", ctx.config.currency.code());

    ctx.output.info("");
    ctx.output.info("[pricing]");
    let pricing = &ctx.config.pricing;
    ctx.output.kv("shipping_flat", &pricing.shipping_flat.to_string());
    ctx.output.kv("cgst_percent", &pricing.cgst_percent.to_string());
    ctx.output.kv("sgst_percent", &pricing.sgst_percent.to_string());

    let rendered = toml::to_string_pretty(&ctx.config)?;
    ctx.output.debug(&format!("effective config:\n{}", rendered));
    Ok(())
}

fn show_path(ctx: &Context) -> Result<()> {
    match &ctx.config_path {
        Some(path) if ctx.output.is_json() => {
            ctx.output.json(&serde_json::json!({ "path": path }))
        }
        Some(path) => println!("{}", path.display()),
        None => ctx
            .output
            .info("No config file found; using defaults and SHOP_* environment variables"),
    }
    Ok(())
}
