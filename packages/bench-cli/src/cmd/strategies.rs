//! Strategy catalog commands

use anyhow::{Context, Result};
use dialoguer::Select;

use super::user_error;
use crate::context::AppContext;
use crate::render;

pub async fn list(ctx: &AppContext, json: bool) -> Result<()> {
    let mut controller = ctx.controller();
    let strategies = controller.load_strategies().await.map_err(user_error)?;

    if json {
        println!("{}", serde_json::to_string_pretty(strategies)?);
        return Ok(());
    }

    if strategies.is_empty() {
        ctx.print_warning("The service reported no strategies");
        return Ok(());
    }

    ctx.print_header(&format!("{} strategies", strategies.len()));
    print!("{}", render::strategy_list(strategies));
    Ok(())
}

/// Pick strategies from the catalog and view their prompts until Back.
pub async fn browse(ctx: &AppContext) -> Result<()> {
    let mut controller = ctx.controller();
    if let Err(e) = controller.load_strategies().await {
        ctx.print_warning(&e.user_message());
        return Ok(());
    }

    let mut items: Vec<String> = controller
        .strategies()
        .iter()
        .map(|s| format!("{} ({}, est. {})", s.name, s.category, s.cost_label()))
        .collect();
    items.push("← Back".to_string());

    loop {
        println!();
        let choice = Select::with_theme(&ctx.theme())
            .with_prompt("View prompt for")
            .items(&items)
            .default(0)
            .interact()
            .context("Failed to show strategy selector")?;

        let Some(strategy) = controller.strategies().get(choice) else {
            break;
        };
        let view = controller.inspect_prompt(&strategy.id).await;
        print!("{}", render::prompt_view(&view));
    }

    Ok(())
}
