use anyhow::Result;

use extract_bench::BenchBackend;

use super::user_error;
use crate::context::AppContext;

pub async fn check(ctx: &AppContext) -> Result<()> {
    ctx.print_info(&format!("Checking {}...", ctx.backend.base_url()));
    let status = ctx.backend.health().await.map_err(user_error)?;
    ctx.print_success(&format!("✓ Service is {}", status));
    Ok(())
}
