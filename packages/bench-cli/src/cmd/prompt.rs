use anyhow::{bail, Result};

use extract_bench::PromptView;

use crate::context::AppContext;
use crate::render;

pub async fn show(ctx: &AppContext, strategy_id: &str) -> Result<()> {
    match ctx.controller().inspect_prompt(strategy_id).await {
        view @ PromptView::Detail(_) => {
            print!("{}", render::prompt_view(&view));
            Ok(())
        }
        PromptView::Unavailable(notice) => bail!(notice),
    }
}
