//! Upload a document and run the full strategy comparison

use anyhow::{bail, Context, Result};
use clap::Args;
use dialoguer::{Input, MultiSelect, Select};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use extract_bench::export;
use extract_bench::{result_card, DocumentUpload, FieldSchemaModel, Progress, SubmissionForm};

use super::user_error;
use crate::config::Config;
use crate::context::AppContext;
use crate::render;

/// Pause between the bar reaching 100% and the results being printed.
const RESULTS_DELAY: Duration = Duration::from_millis(500);

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Document to upload
    pub file: Option<PathBuf>,

    /// Field to extract, as `name` or `name=expected value` (repeatable)
    #[arg(short, long = "field", value_name = "NAME[=TRUTH]")]
    pub fields: Vec<String>,

    /// JSON object of expected values; each key becomes a field
    #[arg(short, long, value_name = "PATH")]
    pub ground_truth: Option<PathBuf>,

    /// Build the field list with prompts before submitting
    #[arg(short, long)]
    pub interactive: bool,

    /// LLM provider (overrides BENCH_PROVIDER)
    #[arg(long)]
    pub provider: Option<String>,

    /// Max concurrent strategy runs (overrides BENCH_MAX_CONCURRENT)
    #[arg(long)]
    pub max_concurrent: Option<u32>,

    /// Model name (overrides BENCH_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// Provider API key (overrides OPENROUTER_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Save the report, CSV summary, and extracted data here
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print the raw report as JSON instead of the ranked view
    #[arg(long)]
    pub json: bool,

    /// Run only this strategy (e.g., strategy_01) instead of all of them
    #[arg(short, long, value_name = "ID")]
    pub strategy: Option<String>,
}

pub async fn run(ctx: &AppContext, args: RunArgs) -> Result<()> {
    let mut controller = ctx.controller();

    for raw in &args.fields {
        let (name, truth) = parse_field_arg(raw);
        controller.fields_mut().add_named_field(name, truth);
    }
    if let Some(path) = &args.ground_truth {
        let entries = load_ground_truth(path)?;
        controller.fields_mut().add_ground_truth_entries(&entries);
    }
    if args.interactive {
        edit_fields(ctx, controller.fields_mut())?;
    }

    let file = match &args.file {
        Some(path) => Some(
            DocumentUpload::from_path(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => None,
    };
    if let Some(upload) = &file {
        ctx.print_info(&format!(
            "Selected: {} ({})",
            upload.file_name,
            render::format_file_size(upload.size())
        ));
    }

    let form = build_form(&ctx.config, &args, file);
    debug!(
        provider = %form.provider,
        max_concurrent = form.max_concurrent,
        model = ?form.model,
        strategy = ?args.strategy,
        "Resolved submission settings"
    );
    let show_progress = !ctx.quiet && !args.json;
    let (bar, updater) = spawn_progress_bar(controller.lifecycle().subscribe_progress(), show_progress)?;

    if let Some(strategy_id) = &args.strategy {
        let outcome = controller.submit_single(form, strategy_id).await;
        updater.abort();
        finish_progress_bar(&bar, controller.lifecycle().progress(), show_progress).await;

        let result = outcome.map_err(user_error)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print!("{}", render::single_result(&result_card(&result)));
        }
        if args.output_dir.is_some() {
            ctx.print_warning("Single-strategy runs are not exported");
        }
        return Ok(());
    }

    let outcome = controller.submit(form).await;
    updater.abort();
    finish_progress_bar(&bar, controller.lifecycle().progress(), show_progress).await;

    let view = outcome.map_err(user_error)?;

    match controller.current_report() {
        Some(report) if args.json => println!("{}", serde_json::to_string_pretty(report)?),
        _ => print!("{}", render::results_view(&view)),
    }

    let output_dir = args.output_dir.as_ref().or(ctx.config.output_dir.as_ref());
    if let (Some(dir), Some(report)) = (output_dir, controller.current_report()) {
        let saved = export::save_all(report, dir).map_err(user_error)?;
        ctx.print_success(&format!("✓ Report saved to {}", saved.json_report.display()));
        ctx.print_success(&format!("✓ Summary saved to {}", saved.csv_summary.display()));
        if !saved.extracted.is_empty() {
            ctx.print_success(&format!(
                "✓ Extracted data for {} strategies saved to {}",
                saved.extracted.len(),
                dir.join("extracted_data").display()
            ));
        }
    }

    Ok(())
}

/// Split `name=truth` on the first `=`. A bare name has no ground truth.
pub fn parse_field_arg(raw: &str) -> (String, Option<String>) {
    match raw.split_once('=') {
        Some((name, truth)) => (name.trim().to_string(), Some(truth.trim().to_string())),
        None => (raw.trim().to_string(), None),
    }
}

fn load_ground_truth(path: &Path) -> Result<Map<String, Value>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ground truth from {}", path.display()))?;
    parse_ground_truth(&raw).with_context(|| format!("Invalid ground truth in {}", path.display()))
}

fn parse_ground_truth(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(entries) => Ok(entries),
        _ => bail!("ground truth must be a JSON object"),
    }
}

/// Command-line values win over configuration.
fn build_form(config: &Config, args: &RunArgs, file: Option<DocumentUpload>) -> SubmissionForm {
    SubmissionForm {
        file,
        provider: args
            .provider
            .clone()
            .unwrap_or_else(|| config.provider.clone()),
        max_concurrent: args.max_concurrent.unwrap_or(config.max_concurrent),
        model: args.model.clone().or_else(|| config.model.clone()),
        api_key: args.api_key.clone().or_else(|| config.api_key.clone()),
    }
}

fn spawn_progress_bar(
    mut rx: watch::Receiver<Progress>,
    visible: bool,
) -> Result<(ProgressBar, JoinHandle<()>)> {
    let bar = if visible {
        ProgressBar::new(100)
    } else {
        ProgressBar::hidden()
    };
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")?
            .progress_chars("#>-"),
    );

    let handle = {
        let bar = bar.clone();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let progress = *rx.borrow_and_update();
                if let Progress::Running(percent) = progress {
                    bar.set_position(u64::from(percent));
                    bar.set_message(progress.message());
                    bar.enable_steady_tick(Duration::from_millis(100));
                }
            }
        })
    };

    Ok((bar, handle))
}

async fn finish_progress_bar(bar: &ProgressBar, progress: Progress, visible: bool) {
    match progress {
        Progress::Complete => {
            bar.set_position(100);
            bar.finish_with_message(Progress::Complete.message());
            if visible {
                tokio::time::sleep(RESULTS_DELAY).await;
            }
        }
        _ => bar.finish_and_clear(),
    }
}

fn edit_fields(ctx: &AppContext, fields: &mut FieldSchemaModel) -> Result<()> {
    let actions = ["Add field", "Remove fields", "Done"];

    loop {
        ctx.print_header("Fields to extract");
        print!("{}", render::field_table(fields));

        let choice = Select::with_theme(&ctx.theme())
            .with_prompt("Fields")
            .items(&actions)
            .default(if fields.is_empty() { 0 } else { 2 })
            .interact()
            .context("Failed to show field menu")?;

        match choice {
            0 => {
                let name: String = Input::with_theme(&ctx.theme())
                    .with_prompt("Field name")
                    .allow_empty(true)
                    .interact_text()?;
                let truth: String = Input::with_theme(&ctx.theme())
                    .with_prompt("Expected value (optional)")
                    .allow_empty(true)
                    .interact_text()?;
                let truth = Some(truth).filter(|t| !t.trim().is_empty());
                fields.add_named_field(name, truth);
            }
            1 if fields.is_empty() => ctx.print_warning("No fields to remove"),
            1 => {
                let labels: Vec<String> = fields
                    .fields()
                    .iter()
                    .map(|f| match f.name.trim() {
                        "" => format!("(unnamed {})", f.id),
                        name => name.to_string(),
                    })
                    .collect();
                let selected = MultiSelect::with_theme(&ctx.theme())
                    .with_prompt("Select fields to remove")
                    .items(&labels)
                    .interact()?;

                let ids: Vec<_> = selected.iter().map(|&i| fields.fields()[i].id).collect();
                for id in ids {
                    fields.remove_field(id);
                }
            }
            _ => break,
        }
    }

    Ok(())
}
