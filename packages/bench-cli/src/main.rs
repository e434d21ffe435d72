//! Terminal client for the document extraction benchmark service

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cmd;
mod config;
mod context;
mod render;

use config::Config;
use context::AppContext;

#[derive(Parser)]
#[command(name = "extract-bench")]
#[command(about = "Compare extraction strategies against a document")]
#[command(version)]
struct Cli {
    /// Run in quiet mode (non-interactive)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available extraction strategies
    Strategies {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the prompt template of a strategy
    Prompt {
        /// Strategy id (e.g., strategy_01)
        id: String,
    },

    /// Upload a document and run every strategy against it
    Run(cmd::run::RunArgs),

    /// Check that the service is reachable
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,extract_bench=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    debug!(api_url = %config.api_url, provider = %config.provider, "Loaded configuration");
    let ctx = AppContext::new(config, cli.quiet)?;

    match cli.command {
        Some(Commands::Strategies { json }) => cmd::strategies::list(&ctx, json).await,
        Some(Commands::Prompt { id }) => cmd::prompt::show(&ctx, &id).await,
        Some(Commands::Run(args)) => cmd::run::run(&ctx, args).await,
        Some(Commands::Health) => cmd::health::check(&ctx).await,
        None => interactive_menu(&ctx).await,
    }
}

async fn interactive_menu(ctx: &AppContext) -> Result<()> {
    use dialoguer::{Input, Select};

    let items = vec![
        "📄 Run extraction",
        "📚 Browse strategies →",
        "🩺 Check service",
        "❌ Exit",
    ];

    loop {
        println!();
        let choice = Select::with_theme(&ctx.theme())
            .with_prompt("What would you like to do?")
            .items(&items)
            .default(0)
            .interact()?;

        match choice {
            0 => {
                let path: String = Input::with_theme(&ctx.theme())
                    .with_prompt("Document path")
                    .interact_text()?;
                let args = cmd::run::RunArgs {
                    file: Some(PathBuf::from(path.trim())),
                    interactive: true,
                    ..Default::default()
                };
                if let Err(e) = cmd::run::run(ctx, args).await {
                    warn!(error = %e, "Extraction run failed");
                    ctx.print_warning(&format!("{:#}", e));
                }
            }
            1 => cmd::strategies::browse(ctx).await?,
            2 => {
                if let Err(e) = cmd::health::check(ctx).await {
                    warn!(error = %e, "Health check failed");
                    ctx.print_warning(&format!("{:#}", e));
                }
            }
            _ => break,
        }
    }

    Ok(())
}
