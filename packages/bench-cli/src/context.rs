//! Application context with shared state and utilities

use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use std::sync::Arc;

use extract_bench::{BenchController, HttpBackend};

use crate::config::Config;

/// Application context passed to all commands
pub struct AppContext {
    pub quiet: bool,
    pub config: Config,
    pub backend: Arc<HttpBackend>,
}

impl AppContext {
    pub fn new(config: Config, quiet: bool) -> Result<Self> {
        let backend = Arc::new(HttpBackend::new(config.api_url.clone()));
        Ok(Self {
            quiet,
            config,
            backend,
        })
    }

    /// A fresh controller for this session.
    pub fn controller(&self) -> BenchController<HttpBackend> {
        BenchController::new(Arc::clone(&self.backend))
    }

    pub fn theme(&self) -> ColorfulTheme {
        ColorfulTheme::default()
    }

    pub fn print_header(&self, msg: &str) {
        if !self.quiet {
            println!();
            println!("{}", style(msg).bold());
        }
    }

    pub fn print_success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", style(msg).green());
        }
    }

    pub fn print_warning(&self, msg: &str) {
        if !self.quiet {
            println!("{}", style(msg).yellow());
        }
    }

    pub fn print_info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", style(msg).cyan());
        }
    }
}
