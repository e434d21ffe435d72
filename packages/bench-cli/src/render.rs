//! Text rendering of catalog, prompts, fields, and reports.

use colored::Colorize;
use std::fmt::Write;

use extract_bench::{
    CardOutcome, FieldSchemaModel, PromptView, ResultCard, ResultsView, Strategy,
};

const RULE_WIDTH: usize = 80;

fn rule(ch: char) -> String {
    ch.to_string().repeat(RULE_WIDTH)
}

/// Human-readable byte size, e.g. `12.3 KB`.
pub fn format_file_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let bytes = bytes as f64;
    if bytes < KB * KB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{:.1} MB", bytes / (KB * KB))
    }
}

pub fn strategy_list(strategies: &[Strategy]) -> String {
    let mut out = String::new();
    for strategy in strategies {
        let _ = writeln!(
            out,
            "{} {}  {}",
            strategy.id.dimmed(),
            strategy.name.bold(),
            format!("[{}]", strategy.category).cyan()
        );
        let _ = writeln!(out, "    {}", strategy.description);
        let _ = writeln!(
            out,
            "    Est. Cost {}",
            strategy.cost_label().bright_green()
        );
    }
    out
}

pub fn prompt_view(view: &PromptView) -> String {
    match view {
        PromptView::Detail(detail) => {
            let mut out = String::new();
            let _ = writeln!(out, "{}", rule('='));
            let _ = writeln!(out, "{} ({})", detail.name.bold(), detail.id.dimmed());
            let _ = writeln!(out, "Category: {}", detail.category.cyan());
            let _ = writeln!(out, "{}", detail.description);
            let _ = writeln!(out, "{}", rule('-'));
            let _ = writeln!(out, "{}", detail.prompt_template);
            let _ = writeln!(out, "{}", rule('='));
            out
        }
        PromptView::Unavailable(notice) => format!("{}\n", notice.bright_red()),
    }
}

pub fn field_table(fields: &FieldSchemaModel) -> String {
    if fields.is_empty() {
        return "No fields defined; the service will choose what to extract.\n".to_string();
    }

    let mut out = String::new();
    for field in fields.fields() {
        let name = if field.name.trim().is_empty() {
            "(unnamed, skipped)".dimmed().to_string()
        } else {
            field.name.trim().to_string()
        };
        let truth = field
            .ground_truth
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| format!(" = {}", t.green()))
            .unwrap_or_default();
        let _ = writeln!(out, "  • {}{}", name, truth);
    }
    out
}

pub fn results_view(view: &ResultsView) -> String {
    let report = match view {
        ResultsView::Empty => return format!("{}\n", "No results found".bold()),
        ResultsView::Report(report) => report,
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", rule('='));
    let _ = writeln!(out, "{}", "EXTRACTION RESULTS".bold());
    let _ = writeln!(out, "{}", rule('='));
    let _ = writeln!(out, "Document: {}", report.document_name);
    let _ = writeln!(out, "Tested at: {}", report.tested_at);
    if let Some(best) = &report.best_strategy {
        let _ = writeln!(out, "{}", format!("🏆 Best: {}", best).bright_yellow().bold());
    }

    let summary = &report.summary;
    let _ = writeln!(out);
    let _ = writeln!(out, "Total Strategies: {}", summary.total_strategies);
    let _ = writeln!(
        out,
        "Successful: {}",
        summary.successful_extractions.to_string().green()
    );
    let _ = writeln!(out, "Failed: {}", summary.failed_extractions.to_string().red());
    let _ = writeln!(out, "Avg Time: {}", summary.average_time_label());

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", rule('-'));
    let _ = writeln!(out, "{}", "INDIVIDUAL STRATEGY RESULTS".bold());
    let _ = writeln!(out, "{}", rule('-'));
    for card in &report.cards {
        out.push_str(&result_card(card));
    }
    let _ = writeln!(out, "{}", rule('='));
    out
}

/// A single-strategy run, outside of any report.
pub fn single_result(card: &ResultCard) -> String {
    let mut out = result_card(card);
    let _ = writeln!(out, "{}", rule('='));
    out
}

fn result_card(card: &ResultCard) -> String {
    let mut out = String::new();
    let status = if card.success {
        "✓".bright_green()
    } else {
        "✗".bright_red()
    };
    let trophy = if card.is_best { " 🏆" } else { "" };

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} {}{} ({}) {}",
        status,
        card.strategy_name.bold(),
        trophy,
        card.strategy_id.dimmed(),
        card.status_label()
    );
    let _ = writeln!(
        out,
        "   Time: {} | Tokens: {} | Cost: {}",
        card.time_label(),
        card.tokens_label(),
        card.cost_label().green()
    );

    match &card.outcome {
        CardOutcome::Extracted(data) => {
            let _ = writeln!(out, "   Extracted Data:");
            for line in data.lines() {
                let _ = writeln!(out, "     {}", line);
            }
        }
        CardOutcome::Failed(error) => {
            let _ = writeln!(out, "   {} {}", "Error:".red().bold(), error.red());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use extract_bench::{present, result_card as card_for};
    use extract_bench::testing::{empty_report, sample_prompt, sample_report, sample_strategies};

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_file_size() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(2048), "2.0 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024 + 512 * 1024), "3.5 MB");
    }

    #[test]
    fn test_strategy_list_shows_cost() {
        plain();
        let out = strategy_list(&sample_strategies());
        assert!(out.contains("strategy_01 Basic Extraction  [baseline]"));
        assert!(out.contains("Est. Cost $0.0005"));
    }

    #[test]
    fn test_empty_report_message() {
        plain();
        assert_eq!(results_view(&present(&empty_report())), "No results found\n");
    }

    #[test]
    fn test_report_layout() {
        plain();
        let out = results_view(&present(&sample_report()));

        assert!(out.contains("Document: invoice.pdf"));
        assert!(out.contains("🏆 Best: Basic Extraction"));
        assert!(out.contains("Avg Time: 0.85s"));

        // Fastest success first, failure last.
        let structured = out.find("Structured Output").unwrap();
        let basic = out.find("✓ Basic Extraction").unwrap();
        let failed = out.find("✗ Chain of Thought").unwrap();
        assert!(structured < basic && basic < failed);

        assert!(out.contains("Basic Extraction 🏆 (strategy_01) Success"));
        assert!(out.contains("Tokens: N/A | Cost: $0.0000"));
        assert!(out.contains("Error: rate limited"));
    }

    #[test]
    fn test_prompt_views() {
        plain();
        let detail = prompt_view(&PromptView::Detail(sample_prompt("strategy_05")));
        assert!(detail.contains("Strategy strategy_05 (strategy_05)"));
        assert!(detail.contains("{document}"));

        let failed = prompt_view(&PromptView::Unavailable("Failed to load strategy prompt".into()));
        assert_eq!(failed, "Failed to load strategy prompt\n");
    }

    #[test]
    fn test_field_table() {
        plain();
        let mut fields = FieldSchemaModel::new();
        assert!(field_table(&fields).starts_with("No fields defined"));

        fields.add_named_field("vendor", Some("Acme".into()));
        fields.add_field();
        let out = field_table(&fields);
        assert!(out.contains("• vendor = Acme"));
        assert!(out.contains("(unnamed, skipped)"));
    }

    #[test]
    fn test_single_result() {
        plain();
        let report = sample_report();
        let out = single_result(&card_for(&report.results[1]));
        assert!(out.contains("✗ Chain of Thought (strategy_03) Failed"));
        assert!(out.contains("Error: rate limited"));
    }
}
