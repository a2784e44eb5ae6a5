//! Output formatting for CLI operations.

use console::style;
use serde_json::json;
use wordcrack::{Outcome, ResultReport, progress::format_duration};

/// Line and candidate counts of a wordlist
pub struct WordlistCounts {
    pub lines: u64,
    pub candidates: u64,
}

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats a session report
    fn format_report(&self, report: &ResultReport) -> String;

    /// Formats wordlist counts
    fn format_counts(&self, counts: &WordlistCounts) -> String;

    /// Formats tool availability, in priority order
    fn format_probe(&self, tools: &[(String, bool)]) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_report(&self, report: &ResultReport) -> String {
        let mut output = String::new();

        match report.outcome() {
            Outcome::Succeeded => {
                output.push_str(&format!(
                    "{} {}\n",
                    style("Password found:").green().bold(),
                    report.password().unwrap_or_default()
                ));
                if let Some(bytes) = report
                    .password_bytes()
                    .filter(|bytes| std::str::from_utf8(bytes).is_err())
                {
                    output.push_str(&format!("  Raw bytes:      {}\n", to_hex(bytes)));
                }
                if let Some(tool) = report.matched_by() {
                    output.push_str(&format!("  Verified by:    {}\n", tool));
                }
            }
            Outcome::Exhausted => {
                output.push_str(&format!(
                    "{}\n",
                    style("Password not found in wordlist").yellow()
                ));
            }
            Outcome::Cancelled => {
                output.push_str(&format!("{}\n", style("Cancelled").yellow()));
            }
            Outcome::Failed => {
                output.push_str(&format!(
                    "{} {}\n",
                    style("Error:").red().bold(),
                    report.error().unwrap_or("unknown error")
                ));
            }
        }

        output.push_str(&format!(
            "  Tested:         {}/{} words\n",
            report.tested_words(),
            report.total_words()
        ));
        output.push_str(&format!(
            "  Time:           {} ({} ms)\n",
            format_duration(report.execution_time()),
            report.execution_time_millis()
        ));
        if report.strategy_errors() > 0 {
            output.push_str(&format!(
                "  Tool errors:    {} (run with -v for details)\n",
                report.strategy_errors()
            ));
        }

        output
    }

    fn format_counts(&self, counts: &WordlistCounts) -> String {
        format!(
            "Lines:      {}\nCandidates: {}\nBlank:      {}\n",
            counts.lines,
            counts.candidates,
            counts.lines.saturating_sub(counts.candidates)
        )
    }

    fn format_probe(&self, tools: &[(String, bool)]) -> String {
        let mut output = String::new();
        for (name, available) in tools {
            let status = if *available {
                style("available").green()
            } else {
                style("not found").red()
            };
            output.push_str(&format!("  {:<8} {}\n", name, status));
        }
        output
    }
}

/// Lowercase hex rendering of password bytes.
fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &ResultReport) -> String {
        let obj = json!({
            "success": report.success(),
            "outcome": report.outcome().as_str(),
            "password": report.password(),
            "password_hex": report.password_bytes().map(to_hex),
            "execution_time_ms": report.execution_time_millis(),
            "tested_words": report.tested_words(),
            "total_words": report.total_words(),
            "matched_by": report.matched_by(),
            "strategy_errors": report.strategy_errors(),
            "error": report.error(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string()) + "\n"
    }

    fn format_counts(&self, counts: &WordlistCounts) -> String {
        let obj = json!({
            "lines": counts.lines,
            "candidates": counts.candidates,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string()) + "\n"
    }

    fn format_probe(&self, tools: &[(String, bool)]) -> String {
        let items: Vec<_> = tools
            .iter()
            .map(|(name, available)| json!({"tool": name, "available": available}))
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string()) + "\n"
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}
