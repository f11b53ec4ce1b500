use console::style;

use crate::ai::GatewayStats;

/// Status lines go to stderr, results to stdout
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        eprintln!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        eprintln!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Task result on stdout, unstyled so it can be piped
    pub fn result(&self, text: &str) {
        println!("{}", text);
    }

    pub fn bullets(&self, items: &[String]) {
        for item in items {
            println!("  {} {}", style("•").cyan(), item);
        }
    }

    pub fn key_value(&self, key: &str, value: &str) {
        println!("  {:<14} {}", style(key).dim(), value);
    }

    pub fn gateway_stats(&self, stats: &GatewayStats) {
        for attempt in &stats.attempts {
            if attempt.succeeded() {
                eprintln!(
                    "  {} {} ({} ms)",
                    style("✓").green(),
                    attempt.provider,
                    attempt.duration_ms
                );
            } else if let crate::ai::AttemptOutcome::Failed(err) = &attempt.outcome {
                eprintln!(
                    "  {} {} ({} ms): {}",
                    style("✗").red(),
                    attempt.provider,
                    attempt.duration_ms,
                    err
                );
            }
        }
        if stats.skipped_unconfigured > 0 {
            eprintln!(
                "  {} {} provider(s) skipped (no credential)",
                style("-").dim(),
                stats.skipped_unconfigured
            );
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
