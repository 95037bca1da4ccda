//! Output formatting utilities

use advisor_lib::{monitor::Severity, Level, Provider};
use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    Json,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Rounded table, or a warning when there are no rows
pub fn print_rows<T: Tabled>(rows: Vec<T>, empty_message: &str) {
    if rows.is_empty() {
        print_warning(empty_message);
        return;
    }
    println!("{}", Table::new(rows).with(Style::rounded()));
}

pub fn print_heading(title: &str) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(50));
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

pub fn format_currency(amount: f64) -> String {
    format!("${:.2}", amount)
}

pub fn format_provider(provider: Provider) -> String {
    provider.label().cyan().to_string()
}

/// Green for low, red for high
pub fn color_level(level: Level) -> String {
    match level {
        Level::Low => level.as_str().green().to_string(),
        Level::Medium => level.as_str().yellow().to_string(),
        Level::High => level.as_str().red().to_string(),
    }
}

pub fn color_severity(severity: Severity) -> String {
    let label = severity.to_string();
    match severity {
        Severity::High => label.red().bold().to_string(),
        Severity::Medium => label.yellow().to_string(),
        Severity::Low => label.normal().to_string(),
    }
}

pub fn color_savings(amount: f64) -> String {
    let formatted = format_currency(amount);
    if amount > 0.0 {
        formatted.green().to_string()
    } else {
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(12.345), "$12.35");
        assert_eq!(format_currency(0.0), "$0.00");
    }

    #[test]
    fn test_color_savings_keeps_digits() {
        assert!(color_savings(10.0).contains("$10.00"));
        assert_eq!(color_savings(0.0), "$0.00");
    }
}
