//! `cca recommend`

use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use std::path::Path;
use tabled::Tabled;

use crate::output::{
    color_level, color_savings, format_currency, format_provider, print_heading, print_json,
    print_rows, OutputFormat,
};

#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Type")]
    resource_type: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Recommended")]
    recommended: String,
    #[tabled(rename = "Savings")]
    savings: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "Complexity")]
    complexity: String,
}

pub async fn run(inventory: &Path, moves_only: bool, format: OutputFormat) -> Result<()> {
    let run = super::recommend_inventory(inventory).await?;
    let recommendations: Vec<_> = run
        .recommendations
        .iter()
        .filter(|r| !moves_only || r.recommends_move())
        .collect();

    if let OutputFormat::Json = format {
        return print_json(&json!({
            "recommendations": recommendations,
            "strategy": run.strategy,
        }));
    }

    let rows = recommendations
        .iter()
        .map(|r| RecommendationRow {
            resource: r.resource_id.clone(),
            resource_type: r.resource_type.clone(),
            current: r.current_provider.label().to_string(),
            recommended: if r.recommends_move() {
                format_provider(r.recommended_provider)
            } else {
                r.recommended_provider.label().to_string()
            },
            savings: color_savings(r.estimated_savings),
            confidence: r.confidence_score.to_string(),
            complexity: color_level(r.migration_complexity.level),
        })
        .collect::<Vec<_>>();
    print_rows(rows, "No recommendations");

    let summary = &run.strategy.summary;
    println!();
    print_heading("Strategy");
    println!("Resources analyzed:     {}", summary.total_resources);
    println!("Recommended moves:      {}", summary.recommended_moves);
    println!(
        "Estimated savings:      {}",
        format_currency(summary.estimated_total_savings).green()
    );
    let distribution = summary
        .distribution
        .iter()
        .map(|(p, n)| format!("{}={}", p.label(), n))
        .collect::<Vec<_>>()
        .join(" ");
    println!("Target distribution:    {}", distribution);

    for phase in run.strategy.phases.iter().filter(|p| !p.resources.is_empty()) {
        println!("\n{} ({} resources)", phase.name.bold(), phase.resources.len());
        println!("  {}", phase.description);
    }

    let risk = &run.strategy.risk_assessment;
    println!();
    println!(
        "Vendor lock-in risk:    {} - {}",
        color_level(risk.vendor_lock_in.level),
        risk.vendor_lock_in.description
    );
    println!(
        "Migration risk:         {} - {}",
        color_level(risk.migration.level),
        risk.migration.description
    );

    Ok(())
}
