//! `cca plan`

use advisor_lib::planner::generate_migration_plan;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::output::{
    color_level, format_currency, format_provider, print_heading, print_info, print_json,
    OutputFormat,
};

pub async fn run(inventory: &Path, resource_id: &str, format: OutputFormat) -> Result<()> {
    let run = super::recommend_inventory(inventory).await?;
    let rec = run
        .recommendations
        .iter()
        .find(|r| r.resource_id == resource_id)
        .with_context(|| format!("No recommendation for resource '{}'", resource_id))?;

    let plan = generate_migration_plan(rec);
    if let OutputFormat::Json = format {
        return print_json(&plan);
    }

    if !rec.recommends_move() {
        print_info("Resource already sits on its best provider; the plan covers staying put");
    }

    print_heading(&format!("Migration plan for {}", plan.resource_id));
    println!(
        "Route:                  {} -> {}",
        format_provider(plan.current_provider),
        format_provider(plan.target_provider)
    );
    println!("Estimated savings:      {}", format_currency(plan.estimated_savings));
    println!("Complexity:             {}", color_level(plan.complexity_level));
    println!(
        "Strategy:               {} ({})",
        plan.recommended_strategy.name.bold(),
        plan.recommended_strategy.description
    );
    println!(
        "Alternatives:           {}",
        plan.alternative_strategies
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Timeframe:              {}", plan.estimated_timeframe);
    println!("Downtime:               {}", plan.downtime.estimated);

    if !plan.migration_tooling.is_empty() {
        println!("\n{}", "Tooling".bold());
        for tool in &plan.migration_tooling {
            println!("  {} - {} ({})", tool.name, tool.description, tool.url);
        }
    }

    for phase in &plan.steps {
        println!("\n{}", phase.phase.bold());
        for (i, step) in phase.steps.iter().enumerate() {
            println!("  {}. {}: {}", i + 1, step.name, step.description);
        }
    }

    println!("\n{}", "Risks".bold());
    for (risk, mitigation) in plan.risks.iter().zip(&plan.mitigations) {
        println!(
            "  [{}] {}: {}",
            color_level(risk.severity),
            risk.risk_type,
            risk.description
        );
        println!("      -> {}", mitigation.action);
    }

    if !plan.downtime.minimization_strategies.is_empty() {
        println!("\n{}", "Downtime minimization".bold());
        for s in &plan.downtime.minimization_strategies {
            println!("  - {}", s);
        }
    }

    Ok(())
}
