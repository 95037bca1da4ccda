//! `cca opportunities`

use advisor_lib::{
    monitor::{find_optimization_opportunities, summarize, UtilizationMetrics, UtilizationSnapshot},
    Provider,
};
use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use tabled::Tabled;

use crate::output::{
    color_severity, format_currency, print_heading, print_json, print_rows, OutputFormat,
};

#[derive(Tabled)]
struct OpportunityRow {
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Monthly Savings")]
    savings: String,
    #[tabled(rename = "Priority")]
    priority: String,
}

/// Read a provider-keyed utilization export
fn load_snapshot(path: &Path) -> Result<UtilizationSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let providers: BTreeMap<Provider, UtilizationMetrics> =
        serde_json::from_str(&raw).context("Failed to parse utilization export")?;

    Ok(UtilizationSnapshot {
        collected_at: Utc::now(),
        providers,
    })
}

pub async fn run(utilization: &Path, format: OutputFormat) -> Result<()> {
    let snapshot = load_snapshot(utilization)?;
    let opportunities = find_optimization_opportunities(&snapshot);
    let summary = summarize(&opportunities);

    if let OutputFormat::Json = format {
        return print_json(&json!({
            "opportunities": opportunities,
            "summary": summary,
        }));
    }

    let rows = opportunities
        .iter()
        .map(|o| OpportunityRow {
            provider: o.provider.label().to_string(),
            service: o.service.clone(),
            resource: o.resource_id.clone(),
            action: o.action.to_string(),
            savings: format_currency(o.potential_savings),
            priority: color_severity(o.priority),
        })
        .collect::<Vec<_>>();
    print_rows(rows, "No optimization opportunities found");

    if summary.total_opportunities > 0 {
        println!();
        print_heading("Summary");
        println!("Opportunities:          {}", summary.total_opportunities);
        println!(
            "Potential savings:      {}",
            format_currency(summary.total_potential_savings).green()
        );
        for (action, bucket) in &summary.by_action {
            println!(
                "  {:<10} {:>3}  {}",
                action.to_string(),
                bucket.count,
                format_currency(bucket.potential_savings)
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_lib::monitor::OpportunityAction;

    #[test]
    fn test_load_snapshot_keyed_by_provider() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("utilization.json");
        std::fs::write(
            &path,
            r#"{"gcp": {"instances": [{"instance_id": "vm-1", "instance_type": "e2-micro", "cpu_utilization": 2.0}]}}"#,
        )
        .unwrap();

        let snapshot = load_snapshot(&path).unwrap();
        let opps = find_optimization_opportunities(&snapshot);
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].provider, Provider::Gcp);
        assert_eq!(opps[0].action, OpportunityAction::Terminate);
        assert_eq!(opps[0].service, "Compute Engine");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_snapshot(&dir.path().join("nope.json")).is_err());
    }
}
