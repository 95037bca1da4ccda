//! `cca estimate`

use advisor_lib::pricing::CostPeriod;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use tabled::Tabled;

use crate::output::{
    format_currency, print_heading, print_json, print_rows, print_warning, OutputFormat,
};

#[derive(Tabled)]
struct CostRow {
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Equivalent Type")]
    resource_type: String,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Cost")]
    cost: String,
    #[tabled(rename = "vs Current")]
    difference: String,
}

pub async fn run(
    inventory: &Path,
    resource_id: &str,
    period: CostPeriod,
    format: OutputFormat,
) -> Result<()> {
    let inventory = super::load_inventory(inventory).await?;
    let resource = super::find_resource(&inventory, resource_id)?;
    let estimate = super::pricing().await.estimate_cost(resource, period).await;

    if let OutputFormat::Json = format {
        return print_json(&estimate);
    }

    print_heading(&format!("{} cost of {}", period, resource_id));
    let current = estimate.current_cost();
    if current == 0.0 {
        print_warning(&format!(
            "No {} price for {}; comparisons are unreliable",
            estimate.current_provider, resource.resource_type
        ));
    }

    let rows = estimate
        .costs
        .iter()
        .map(|(provider, cost)| {
            let label = if *provider == estimate.current_provider {
                format!("{} (current)", provider.label()).bold().to_string()
            } else {
                provider.label().to_string()
            };
            let diff = cost.cost - current;
            CostRow {
                provider: label,
                resource_type: cost.resource_type.clone(),
                region: cost.region.clone(),
                cost: format_currency(cost.cost),
                difference: if diff < 0.0 {
                    format_currency(diff).green().to_string()
                } else if diff > 0.0 {
                    format!("+{}", format_currency(diff)).red().to_string()
                } else {
                    "-".to_string()
                },
            }
        })
        .collect::<Vec<_>>();

    print_rows(rows, "No prices available");
    Ok(())
}
