//! `cca classify`

use advisor_lib::{classifier::classify_all, Provider};
use anyhow::Result;
use std::path::Path;
use tabled::Tabled;

use crate::output::{print_json, print_rows, OutputFormat};

#[derive(Tabled)]
struct ClassificationRow {
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Type")]
    resource_type: String,
    #[tabled(rename = "Primary")]
    primary: String,
    #[tabled(rename = "Archetypes")]
    archetypes: String,
    #[tabled(rename = "Compliance")]
    compliance: String,
}

pub async fn run(inventory: &Path, provider: Option<Provider>, format: OutputFormat) -> Result<()> {
    let mut classified = classify_all(&super::load_inventory(inventory).await?);
    if let Some(p) = provider {
        classified.retain(|k, _| *k == p);
    }

    if let OutputFormat::Json = format {
        return print_json(&classified);
    }

    let rows = classified
        .iter()
        .flat_map(|(provider, groups)| {
            groups.iter().flat_map(move |(group, items)| {
                items.iter().map(move |w| ClassificationRow {
                    provider: provider.label().to_string(),
                    group: group.clone(),
                    resource: w.resource_id.clone(),
                    resource_type: w.resource_type.clone(),
                    primary: w.primary_type.as_str().to_string(),
                    archetypes: w
                        .classifications
                        .iter()
                        .map(|a| a.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                    compliance: w
                        .compliance
                        .iter()
                        .map(|c| c.framework.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                })
            })
        })
        .collect::<Vec<_>>();

    let total = rows.len();
    print_rows(rows, "No resources found");
    if total > 0 {
        println!("\nTotal: {} resources", total);
    }
    Ok(())
}
