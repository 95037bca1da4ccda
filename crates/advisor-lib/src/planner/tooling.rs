//! Migration tooling per provider route

use crate::models::{Provider, ResourceKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationTool {
    pub name: String,
    pub description: String,
    pub url: String,
    pub best_for: Vec<String>,
}

struct ToolEntry {
    name: &'static str,
    description: &'static str,
    url: &'static str,
    best_for: &'static [&'static str],
}

const AZURE_MIGRATE_FROM_AWS: ToolEntry = ToolEntry {
    name: "Azure Migrate",
    description: "Azure's service for migrating from AWS to Azure",
    url: "https://azure.microsoft.com/services/azure-migrate/",
    best_for: &["EC2 to Azure VM", "RDS to Azure SQL"],
};

const AZURE_DMS: ToolEntry = ToolEntry {
    name: "Azure Database Migration Service",
    description: "Specialized service for migrating databases to Azure",
    url: "https://azure.microsoft.com/services/database-migration/",
    best_for: &["RDS to Azure SQL", "DynamoDB to Cosmos DB"],
};

const GCP_MIGRATION_CENTER_FROM_AWS: ToolEntry = ToolEntry {
    name: "Google Cloud Migration Center",
    description: "GCP's central hub for migrations",
    url: "https://cloud.google.com/migration-center",
    best_for: &["EC2 to Compute Engine", "S3 to Cloud Storage"],
};

const GCP_DMS: ToolEntry = ToolEntry {
    name: "Google Database Migration Service",
    description: "Service for migrating databases to GCP",
    url: "https://cloud.google.com/database-migration",
    best_for: &["RDS to Cloud SQL", "Aurora to AlloyDB"],
};

const AWS_MIGRATION_HUB_FROM_AZURE: ToolEntry = ToolEntry {
    name: "AWS Migration Hub",
    description: "AWS's central hub for migrations",
    url: "https://aws.amazon.com/migration-hub/",
    best_for: &["Azure VM to EC2", "Azure SQL to RDS"],
};

const AWS_DMS: ToolEntry = ToolEntry {
    name: "AWS Database Migration Service",
    description: "Service for migrating databases to AWS",
    url: "https://aws.amazon.com/dms/",
    best_for: &["Azure SQL to RDS", "Cosmos DB to DynamoDB"],
};

const GCP_MIGRATION_CENTER_FROM_AZURE: ToolEntry = ToolEntry {
    name: "Google Cloud Migration Center",
    description: "GCP's central hub for migrations",
    url: "https://cloud.google.com/migration-center",
    best_for: &["Azure VM to Compute Engine", "Azure Storage to Cloud Storage"],
};

const AWS_MIGRATION_HUB_FROM_GCP: ToolEntry = ToolEntry {
    name: "AWS Migration Hub",
    description: "AWS's central hub for migrations",
    url: "https://aws.amazon.com/migration-hub/",
    best_for: &["Compute Engine to EC2", "Cloud Storage to S3"],
};

const AZURE_MIGRATE_FROM_GCP: ToolEntry = ToolEntry {
    name: "Azure Migrate",
    description: "Azure's service for migrating to Azure",
    url: "https://azure.microsoft.com/services/azure-migrate/",
    best_for: &["Compute Engine to Azure VM", "Cloud SQL to Azure SQL"],
};

fn route_tools(from: Provider, to: Provider) -> &'static [ToolEntry] {
    match (from, to) {
        (Provider::Aws, Provider::Azure) => &[AZURE_MIGRATE_FROM_AWS, AZURE_DMS],
        (Provider::Aws, Provider::Gcp) => &[GCP_MIGRATION_CENTER_FROM_AWS, GCP_DMS],
        (Provider::Azure, Provider::Aws) => &[AWS_MIGRATION_HUB_FROM_AZURE, AWS_DMS],
        (Provider::Azure, Provider::Gcp) => &[GCP_MIGRATION_CENTER_FROM_AZURE],
        (Provider::Gcp, Provider::Aws) => &[AWS_MIGRATION_HUB_FROM_GCP],
        (Provider::Gcp, Provider::Azure) => &[AZURE_MIGRATE_FROM_GCP],
        _ => &[],
    }
}

/// Tools for the route whose "best for" source matches the resource
///
/// A tool applies when the first word of any of its "best for" entries
/// appears in the resource type or the source provider's service name.
pub fn select_tooling(
    from: Provider,
    to: Provider,
    kind: ResourceKind,
    resource_type: &str,
) -> Vec<MigrationTool> {
    let haystack = format!(
        "{} {}",
        resource_type.to_lowercase(),
        kind.service_name(from).to_lowercase()
    );

    route_tools(from, to)
        .iter()
        .filter(|tool| {
            tool.best_for.iter().any(|entry| {
                entry
                    .split_whitespace()
                    .next()
                    .map(|word| haystack.contains(&word.to_lowercase()))
                    .unwrap_or(false)
            })
        })
        .map(|tool| MigrationTool {
            name: tool.name.to_string(),
            description: tool.description.to_string(),
            url: tool.url.to_string(),
            best_for: tool.best_for.iter().map(|s| s.to_string()).collect(),
        })
        .collect()
}
