//! Cross-provider equivalence for instance types and regions

use crate::models::Provider;
use serde::{Deserialize, Serialize};

/// Nearest matching resource type at each provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalentTypes {
    pub aws: String,
    pub azure: String,
    pub gcp: String,
}

impl EquivalentTypes {
    pub fn get(&self, provider: Provider) -> &str {
        match provider {
            Provider::Aws => &self.aws,
            Provider::Azure => &self.azure,
            Provider::Gcp => &self.gcp,
        }
    }
}

/// (source provider, source type) -> (aws, azure, gcp)
///
/// The source provider's own column is ignored; the source type is kept.
const TYPE_EQUIVALENTS: &[(Provider, &str, [&str; 3])] = &[
    (Provider::Aws, "t2.micro", ["", "Standard_B1s", "e2-micro"]),
    (Provider::Aws, "t2.small", ["", "Standard_B1ms", "e2-small"]),
    (Provider::Aws, "t2.medium", ["", "Standard_B2s", "e2-medium"]),
    (Provider::Aws, "m5.large", ["", "Standard_D2s_v3", "n2-standard-2"]),
    (Provider::Aws, "m5.xlarge", ["", "Standard_D4s_v3", "n2-standard-4"]),
    (Provider::Aws, "c5.large", ["", "Standard_F2s_v2", "c2-standard-4"]),
    (Provider::Aws, "r5.large", ["", "Standard_E2s_v3", "m2-ultramem-2"]),
    (Provider::Azure, "Standard_B1s", ["t2.micro", "", "e2-micro"]),
    (Provider::Azure, "Standard_D2s_v3", ["m5.large", "", "n2-standard-2"]),
    (Provider::Gcp, "e2-micro", ["t2.micro", "Standard_B1s", ""]),
    (Provider::Gcp, "n2-standard-2", ["m5.large", "Standard_D2s_v3", ""]),
];

/// General-purpose family used when a type has no mapping
pub fn default_instance_type(provider: Provider) -> &'static str {
    match provider {
        Provider::Aws => "t2.medium",
        Provider::Azure => "Standard_D2s_v3",
        Provider::Gcp => "n2-standard-2",
    }
}

/// Map a resource type to its nearest equivalents at every provider
///
/// Unmapped types fall back to each provider's default family rather than
/// failing; equivalence is approximate by nature.
pub fn equivalent_instance_types(resource_type: &str, source: Provider) -> EquivalentTypes {
    let mapped = TYPE_EQUIVALENTS
        .iter()
        .find(|(provider, ty, _)| *provider == source && *ty == resource_type)
        .map(|(_, _, targets)| targets);

    let pick = |provider: Provider, column: usize| -> String {
        if provider == source {
            return resource_type.to_string();
        }
        match mapped {
            Some(targets) => targets[column].to_string(),
            None => default_instance_type(provider).to_string(),
        }
    };

    EquivalentTypes {
        aws: pick(Provider::Aws, 0),
        azure: pick(Provider::Azure, 1),
        gcp: pick(Provider::Gcp, 2),
    }
}

/// Regions considered co-located across providers: [aws, azure, gcp]
const REGION_EQUIVALENTS: &[[&str; 3]] = &[
    ["us-east-1", "eastus", "us-east1"],
    ["us-east-2", "centralus", "us-central1"],
    ["us-west-2", "westus2", "us-west1"],
    ["eu-west-1", "westeurope", "europe-west1"],
    ["eu-central-1", "germanywestcentral", "europe-west3"],
    ["ap-southeast-1", "southeastasia", "asia-southeast1"],
];

pub fn default_region(provider: Provider) -> &'static str {
    match provider {
        Provider::Aws => "us-east-1",
        Provider::Azure => "eastus",
        Provider::Gcp => "us-central1",
    }
}

fn column(provider: Provider) -> usize {
    match provider {
        Provider::Aws => 0,
        Provider::Azure => 1,
        Provider::Gcp => 2,
    }
}

/// Translate a region of `source` into the closest region of `target`
pub fn equivalent_region(region: &str, source: Provider, target: Provider) -> String {
    if source == target {
        return region.to_string();
    }

    REGION_EQUIVALENTS
        .iter()
        .find(|row| row[column(source)] == region)
        .map(|row| row[column(target)].to_string())
        .unwrap_or_else(|| default_region(target).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_aws_type() {
        let eq = equivalent_instance_types("m5.large", Provider::Aws);
        assert_eq!(eq.aws, "m5.large");
        assert_eq!(eq.azure, "Standard_D2s_v3");
        assert_eq!(eq.gcp, "n2-standard-2");
    }

    #[test]
    fn test_unmapped_type_uses_defaults() {
        let eq = equivalent_instance_types("Standard_M128s", Provider::Azure);
        assert_eq!(eq.aws, "t2.medium");
        assert_eq!(eq.azure, "Standard_M128s");
        assert_eq!(eq.gcp, "n2-standard-2");
    }

    #[test]
    fn test_source_provider_keeps_own_type() {
        let eq = equivalent_instance_types("e2-micro", Provider::Gcp);
        assert_eq!(eq.get(Provider::Gcp), "e2-micro");
        assert_eq!(eq.get(Provider::Aws), "t2.micro");
        assert_eq!(eq.get(Provider::Azure), "Standard_B1s");
    }

    #[test]
    fn test_region_equivalence() {
        assert_eq!(equivalent_region("eu-west-1", Provider::Aws, Provider::Gcp), "europe-west1");
        assert_eq!(equivalent_region("westus2", Provider::Azure, Provider::Aws), "us-west-2");
        assert_eq!(equivalent_region("mars-1", Provider::Aws, Provider::Azure), "eastus");
        assert_eq!(equivalent_region("mars-1", Provider::Aws, Provider::Aws), "mars-1");
    }
}
