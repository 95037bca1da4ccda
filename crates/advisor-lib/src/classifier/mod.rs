//! Rule-based workload classification
//!
//! Tags a resource snapshot with the archetypes it matches and extracts
//! compliance markers from its tags. Classification is a pure function of
//! the resource; there is no cross-resource state.

mod rules;

pub use rules::{ClassificationRule, COMPLIANCE_KEYWORDS, RULES};

use crate::models::{
    Archetype, ClassifiedInventory, ComplianceRequirement, Resource, ResourceInventory,
    WorkloadClassification,
};

/// Classify a single resource
///
/// A resource without an identifier is never inspected by the rules and is
/// returned as `general`.
pub fn classify(resource: &Resource) -> WorkloadClassification {
    let mut classifications: Vec<Archetype> = if resource.has_identifier() {
        RULES
            .iter()
            .filter(|rule| (rule.matches)(resource))
            .map(|rule| rule.archetype)
            .collect()
    } else {
        Vec::new()
    };

    // First match wins; no weighting between archetypes
    let primary_type = match classifications.first() {
        Some(first) => *first,
        None => {
            classifications.push(Archetype::General);
            Archetype::General
        }
    };

    WorkloadClassification {
        resource_id: resource.id.clone(),
        resource_type: resource.resource_type.clone(),
        kind: resource.kind,
        provider: resource.provider,
        classifications,
        primary_type,
        compliance: extract_compliance(resource),
    }
}

/// Classify every resource, preserving the provider and group layout
pub fn classify_all(inventory: &ResourceInventory) -> ClassifiedInventory {
    inventory
        .iter()
        .map(|(provider, groups)| {
            let classified = groups
                .iter()
                .map(|(group, resources)| {
                    (group.clone(), resources.iter().map(classify).collect())
                })
                .collect();
            (*provider, classified)
        })
        .collect()
}

fn extract_compliance(resource: &Resource) -> Vec<ComplianceRequirement> {
    resource
        .tags
        .iter()
        .filter(|tag| {
            let key = tag.key.to_lowercase();
            COMPLIANCE_KEYWORDS.iter().any(|kw| key.contains(kw))
        })
        .map(|tag| ComplianceRequirement {
            framework: tag.key.clone(),
            requirement: tag.value.clone(),
        })
        .collect()
}
