//! Ordered classification rule table
//!
//! Evaluation order is significant: the first matching rule names the
//! primary archetype.

use crate::models::{Archetype, Resource};

/// CPU average above which a resource counts as compute bound
pub const COMPUTE_CPU_THRESHOLD: f64 = 70.0;

/// Attached storage above which a resource counts as storage bound
pub const STORAGE_GB_THRESHOLD: u64 = 1000;

/// Function timeout above which a resource counts as batch work
pub const BATCH_TIMEOUT_SECS: u64 = 300;

const DATABASE_ENGINES: &[&str] = &["mysql", "postgres", "oracle", "sqlserver", "aurora"];

/// Tag key substrings that mark a regulatory framework
pub const COMPLIANCE_KEYWORDS: &[&str] = &["compliance", "pci", "hipaa", "gdpr"];

/// A named predicate mapping a resource to one archetype
pub struct ClassificationRule {
    pub archetype: Archetype,
    pub matches: fn(&Resource) -> bool,
}

/// Workload rules followed by the lifecycle marker rules
pub const RULES: &[ClassificationRule] = &[
    ClassificationRule {
        archetype: Archetype::ComputeIntensive,
        matches: is_compute_intensive,
    },
    ClassificationRule {
        archetype: Archetype::StorageIntensive,
        matches: is_storage_intensive,
    },
    ClassificationRule {
        archetype: Archetype::MemoryIntensive,
        matches: is_memory_intensive,
    },
    ClassificationRule {
        archetype: Archetype::Batch,
        matches: is_batch,
    },
    ClassificationRule {
        archetype: Archetype::RealTime,
        matches: is_real_time,
    },
    ClassificationRule {
        archetype: Archetype::Database,
        matches: is_database,
    },
    ClassificationRule {
        archetype: Archetype::Stateless,
        matches: is_stateless,
    },
    ClassificationRule {
        archetype: Archetype::HighAvailability,
        matches: is_high_availability,
    },
    ClassificationRule {
        archetype: Archetype::Obsolete,
        matches: is_obsolete,
    },
    ClassificationRule {
        archetype: Archetype::Email,
        matches: is_email,
    },
    ClassificationRule {
        archetype: Archetype::Crm,
        matches: is_crm,
    },
    ClassificationRule {
        archetype: Archetype::Collaboration,
        matches: is_collaboration,
    },
];

fn is_compute_intensive(resource: &Resource) -> bool {
    // Observed utilisation wins over the instance family when present
    if let Some(avg) = resource.metric_average("cpu") {
        return avg > COMPUTE_CPU_THRESHOLD;
    }

    let ty = resource.resource_type.as_str();
    ty.starts_with("c5") || ty.starts_with("c6") || ty.contains("compute")
}

fn is_storage_intensive(resource: &Resource) -> bool {
    if !resource.block_devices.is_empty() {
        return resource.total_storage_gb() > STORAGE_GB_THRESHOLD;
    }

    let ty = resource.resource_type.as_str();
    ty.starts_with("d2") || ty.starts_with("i3") || ty.contains("storage")
}

fn is_memory_intensive(resource: &Resource) -> bool {
    let ty = resource.resource_type.as_str();
    ty.starts_with("r5") || ty.starts_with("r6") || ty.starts_with("x1") || ty.contains("memory")
}

fn is_batch(resource: &Resource) -> bool {
    resource.has_tag_mentioning("batch")
        || resource.resource_type.contains("batch")
        || resource
            .timeout_secs
            .map(|t| t > BATCH_TIMEOUT_SECS)
            .unwrap_or(false)
}

fn is_real_time(resource: &Resource) -> bool {
    resource.has_tag_mentioning("api") || !resource.load_balancers.is_empty()
}

fn is_database(resource: &Resource) -> bool {
    let engine_match = resource
        .engine
        .as_deref()
        .map(|e| DATABASE_ENGINES.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false);

    engine_match || resource.has_tag_mentioning("db") || resource.has_tag_mentioning("database")
}

fn is_high_availability(resource: &Resource) -> bool {
    resource.tags.iter().any(|t| {
        t.mentions("high-availability")
            || t.mentions("highavailability")
            || t.key.eq_ignore_ascii_case("ha")
            || t.value.eq_ignore_ascii_case("ha")
    })
}

fn is_stateless(resource: &Resource) -> bool {
    resource.has_tag_mentioning("stateless")
}

fn is_obsolete(resource: &Resource) -> bool {
    resource.has_tag_mentioning("obsolete") || resource.has_tag_mentioning("deprecated")
}

fn is_email(resource: &Resource) -> bool {
    resource.has_tag_mentioning("email")
}

fn is_crm(resource: &Resource) -> bool {
    resource.has_tag_mentioning("crm")
}

fn is_collaboration(resource: &Resource) -> bool {
    resource.has_tag_mentioning("collaboration")
}
