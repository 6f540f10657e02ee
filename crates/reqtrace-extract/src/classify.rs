use reqtrace_core::types::{Category, Priority};

const PRIORITY_BUCKETS: &[(Priority, &[&str])] = &[
    (Priority::High, &["critical", "essential", "must", "required", "mandatory", "shall"]),
    (Priority::Medium, &["should", "important", "recommended"]),
    (Priority::Low, &["may", "could", "optional", "nice to have"]),
];

const CATEGORY_BUCKETS: &[(Category, &[&str])] = &[
    (Category::Authentication, &["login", "password", "authentication", "credential", "user access"]),
    (Category::Validation, &["validate", "validation", "verify", "check", "ensure"]),
    (Category::Interface, &["display", "show", "interface", "ui", "user interface", "screen"]),
    (Category::Data, &["data", "database", "store", "save", "retrieve", "record"]),
    (Category::Security, &["security", "secure", "permission", "authorization", "access control"]),
    (Category::Performance, &["performance", "speed", "response time", "load", "scalability"]),
    (Category::Integration, &["integration", "api", "external", "third party"]),
];

/// First bucket with a keyword occurring in `content`; `medium` otherwise.
pub fn determine_priority(content: &str) -> Priority {
    let lower = content.to_lowercase();
    PRIORITY_BUCKETS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(priority, _)| *priority)
        .unwrap_or(Priority::Medium)
}

pub fn categorize(content: &str) -> Category {
    let lower = content.to_lowercase();
    CATEGORY_BUCKETS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::General)
}
