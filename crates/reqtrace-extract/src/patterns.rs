use regex::Regex;
use std::sync::LazyLock;

use reqtrace_core::types::RequirementType;

const FUNCTIONAL: &[&str] = &[
    r"(?i)(?:FR|functional requirement|requirement)[_\-\s]*(\d+\.?\d*)",
    r"(?i)(?:REQ|requirement)[_\-\s]*(\d+\.?\d*)",
    r"(?i)the system shall[_\-\s]*(\d+\.?\d*)?",
    r"(?i)the system must[_\-\s]*(\d+\.?\d*)?",
    r"(?i)function[_\-\s]*(\d+\.?\d*)",
];

const NON_FUNCTIONAL: &[&str] = &[
    r"(?i)(?:NFR|non.?functional)[_\-\s]*(\d+\.?\d*)",
    r"(?i)(?:performance|security|usability)[_\-\s]*(\d+\.?\d*)",
    r"(?i)(?:quality|reliability)[_\-\s]*(\d+\.?\d*)",
];

const USER_STORY: &[&str] = &[
    r"(?i)(?:US|user story)[_\-\s]*(\d+\.?\d*)",
    r"(?i)as a .* I want .* so that",
    r"(?i)story[_\-\s]*(\d+\.?\d*)",
];

/// Ordered pattern families, one per entry of [`RequirementType::PATTERN_ORDER`].
pub static PATTERN_FAMILIES: LazyLock<Vec<(RequirementType, Vec<Regex>)>> = LazyLock::new(|| {
    RequirementType::PATTERN_ORDER
        .iter()
        .map(|req_type| {
            let sources = match req_type {
                RequirementType::Functional => FUNCTIONAL,
                RequirementType::NonFunctional => NON_FUNCTIONAL,
                RequirementType::UserStory => USER_STORY,
                RequirementType::General => &[],
            };
            let compiled = sources.iter().map(|p| Regex::new(p).expect("requirement pattern compiles")).collect();
            (*req_type, compiled)
        })
        .collect()
});

/// One marker occurrence inside a chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    pub req_type: RequirementType,
    pub number: Option<String>,
    pub start: usize,
    pub end: usize,
}

/// Every marker match in `chunk`, family by family, pattern by pattern.
pub fn find_matches(chunk: &str) -> Vec<PatternMatch> {
    let mut found = Vec::new();
    for (req_type, patterns) in PATTERN_FAMILIES.iter() {
        for pattern in patterns {
            for caps in pattern.captures_iter(chunk) {
                let Some(whole) = caps.get(0) else { continue };
                let number = caps
                    .get(1)
                    .map(|m| m.as_str().trim_end_matches('.').to_string())
                    .filter(|n| !n.is_empty());
                found.push(PatternMatch { req_type: *req_type, number, start: whole.start(), end: whole.end() });
            }
        }
    }
    found
}
