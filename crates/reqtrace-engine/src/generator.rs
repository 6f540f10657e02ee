//! Query-driven test-case generation.
//!
//! Every retrieved chunk becomes one test case. Steps come from keyword
//! templates keyed on the query; unknown topics get generic steps shaped by
//! the chunk text.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

use reqtrace_core::types::TestCase;
use reqtrace_core::util::excerpt;

const TITLE_QUERY_CHARS: usize = 50;
const CHUNK_SOURCE_CHARS: usize = 200;
const EXPECTED: &str = "System should behave as specified in the requirements";

static REQUIREMENT_ID: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"(?i)REQ[_-]?\d+", r"(?i)R\d+", r"(?i)FR[_-]?\d+", r"(?i)NFR[_-]?\d+"]
        .iter()
        .map(|p| Regex::new(p).expect("requirement id pattern compiles"))
        .collect()
});

struct StepTemplate {
    keywords: &'static [&'static str],
    steps: &'static [&'static str],
}

const TEMPLATES: &[StepTemplate] = &[
    StepTemplate {
        keywords: &["registration", "register", "signup", "sign up", "create account"],
        steps: &[
            "Navigate to user registration page",
            "Enter valid user information (name, email, password)",
            "Click Register button",
            "Check for registration success message",
            "Check email inbox for verification email",
            "Click verification link in email",
            "Verify account activation",
        ],
    },
    StepTemplate {
        keywords: &["login", "sign in", "authentication", "signin"],
        steps: &[
            "Navigate to login page",
            "Enter valid username/email",
            "Enter correct password",
            "Click login button",
            "Verify redirect to dashboard or homepage",
            "Check for user session establishment",
        ],
    },
    StepTemplate {
        keywords: &["password reset", "forgot password", "reset password"],
        steps: &[
            "Navigate to login page",
            "Click 'Forgot Password' link",
            "Enter registered email address",
            "Submit password reset request",
            "Check email for reset link",
            "Click reset link within 24 hours",
            "Enter new password",
            "Confirm password change",
            "Login with new password",
        ],
    },
    StepTemplate {
        keywords: &["cart", "shopping cart", "add to cart"],
        steps: &[
            "Browse product catalog",
            "Select desired product",
            "Choose quantity and options",
            "Click 'Add to Cart' button",
            "Verify item appears in cart",
            "Check quantity and price accuracy",
            "Test cart persistence across sessions",
        ],
    },
    StepTemplate {
        keywords: &["checkout", "payment", "purchase", "buy"],
        steps: &[
            "Add products to shopping cart",
            "Proceed to checkout",
            "Enter shipping information",
            "Select shipping method",
            "Choose payment method",
            "Enter payment details",
            "Review order summary",
            "Complete purchase",
            "Verify order confirmation",
        ],
    },
    StepTemplate {
        keywords: &["search", "find", "filter"],
        steps: &[
            "Navigate to search interface",
            "Enter search keywords",
            "Apply relevant filters",
            "Execute search",
            "Review search results",
            "Verify result relevance",
            "Test result sorting options",
        ],
    },
    StepTemplate {
        keywords: &["product", "inventory", "catalog"],
        steps: &[
            "Login as merchant/admin",
            "Navigate to product management",
            "Click 'Add New Product'",
            "Fill in product details",
            "Upload product images",
            "Set pricing and inventory",
            "Publish product",
            "Verify product appears in catalog",
        ],
    },
    StepTemplate {
        keywords: &["order", "tracking", "fulfillment"],
        steps: &[
            "Access order management system",
            "Locate specific order",
            "Update order status",
            "Add tracking information",
            "Send customer notification",
            "Verify status update",
            "Check customer notification delivery",
        ],
    },
    StepTemplate {
        keywords: &["validate", "validation", "verify", "test"],
        steps: &[
            "Prepare test data and environment",
            "Execute validation process",
            "Input valid test data",
            "Verify successful validation",
            "Input invalid test data",
            "Verify error handling",
            "Check error messages for clarity",
        ],
    },
    StepTemplate {
        keywords: &["security", "access", "permission", "role"],
        steps: &[
            "Login with test user account",
            "Attempt to access restricted feature",
            "Verify access control enforcement",
            "Test with different user roles",
            "Verify appropriate permissions",
            "Check error messages for unauthorized access",
        ],
    },
    StepTemplate {
        keywords: &["performance", "load", "speed", "response time"],
        steps: &[
            "Set up performance monitoring",
            "Execute performance test scenario",
            "Measure response times",
            "Monitor system resources",
            "Verify performance meets requirements",
            "Document performance metrics",
        ],
    },
    StepTemplate {
        keywords: &["mobile", "responsive", "device"],
        steps: &[
            "Access application on mobile device",
            "Test touch interface functionality",
            "Verify responsive design",
            "Test navigation on small screen",
            "Verify mobile-specific features",
            "Check performance on mobile network",
        ],
    },
];

fn mentions(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Numbered test steps for `query`, falling back to chunk-driven generic
/// steps when no template topic appears in the query.
pub fn test_steps(chunk: &str, query: &str) -> Vec<String> {
    let query_lower = query.to_lowercase();
    let actions: Vec<&str> = match TEMPLATES.iter().find(|t| mentions(&query_lower, t.keywords)) {
        Some(template) => template.steps.to_vec(),
        None => generic_actions(&chunk.to_lowercase()),
    };
    actions.iter().enumerate().map(|(i, action)| format!("{}. {}", i + 1, action)).collect()
}

fn generic_actions(chunk: &str) -> Vec<&'static str> {
    let mut actions = if mentions(chunk, &["user", "customer", "account"]) {
        vec!["Login as test user", "Navigate to relevant feature"]
    } else if mentions(chunk, &["admin", "management", "configure"]) {
        vec!["Login as administrator", "Access management interface"]
    } else {
        vec!["Navigate to feature under test"]
    };
    if mentions(chunk, &["input", "enter", "data"]) {
        actions.push("Enter required test data");
    }
    if mentions(chunk, &["click", "submit", "save"]) {
        actions.push("Execute primary action");
    }
    if mentions(chunk, &["verify", "check", "validate"]) {
        actions.push("Verify expected results");
    } else {
        actions.push("Confirm successful operation");
    }
    actions
}

/// First requirement-looking identifier (`REQ-4`, `FR12`, ...) in `chunk`.
pub fn extract_requirement_id(chunk: &str) -> Option<String> {
    REQUIREMENT_ID.iter().find_map(|re| re.find(chunk)).map(|m| m.as_str().to_string())
}

/// One test case per retrieved chunk. `first_sequence` numbers the ids so
/// repeated queries within the same second stay distinct.
pub fn generate_test_cases(query: &str, chunks: &[String], first_sequence: usize, now: DateTime<Utc>) -> Vec<TestCase> {
    let stamp = now.format("%Y%m%d_%H%M%S");
    let title_query: String = query.chars().take(TITLE_QUERY_CHARS).collect();
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let mut tc = TestCase::new(format!("TC_{}_{}", stamp, first_sequence + i), format!("Test Case for: {title_query}..."));
            tc.description = format!("Generated test case based on query: {query}");
            tc.steps = test_steps(chunk, query);
            tc.expected = EXPECTED.to_string();
            tc.requirement_id = extract_requirement_id(chunk);
            tc.query = Some(query.to_string());
            tc.chunk_source = Some(excerpt(chunk, CHUNK_SOURCE_CHARS));
            tc
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn login_query_uses_login_template() {
        let steps = test_steps("anything", "User LOGIN flow");
        assert_eq!(steps[0], "1. Navigate to login page");
        assert_eq!(steps.len(), 6);
    }

    #[test]
    fn earlier_templates_win() {
        // "register" is checked before "search"
        let steps = test_steps("", "register then search");
        assert_eq!(steps[0], "1. Navigate to user registration page");
    }

    #[test]
    fn unknown_topic_builds_generic_steps_from_chunk() {
        let steps = test_steps("The customer must enter data and click submit to verify.", "nightly archive");
        assert_eq!(
            steps,
            vec![
                "1. Login as test user",
                "2. Navigate to relevant feature",
                "3. Enter required test data",
                "4. Execute primary action",
                "5. Verify expected results",
            ]
        );
        assert_eq!(test_steps("Reports go out.", "nightly archive"), vec!["1. Navigate to feature under test", "2. Confirm successful operation"]);
    }

    #[test]
    fn requirement_id_patterns_in_order() {
        assert_eq!(extract_requirement_id("see REQ-12 and FR-3").as_deref(), Some("REQ-12"));
        assert_eq!(extract_requirement_id("traces to r42 only").as_deref(), Some("r42"));
        assert_eq!(extract_requirement_id("no identifiers here"), None);
    }

    #[test]
    fn generated_ids_and_fields() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let chunks = vec!["REQ-1 The system shall allow user login.".to_string(), "Second chunk".to_string()];
        let cases = generate_test_cases("login", &chunks, 1, now);

        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].id, "TC_20240305_140709_1");
        assert_eq!(cases[1].id, "TC_20240305_140709_2");
        assert_eq!(cases[0].title, "Test Case for: login...");
        assert_eq!(cases[0].requirement_id.as_deref(), Some("REQ-1"));
        assert_eq!(cases[1].requirement_id, None);
        assert_eq!(cases[0].query.as_deref(), Some("login"));
        assert_eq!(cases[0].status, "Generated");
    }
}
