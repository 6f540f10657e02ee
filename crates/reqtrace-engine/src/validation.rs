//! Rule-based test-case quality checks.
//!
//! Nine rules; a failed critical rule (title, steps, expected result) makes
//! the test case invalid. The quality score is the share of rules passed.
//! Results never feed back into matching or coverage.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use reqtrace_core::types::{Requirement, TestCase};
use reqtrace_core::util::round_to;

static STEP_MARKERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"^\d+\.", r"^Step \d+", r"^\w+\)", r"^-", r"^\*"]
        .iter()
        .map(|p| Regex::new(p).expect("step marker pattern compiles"))
        .collect()
});

const GENERIC_TITLES: &[&str] = &["test case", "test", "untitled"];
const ACTION_VERBS: &[&str] = &["click", "enter", "select", "verify", "check", "navigate", "input", "submit"];
const VAGUE_RESULTS: &[&str] = &["should work", "works correctly", "functions properly", "behaves as expected"];
const DATA_KEYWORDS: &[&str] = &["username", "password", "email", "data", "input", "value", "credentials"];
const PRIORITIES: &[&str] = &["high", "medium", "low", "critical", "normal"];
const AMBIGUOUS: &[&str] = &["might", "could", "maybe", "possibly", "probably", "seems"];
const PASSIVE: &[&str] = &["is done", "are performed", "will be", "should be"];
const MEASURABLE: &[&str] = &[
    "displays", "shows", "appears", "contains", "equals", "returns", "status code", "message", "error", "success",
    "redirects", "loads",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuleOutcome {
    pub passed: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl RuleOutcome {
    fn pass() -> Self { Self { passed: true, ..Self::default() } }

    fn pass_with(warnings: Vec<String>) -> Self { Self { passed: true, errors: Vec::new(), warnings } }

    fn error(message: &str) -> Self { Self { passed: false, errors: vec![message.to_string()], warnings: Vec::new() } }

    fn warning(message: impl Into<String>) -> Self {
        Self { passed: false, errors: Vec::new(), warnings: vec![message.into()] }
    }
}

type Rule = fn(&TestCase, &[Requirement]) -> RuleOutcome;

/// `(name, check, critical)`, in evaluation order.
const RULES: &[(&str, Rule, bool)] = &[
    ("has_title", check_title, true),
    ("has_description", check_description, false),
    ("has_steps", check_steps, true),
    ("has_expected_result", check_expected_result, true),
    ("has_test_data", check_test_data, false),
    ("has_priority", check_priority, false),
    ("has_requirement_mapping", check_requirement_mapping, false),
    ("step_clarity", check_step_clarity, false),
    ("result_measurable", check_measurable_result, false),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleResult {
    pub rule: &'static str,
    #[serde(flatten)]
    pub outcome: RuleOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub test_case_id: String,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// 0-100.
    pub score: u8,
    pub details: Vec<RuleResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationSummary {
    pub total_test_cases: usize,
    pub valid_test_cases: usize,
    pub invalid_test_cases: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub average_quality_score: f64,
    pub generated_at: DateTime<Utc>,
}

pub fn validate_test_case(tc: &TestCase, requirements: &[Requirement]) -> ValidationReport {
    let mut report = ValidationReport {
        test_case_id: tc.id.clone(),
        is_valid: true,
        errors: Vec::new(),
        warnings: Vec::new(),
        score: 0,
        details: Vec::with_capacity(RULES.len()),
    };
    let mut passed = 0usize;
    for &(rule, check, critical) in RULES {
        let outcome = check(tc, requirements);
        if outcome.passed {
            passed += 1;
        } else {
            report.errors.extend(outcome.errors.iter().cloned());
            report.warnings.extend(outcome.warnings.iter().cloned());
            if critical {
                report.is_valid = false;
            }
        }
        report.details.push(RuleResult { rule, outcome });
    }
    // truncating, as an integer percentage
    report.score = (passed * 100 / RULES.len()) as u8;
    report
}

pub fn validate_test_cases(test_cases: &[TestCase], requirements: &[Requirement]) -> Vec<ValidationReport> {
    test_cases.iter().map(|tc| validate_test_case(tc, requirements)).collect()
}

pub fn summarize(reports: &[ValidationReport]) -> ValidationSummary {
    let total = reports.len();
    let valid = reports.iter().filter(|r| r.is_valid).count();
    let average = if total == 0 {
        0.0
    } else {
        round_to(reports.iter().map(|r| f64::from(r.score)).sum::<f64>() / total as f64, 2)
    };
    ValidationSummary {
        total_test_cases: total,
        valid_test_cases: valid,
        invalid_test_cases: total - valid,
        total_errors: reports.iter().map(|r| r.errors.len()).sum(),
        total_warnings: reports.iter().map(|r| r.warnings.len()).sum(),
        average_quality_score: average,
        generated_at: Utc::now(),
    }
}

fn steps_text(tc: &TestCase) -> String {
    tc.steps.join("\n")
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

fn check_title(tc: &TestCase, _: &[Requirement]) -> RuleOutcome {
    let title = tc.title.trim();
    if title.is_empty() {
        RuleOutcome::error("Test case must have a title")
    } else if title.chars().count() < 10 {
        RuleOutcome::error("Title too short - should be descriptive")
    } else if GENERIC_TITLES.contains(&title.to_lowercase().as_str()) {
        RuleOutcome::error("Title is too generic - should describe what is being tested")
    } else {
        RuleOutcome::pass()
    }
}

fn check_description(tc: &TestCase, _: &[Requirement]) -> RuleOutcome {
    let description = tc.description.trim();
    if description.is_empty() {
        RuleOutcome::error("Test case should have a description")
    } else if description.chars().count() < 20 {
        RuleOutcome::warning("Description might be too brief")
    } else {
        RuleOutcome::pass()
    }
}

fn check_steps(tc: &TestCase, _: &[Requirement]) -> RuleOutcome {
    let steps = steps_text(tc);
    if steps.trim().is_empty() {
        return RuleOutcome::error("Test case must have execution steps");
    }
    let mut warnings = Vec::new();
    let structured = steps
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .any(|line| STEP_MARKERS.iter().any(|re| re.is_match(line)));
    if !structured {
        warnings.push("Steps should be numbered or structured for clarity".to_string());
    }
    if !contains_any(&steps.to_lowercase(), ACTION_VERBS) {
        warnings.push("Steps should contain clear action verbs (click, enter, verify, etc.)".to_string());
    }
    RuleOutcome::pass_with(warnings)
}

fn check_expected_result(tc: &TestCase, _: &[Requirement]) -> RuleOutcome {
    let expected = tc.expected.trim();
    if expected.is_empty() {
        RuleOutcome::error("Test case must have expected results")
    } else if expected.chars().count() < 10 {
        RuleOutcome::warning("Expected result should be more detailed")
    } else if contains_any(&expected.to_lowercase(), VAGUE_RESULTS) {
        RuleOutcome::warning("Expected result is too vague - be more specific")
    } else {
        RuleOutcome::pass()
    }
}

fn check_test_data(tc: &TestCase, _: &[Requirement]) -> RuleOutcome {
    let text = format!("{}{}", steps_text(tc), tc.description).to_lowercase();
    if contains_any(&text, DATA_KEYWORDS) && !text.contains("test data") {
        return RuleOutcome::pass_with(vec!["Consider specifying test data requirements".to_string()]);
    }
    RuleOutcome::pass()
}

fn check_priority(tc: &TestCase, _: &[Requirement]) -> RuleOutcome {
    let priority = tc.priority.trim();
    if priority.is_empty() {
        RuleOutcome::warning("Test case should have priority assigned")
    } else if !PRIORITIES.contains(&priority.to_lowercase().as_str()) {
        RuleOutcome::warning(format!("Priority should be one of: {}", PRIORITIES.join(", ")))
    } else {
        RuleOutcome::pass()
    }
}

fn check_requirement_mapping(tc: &TestCase, requirements: &[Requirement]) -> RuleOutcome {
    let Some(id) = tc.requirement_id.as_deref() else {
        return RuleOutcome::warning("Test case should be mapped to a requirement");
    };
    if !requirements.is_empty() && !requirements.iter().any(|r| r.id == id) {
        return RuleOutcome::warning(format!("Requirement ID {id} not found among extracted requirements"));
    }
    RuleOutcome::pass()
}

fn check_step_clarity(tc: &TestCase, _: &[Requirement]) -> RuleOutcome {
    let steps = steps_text(tc).to_lowercase();
    let mut warnings = Vec::new();
    if contains_any(&steps, AMBIGUOUS) {
        warnings.push("Steps contain ambiguous language - be more definitive".to_string());
    }
    if contains_any(&steps, PASSIVE) {
        warnings.push("Consider using active voice in test steps".to_string());
    }
    RuleOutcome::pass_with(warnings)
}

fn check_measurable_result(tc: &TestCase, _: &[Requirement]) -> RuleOutcome {
    if contains_any(&tc.expected.to_lowercase(), MEASURABLE) {
        RuleOutcome::pass()
    } else {
        RuleOutcome::pass_with(vec!["Expected result should be measurable and verifiable".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_case() -> TestCase {
        let mut tc = TestCase::new("TC_1", "Verify login with valid credentials");
        tc.description = "Checks that a registered user can log in".into();
        tc.steps = vec!["1. Navigate to login page".into(), "2. Click login button".into()];
        tc.expected = "Dashboard displays a welcome message".into();
        tc
    }

    #[test]
    fn complete_case_without_mapping_scores_88() {
        let report = validate_test_case(&complete_case(), &[]);
        assert!(report.is_valid);
        // 8 of 9 rules pass
        assert_eq!(report.score, 88);
        assert_eq!(report.warnings, vec!["Test case should be mapped to a requirement"]);
        assert_eq!(report.details.len(), 9);
    }

    #[test]
    fn missing_steps_is_critical() {
        let mut tc = complete_case();
        tc.steps.clear();
        let report = validate_test_case(&tc, &[]);
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("execution steps")));
    }

    #[test]
    fn missing_description_is_not_critical() {
        let mut tc = complete_case();
        tc.description.clear();
        let report = validate_test_case(&tc, &[]);
        assert!(report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("description")));
    }

    #[test]
    fn generic_or_short_titles_fail() {
        let mut tc = complete_case();
        tc.title = "Untitled".into();
        assert!(!validate_test_case(&tc, &[]).is_valid);
        tc.title = "Test Case".into();
        assert!(!validate_test_case(&tc, &[]).is_valid);
    }

    #[test]
    fn unstructured_steps_only_warn() {
        let mut tc = complete_case();
        tc.steps = vec!["log in somehow".into()];
        let outcome = check_steps(&tc, &[]);
        assert!(outcome.passed);
        assert_eq!(outcome.warnings.len(), 2);
    }

    #[test]
    fn summary_of_nothing_is_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_test_cases, 0);
        assert_eq!(summary.average_quality_score, 0.0);
    }
}
