use reqtrace_core::ingest::parse_test_cases;
use reqtrace_core::types::{Category, MappingMethod, Priority, Requirement, RequirementType, TestCase, ValidationStatus};
use reqtrace_map::{coverage_report, MapperConfig, MappingSummary, RequirementMapper};
use reqtrace_text::LexicalIndex;

const LOGIN: &str = "The system shall allow user login with valid credentials";
const PASSWORD: &str = "The system shall validate password length of at least 8 characters";

fn requirement(id: &str, content: &str) -> Requirement {
    Requirement {
        id: id.to_string(),
        req_type: RequirementType::Functional,
        content: content.to_string(),
        source_chunk_index: 0,
        priority: Priority::High,
        category: Category::Authentication,
        validation_status: ValidationStatus::Pending,
    }
}

fn login_requirements() -> Vec<Requirement> {
    vec![requirement("FUNCTIONAL_0_0", LOGIN), requirement("FUNCTIONAL_1_0", PASSWORD)]
}

fn login_index() -> LexicalIndex {
    let mut index = LexicalIndex::new();
    index.build(vec![format!("{LOGIN}."), format!("{PASSWORD}.")]).expect("build");
    index
}

fn login_test_case() -> TestCase {
    let json = r#"[{
        "id": "TC_1",
        "title": "Verify login success",
        "steps": "1. Enter valid credentials\n2. Click login",
        "description": "tests login",
        "query": "login"
    }]"#;
    parse_test_cases(json).expect("parse").accepted.remove(0)
}

#[test]
fn login_test_case_maps_to_login_requirement() {
    let results = RequirementMapper::default().map(&[login_test_case()], &login_requirements(), &login_index());

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.method, MappingMethod::Retrieval);
    assert_eq!(result.matches.len(), 1, "password requirement shares no words: {:?}", result.matches);
    let top = &result.matches[0];
    assert_eq!(top.requirement_id, "FUNCTIONAL_0_0");
    assert!(top.similarity > 0.0 && top.similarity <= 1.0);
    // 3 shared words out of 16
    assert!((top.similarity - 0.1875).abs() < 1e-9);
    assert_eq!(result.confidence, 0.188);
    assert_eq!(result.test_case_title, "Verify login success");
}

#[test]
fn unbuilt_index_switches_to_keyword_fallback() {
    let empty = LexicalIndex::new();
    let results = RequirementMapper::default().map(&[login_test_case()], &login_requirements(), &empty);

    assert_eq!(results[0].method, MappingMethod::KeywordFallback);
    assert_eq!(results[0].matches[0].requirement_id, "FUNCTIONAL_0_0");
}

#[test]
fn weak_matches_can_be_disabled() {
    let mapper = RequirementMapper::new(MapperConfig { keep_best_weak_match: false, ..MapperConfig::default() });
    let results = mapper.map(&[login_test_case()], &login_requirements(), &login_index());
    assert!(results[0].matches.is_empty());
    assert_eq!(results[0].confidence, 0.0);
}

#[test]
fn a_single_shared_stopword_is_not_a_weak_match() {
    let reqs = login_requirements();
    let tc = TestCase::new("TC_8", "Archive the nightly report");
    let results = RequirementMapper::default().map(&[tc], &reqs, &login_index());

    assert_eq!(results[0].method, MappingMethod::Retrieval);
    assert!(results[0].matches.is_empty(), "{:?}", results[0].matches);
    assert_eq!(coverage_report(&reqs, &results, 10).coverage_percentage, 0.0);

    let lenient = RequirementMapper::new(MapperConfig { weak_match_min_shared_words: 1, ..MapperConfig::default() });
    let results = lenient.map(&[TestCase::new("TC_8", "Archive the nightly report")], &reqs, &login_index());
    assert_eq!(results[0].matches.len(), 1);
}

#[test]
fn map_one_agrees_with_map() {
    let reqs = login_requirements();
    let mapper = RequirementMapper::default();
    let single = mapper.map_one(&login_test_case(), &reqs, &login_index());
    let batch = mapper.map(&[login_test_case()], &reqs, &login_index());
    assert_eq!(single.matches, batch[0].matches);
    assert_eq!(single.confidence, batch[0].confidence);
}

#[test]
fn explicit_link_boosts_confidence_up_to_one() {
    let mut tc = TestCase::new("TC_2", LOGIN);
    tc.requirement_id = Some("FUNCTIONAL_0_0".into());
    let results = RequirementMapper::default().map(&[tc], &login_requirements(), &login_index());

    assert_eq!(results[0].matches[0].similarity, 1.0);
    assert_eq!(results[0].confidence, 1.0);
}

#[test]
fn every_requirement_inside_a_matching_chunk_is_a_candidate() {
    let combined = format!("{LOGIN}. {PASSWORD}.");
    let mut index = LexicalIndex::new();
    index.build(vec![combined.clone()]).expect("build");

    let tc = TestCase::new("TC_3", combined);
    let results = RequirementMapper::default().map(&[tc], &login_requirements(), &index);
    let ids: Vec<&str> = results[0].matches.iter().map(|m| m.requirement_id.as_str()).collect();
    assert_eq!(ids, vec!["FUNCTIONAL_0_0", "FUNCTIONAL_1_0"]);
}

#[test]
fn broad_matches_are_capped_and_penalised() {
    let reqs = vec![
        requirement("R1", "alpha beta gamma delta"),
        requirement("R2", "alpha beta gamma epsilon"),
        requirement("R3", "alpha beta gamma zeta"),
        requirement("R4", "alpha beta gamma eta"),
    ];
    let tc = TestCase::new("TC_4", "alpha beta gamma delta");
    let results = RequirementMapper::default().map(&[tc], &reqs, &LexicalIndex::new());

    let result = &results[0];
    assert_eq!(result.matches.len(), 3);
    let ids: Vec<&str> = result.matches.iter().map(|m| m.requirement_id.as_str()).collect();
    assert_eq!(ids, vec!["R1", "R2", "R3"], "sorted descending, ties keep input order");
    assert_eq!(result.confidence, 0.8);
    assert!(result.matches.windows(2).all(|w| w[0].similarity >= w[1].similarity));
}

#[test]
fn empty_composite_text_yields_no_matches() {
    let results = RequirementMapper::default().map(&[TestCase::new("TC_5", "")], &login_requirements(), &login_index());
    assert!(results[0].matches.is_empty());
    assert_eq!(results[0].confidence, 0.0);
}

#[test]
fn records_without_id_are_skipped() {
    let tcs = vec![TestCase::new("", "Verify login"), login_test_case()];
    let results = RequirementMapper::default().map(&tcs, &login_requirements(), &login_index());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].test_case_id, "TC_1");
}

#[test]
fn malformed_upload_entries_never_reach_the_mapper() {
    let json = r#"[
        {"id": "TC_1", "title": "Verify login success"},
        "not a record",
        42,
        {"title": "missing id"}
    ]"#;
    let report = parse_test_cases(json).expect("parse");
    let results = RequirementMapper::default().map(&report.accepted, &login_requirements(), &login_index());
    assert_eq!(results.len(), 1);
    assert_eq!(report.rejected.len(), 3);
}

#[test]
fn confidence_stays_in_unit_range() {
    let tcs = vec![login_test_case(), TestCase::new("TC_6", LOGIN), TestCase::new("TC_7", "unrelated words only")];
    for result in RequirementMapper::default().map(&tcs, &login_requirements(), &login_index()) {
        assert!((0.0..=1.0).contains(&result.confidence), "{result:?}");
        assert!(result.matches.len() <= 3);
    }
}

#[test]
fn method_serializes_snake_case() {
    let json = serde_json::to_string(&MappingMethod::KeywordFallback).expect("json");
    assert_eq!(json, "\"keyword_fallback\"");
}

#[test]
fn coverage_report_counts_mapped_requirements() {
    let reqs = login_requirements();
    let results = RequirementMapper::default().map(&[login_test_case()], &reqs, &login_index());
    let report = coverage_report(&reqs, &results, 10);

    assert_eq!(report.total_requirements, 2);
    assert_eq!(report.covered_requirements, 1);
    assert_eq!(report.uncovered_requirements, 1);
    assert_eq!(report.coverage_percentage, 50.0);
    assert_eq!(report.uncovered_list[0].id, "FUNCTIONAL_1_0");
    let auth = &report.coverage_by_category[&Category::Authentication];
    assert_eq!((auth.total, auth.covered, auth.percentage), (2, 1, 50.0));

    let summary = MappingSummary::new(&reqs, &results);
    assert_eq!(summary.total_test_cases, 1);
    assert_eq!(summary.mapped_test_cases, 1);
    assert_eq!(summary.covered_requirements, 1);
}

#[test]
fn coverage_report_of_nothing_is_zero() {
    let report = coverage_report(&[], &[], 10);
    assert_eq!(report.coverage_percentage, 0.0);
    assert!(report.uncovered_list.is_empty());
    assert!(report.coverage_by_category.is_empty());
}
