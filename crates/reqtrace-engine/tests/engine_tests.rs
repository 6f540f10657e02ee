use std::fs;
use tempfile::TempDir;

use reqtrace_core::config::EngineSettings;
use reqtrace_core::error::Error;
use reqtrace_core::types::{MappingMethod, TestCase, ValidationStatus};
use reqtrace_engine::Engine;

const SRS: &str = "The system shall allow user login with valid credentials.\n\n\
The system shall validate password length of at least 8 characters.";

fn engine() -> Engine {
    Engine::new(EngineSettings::default()).expect("engine")
}

fn ingested() -> Engine {
    let mut engine = engine();
    engine.ingest_text(SRS).expect("ingest");
    engine
}

#[test]
fn ingest_text_extracts_requirements() {
    let mut engine = engine();
    let summary = engine.ingest_text(SRS).expect("ingest");

    assert_eq!(summary.chunks, 2);
    assert_eq!(summary.requirements, 2);
    let ids: Vec<&str> = engine.requirements().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["FUNCTIONAL_0_0", "FUNCTIONAL_1_0"]);
}

#[test]
fn empty_document_is_rejected_and_keeps_state() {
    let mut engine = ingested();
    let err = engine.ingest_chunks(vec![]).unwrap_err();
    assert!(matches!(err, Error::EmptyIndex(_)));
    assert_eq!(engine.chunks().len(), 2);
    assert_eq!(engine.requirements().len(), 2);
}

#[test]
fn ingest_directory_reads_txt_files() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a.txt"), "The system shall allow user login with valid credentials.").unwrap();
    fs::write(tmp.path().join("b.txt"), "The system shall export monthly reports to the archive.").unwrap();

    let mut engine = engine();
    let summary = engine.ingest_directory(tmp.path()).expect("ingest");
    assert_eq!(summary.chunks, 2);
    assert_eq!(engine.requirements()[0].source_chunk_index, 0);
}

#[test]
fn query_generates_one_case_per_retrieved_chunk() {
    let mut engine = ingested();
    let cases = engine.query("login").expect("query");

    assert_eq!(cases.len(), 2, "only two chunks exist");
    assert!(cases[0].chunk_source.as_deref().is_some_and(|c| c.contains("login")));
    assert_eq!(cases[0].steps[0], "1. Navigate to login page");
    assert_eq!(engine.test_cases().len(), 2);

    let again = engine.query("login").expect("query");
    assert_ne!(again[0].id, cases[0].id, "ids keep counting across queries");
    assert_eq!(engine.test_cases().len(), 4);
}

#[test]
fn query_errors() {
    let mut fresh = engine();
    assert!(matches!(fresh.query("login").unwrap_err(), Error::EmptyIndex(_)));

    let mut engine = ingested();
    assert!(matches!(engine.query("   ").unwrap_err(), Error::EmptyQuery));
}

#[test]
fn upload_filters_malformed_entries_and_merges_by_id() {
    let mut engine = ingested();
    let json = r#"[
        {"id": "TC_1", "title": "Verify login success", "steps": "1. Enter valid credentials\n2. Click login", "description": "tests login", "query": "login"},
        "not a record",
        {"id": "TC_1", "title": "duplicate"}
    ]"#;
    let summary = engine.upload_test_cases(json).expect("upload");
    assert_eq!(summary.added, 1);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.total_test_cases, 1);

    assert!(engine.upload_test_cases(r#"{"id": "TC_2"}"#).is_err());

    let outcome = engine.map();
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].method, MappingMethod::Retrieval);
    assert_eq!(outcome.results[0].matches[0].requirement_id, "FUNCTIONAL_0_0");
    assert_eq!(outcome.summary.covered_requirements, 1);

    let report = engine.coverage_report();
    assert_eq!(report.coverage_percentage, 50.0);
}

#[test]
fn requirements_from_exclaiming_chunks_still_map_through_retrieval() {
    let chunk = "Users must sign in first! The system shall lock accounts after five failures...? Admins can unlock them.";
    let mut engine = engine();
    engine.ingest_chunks(vec![chunk.to_string()]).expect("ingest");
    assert_eq!(engine.requirements().len(), 1);
    assert!(chunk.contains(&engine.requirements()[0].content));

    engine.add_test_cases(vec![TestCase::new("TC_LOCK", chunk)]);
    let outcome = engine.map();
    assert_eq!(outcome.results[0].method, MappingMethod::Retrieval);
    assert_eq!(outcome.results[0].matches.len(), 1);
    assert_eq!(outcome.results[0].matches[0].requirement_id, engine.requirements()[0].id);
}

#[test]
fn traceability_and_stats_agree() {
    let mut engine = ingested();
    engine
        .upload_test_cases(r#"[{"id": "TC_1", "title": "Verify login success", "steps": ["Enter valid credentials", "Click login"]}]"#)
        .expect("upload");

    let outcome = engine.traceability();
    assert_eq!(outcome.matrix.mappings["FUNCTIONAL_0_0"], vec!["TC_1"]);
    assert_eq!(outcome.coverage_stats.overall.coverage_percentage, 50.0);
    assert_eq!(engine.stats(), outcome.coverage_stats);
}

#[test]
fn stats_without_anything_ingested_are_zero() {
    let mut engine = engine();
    let stats = engine.stats();
    assert_eq!(stats.overall.coverage_percentage, 0.0);
    assert!(stats.uncovered_requirements.is_empty());
}

#[test]
fn validate_scores_cases_and_confirms_requirements() {
    let mut engine = ingested();
    let json = r#"[{
        "id": "TC_9",
        "title": "Verify login with valid credentials",
        "description": "Checks that a registered user can log in",
        "steps": ["1. Navigate to login page", "2. Click login button"],
        "expected": "Dashboard displays a welcome message",
        "requirement_id": "FUNCTIONAL_0_0"
    }]"#;
    engine.upload_test_cases(json).expect("upload");

    let outcome = engine.validate();
    assert_eq!(outcome.summary.total_test_cases, 1);
    assert_eq!(outcome.summary.valid_test_cases, 1);
    assert_eq!(outcome.results[0].score, 100);
    assert_eq!(engine.test_cases()[0].quality_score, Some(100));
    assert_eq!(engine.requirements()[0].validation_status, ValidationStatus::Valid);
    assert_eq!(engine.requirements()[1].validation_status, ValidationStatus::Pending);
}

#[test]
fn invalid_settings_are_rejected() {
    let settings = EngineSettings { map_threshold: 2.0, ..EngineSettings::default() };
    assert!(matches!(Engine::new(settings), Err(Error::InvalidConfig(_))));

    // a zero overlap would link every requirement to every test case
    let settings = EngineSettings { coverage_min_overlap: 0, ..EngineSettings::default() };
    assert!(matches!(Engine::new(settings), Err(Error::InvalidConfig(_))));
    let settings = EngineSettings { uncovered_report_limit: 0, ..EngineSettings::default() };
    assert!(matches!(Engine::new(settings), Err(Error::InvalidConfig(_))));
}
