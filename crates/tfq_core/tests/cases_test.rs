//! Runs the shared filter query cases in `tests/cases/filter_queries.json`.

#![allow(clippy::expect_used)]

use serde::Deserialize;
use serde_json::Value;
use std::fs;
use tfq_core::{TokenParams, parse_events, to_query_string};

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    query: String,
    params: Option<TokenParams>,
    #[serde(default)]
    canonical: Option<String>,
    #[serde(default)]
    events: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CaseFile {
    cases: Vec<Case>,
}

fn load_cases() -> CaseFile {
    let path = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../tests/cases/filter_queries.json"
    );
    let content = fs::read_to_string(path).expect("Failed to read case file");
    serde_json::from_str(&content).expect("Failed to parse case file")
}

/// Check a single case, returning the first mismatch
fn run_case(case: &Case) -> Result<(), String> {
    let (params, events) = parse_events(&case.query);

    if params != case.params {
        return Err(format!(
            "params mismatch:\n  got:      {params:?}\n  expected: {:?}",
            case.params
        ));
    }

    if let Some(expected) = &case.canonical {
        let Some(params) = &params else {
            return Err("canonical form given but nothing parsed".to_string());
        };
        let got = to_query_string(params);
        if &got != expected {
            return Err(format!(
                "canonical mismatch:\n  got:      {got:?}\n  expected: {expected:?}"
            ));
        }
    }

    if let Some(expected) = &case.events {
        let got = serde_json::to_value(&events).map_err(|e| e.to_string())?;
        if &got != expected {
            return Err(format!(
                "events mismatch:\n  got:      {got}\n  expected: {expected}"
            ));
        }
    }

    Ok(())
}

#[test]
fn run_filter_query_cases() {
    let cases = load_cases();
    let failures: Vec<(String, String)> = cases
        .cases
        .iter()
        .filter_map(|case| run_case(case).err().map(|e| (case.name.clone(), e)))
        .collect();

    for (name, reason) in &failures {
        println!("\n[FAIL] {name}\n  {reason}");
    }

    assert!(
        failures.is_empty(),
        "{} of {} filter query cases failed",
        failures.len(),
        cases.cases.len()
    );
}

#[test]
fn test_case_file_loads() {
    let cases = load_cases();
    assert!(!cases.cases.is_empty(), "case file should have cases");
}
