//! Fixture suites shared with `dev-test-runner`.
use json_union::{Catalog, Document};
use serde_json::Value;

const SUITES: &[(&str, &str)] = &[
    ("ui_events", include_str!("../fixtures/ui_events.json")),
    ("ordered_fallback", include_str!("../fixtures/ordered_fallback.json")),
    ("literals", include_str!("../fixtures/literals.json")),
];

fn run_suite(file: &str, source: &str) -> Vec<String> {
    let suite: Value = serde_json::from_str(source).unwrap();
    let catalog = Catalog::from_value(&suite["declarations"]).unwrap();
    let default_union = suite["union"].as_str().unwrap();

    let mut failures = Vec::new();
    for (index, case) in suite["cases"].as_array().unwrap().iter().enumerate() {
        let union_name = case["union"].as_str().unwrap_or(default_union);
        let union = catalog.union(union_name).unwrap();
        let expect = &case["expect"];
        let outcome = union.decode(&Document::new(&case["input"]));
        let ok = match (&outcome, expect.get("variant")) {
            (Ok(matched), Some(variant)) => {
                let route_ok = match expect.get("route") {
                    Some(route) => matched.route().map(|r| r.as_str()) == route.as_str(),
                    None => true,
                };
                matched.name() == variant && route_ok
            }
            (Err(error), None) => expect["error"] == error.kind(),
            _ => false,
        };
        if !ok {
            failures.push(format!("{file} case {index}: {outcome:?}"));
        }
    }
    failures
}

#[test]
fn fixture_suites_pass() {
    let failures: Vec<String> = SUITES
        .iter()
        .flat_map(|(file, source)| run_suite(file, source))
        .collect();
    assert!(failures.is_empty(), "{failures:#?}");
}

#[test]
fn encoded_values_decode_to_the_same_variant() {
    let suite: Value = serde_json::from_str(SUITES[0].1).unwrap();
    let catalog = Catalog::from_value(&suite["declarations"]).unwrap();
    let union = catalog.union("UIEvent").unwrap();
    for case in suite["cases"].as_array().unwrap() {
        let Ok(matched) = union.decode(&Document::new(&case["input"])) else {
            continue;
        };
        let encoded = union.encode(&matched).unwrap();
        let again = union.decode(&Document::new(&encoded)).unwrap();
        assert_eq!(again, matched);
    }
}
