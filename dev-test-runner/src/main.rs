//! Runs every `fixtures/*.json` suite through a runtime catalog.
//!
//! ```text
//! cargo run -p dev-test-runner -- [PATTERN]
//! ```
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use json_union::{Catalog, Document};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Suite {
    name: String,
    declarations: Value,
    union: String,
    cases: Vec<Case>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Case {
    #[serde(default)]
    union: Option<String>,
    input: Value,
    expect: Expect,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Expect {
    Variant {
        variant: String,
        #[serde(default)]
        route: Option<String>,
    },
    Error {
        error: String,
    },
}

#[derive(Debug, Default)]
struct Tally {
    passed: usize,
    failed: usize,
}

fn run_case(catalog: &Catalog, default_union: &str, case: &Case) -> Result<(), String> {
    let union_name = case.union.as_deref().unwrap_or(default_union);
    let union = catalog
        .union(union_name)
        .ok_or_else(|| format!("no union named `{union_name}`"))?;
    let outcome = union.decode(&Document::new(&case.input));
    match (&case.expect, outcome) {
        (Expect::Variant { variant, route }, Ok(matched)) => {
            if matched.name() != variant {
                return Err(format!("expected variant `{variant}`, got `{}`", matched.name()));
            }
            let got_route = matched.route().map(|r| r.as_str());
            if let Some(route) = route {
                if got_route != Some(route.as_str()) {
                    return Err(format!("expected route `{route}`, got {got_route:?}"));
                }
            }
            let encoded = union.encode(&matched).map_err(|e| e.to_string())?;
            let again = union
                .decode(&Document::new(&encoded))
                .map_err(|e| format!("re-decoding the encoded value failed: {e}"))?;
            if again.name() != matched.name() {
                return Err(format!("re-decoded as `{}` instead of `{}`", again.name(), matched.name()));
            }
            Ok(())
        }
        (Expect::Variant { variant, .. }, Err(error)) => {
            Err(format!("expected variant `{variant}`, got error: {error}"))
        }
        (Expect::Error { error }, Ok(matched)) => {
            Err(format!("expected error `{error}`, decoded as `{}`", matched.name()))
        }
        (Expect::Error { error }, Err(got)) if got.kind() == error => Ok(()),
        (Expect::Error { error }, Err(got)) => {
            Err(format!("expected error `{error}`, got `{}`: {got}", got.kind()))
        }
    }
}

fn run_suite(path: &PathBuf, tally: &mut Tally) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read fixture ({})", path.display()))?;
    let suite: Suite = serde_json::from_str(&source)
        .with_context(|| format!("invalid fixture ({})", path.display()))?;
    let catalog = Catalog::from_value(&suite.declarations)
        .with_context(|| format!("invalid declarations in {}", path.display()))?;

    eprintln!("{} {}", "——".dimmed(), suite.name.bold());
    for (index, case) in suite.cases.iter().enumerate() {
        match run_case(&catalog, &suite.union, case) {
            Ok(()) => {
                tally.passed += 1;
                eprintln!("  {} case {index}", "✔".green());
            }
            Err(reason) => {
                tally.failed += 1;
                eprintln!("  {} case {index}: {reason}", "✘".red());
                eprintln!("      input: {}", case.input);
            }
        }
    }
    Ok(())
}

fn run() -> Result<Tally> {
    let pattern = std::env::args().nth(1).unwrap_or_else(|| {
        concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures/*.json").to_string()
    });
    let mut tally = Tally::default();
    let mut seen = 0;
    for entry in glob::glob(&pattern)? {
        run_suite(&entry?, &mut tally)?;
        seen += 1;
    }
    anyhow::ensure!(seen > 0, "no fixture suites matched {pattern}");
    Ok(tally)
}

fn main() -> ExitCode {
    match run() {
        Ok(tally) if tally.failed == 0 => {
            eprintln!("{} {} cases passed", "ok".green().bold(), tally.passed);
            ExitCode::SUCCESS
        }
        Ok(tally) => {
            eprintln!(
                "{} {} passed, {} failed",
                "FAILED".red().bold(),
                tally.passed,
                tally.failed
            );
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}
