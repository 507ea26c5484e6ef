use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ipa_query_rs::ipa::features::builtin_table;
use ipa_query_rs::{parse_corpus, CancelToken, QueryConfig, QueryDriverBuilder, QueryResult, ResultSet};
use libtest_mimic::{Arguments, Failed, Trial};
use serde::Deserialize;

const SUITE_NAME: &str = "query_reference";

/// One fixture: an inline corpus, a query, and the results it must produce.
#[derive(Debug, Deserialize)]
struct QueryCase {
    #[serde(default)]
    description: String,
    corpus: serde_json::Value,
    query: QueryConfig,
    expected: Expected,
}

#[derive(Debug, Deserialize)]
struct Expected {
    result_count: usize,
    #[serde(default)]
    results: Vec<ExpectedResult>,
}

#[derive(Debug, Deserialize)]
struct ExpectedResult {
    record_index: usize,
    /// Checked in order when present.
    #[serde(default)]
    values: Vec<ExpectedValue>,
    /// Keys listed here must be present with these values.
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ExpectedValue {
    name: String,
    data: String,
    #[serde(default)]
    range: Option<[usize; 2]>,
}

fn main() {
    let args = Arguments::from_args();
    let repo_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let cases_dir = repo_root.join("test-data").join("queries");

    let cases = match load_cases(&cases_dir) {
        Ok(cases) => cases,
        Err(err) => {
            run_setup_failure(&args, err);
            return;
        }
    };
    if cases.is_empty() {
        run_setup_failure(&args, "No query fixtures found under test-data/queries.".to_string());
        return;
    }

    let tests = cases
        .into_iter()
        .map(|(name, case)| {
            Trial::test(format!("{SUITE_NAME}::{name}"), move || {
                run_case(&case).map_err(Failed::from)
            })
        })
        .collect();
    libtest_mimic::run(&args, tests).exit();
}

fn run_setup_failure(args: &Arguments, message: String) {
    let test = Trial::test(format!("{SUITE_NAME}::setup"), move || Err(Failed::from(message)));
    libtest_mimic::run(args, vec![test]).exit();
}

fn load_cases(dir: &Path) -> Result<Vec<(String, QueryCase)>, String> {
    let entries = fs::read_dir(dir).map_err(|err| format!("Failed to read '{}': {err}", dir.display()))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let data = fs::read_to_string(&path)
                .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
            let case: QueryCase = serde_json::from_str(&data)
                .map_err(|err| format!("Failed to parse '{}': {err}", path.display()))?;
            Ok((name, case))
        })
        .collect()
}

fn run_case(case: &QueryCase) -> Result<(), String> {
    let corpus = serde_json::to_string(&case.corpus).map_err(|err| err.to_string())?;
    let sessions = parse_corpus(&corpus, builtin_table()).map_err(|err| format!("corpus: {err}"))?;
    let driver = QueryDriverBuilder::new(case.query.clone())
        .build()
        .map_err(|err| format!("driver: {err}"))?;

    let sink = ResultSet::new();
    let summary = driver.run(&sessions, &sink, &CancelToken::new());
    let results = sink.into_results();

    if results.len() != case.expected.result_count || summary.results != results.len() {
        return Err(format!(
            "{}: expected {} result(s), got {} (summary {}): {:#?}",
            case.description,
            case.expected.result_count,
            results.len(),
            summary.results,
            results
        ));
    }
    for (index, (expected, actual)) in case.expected.results.iter().zip(&results).enumerate() {
        check_result(index, expected, actual).map_err(|err| format!("{}: {err}", case.description))?;
    }
    Ok(())
}

fn check_result(index: usize, expected: &ExpectedResult, actual: &QueryResult) -> Result<(), String> {
    if expected.record_index != actual.record_index {
        return Err(format!(
            "result {index}: expected record {}, got {}",
            expected.record_index, actual.record_index
        ));
    }
    if !expected.values.is_empty() && expected.values.len() != actual.values.len() {
        return Err(format!(
            "result {index}: expected {} value(s), got {:?}",
            expected.values.len(),
            actual.values
        ));
    }
    for (value_index, (want, got)) in expected.values.iter().zip(&actual.values).enumerate() {
        let range_ok = want
            .range
            .map_or(true, |[start, end]| got.range.start == start && got.range.end == end);
        if want.name != got.name || want.data != got.data || !range_ok {
            return Err(format!("result {index} value {value_index}: expected {want:?}, got {got:?}"));
        }
    }
    for (key, want) in &expected.metadata {
        match actual.metadata.get(key) {
            Some(got) if got == want => {}
            other => {
                return Err(format!(
                    "result {index} metadata '{key}': expected '{want}', got {other:?}"
                ))
            }
        }
    }
    Ok(())
}
