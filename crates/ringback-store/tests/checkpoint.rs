use ringback_core::{Contact, MatchRecord, Outcome, PhoneCandidate};
use ringback_store::{CheckpointStore, Disposition, ResultsStore, WorkingSet};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SOURCE: &str = "email,first_name
ada@example.com,Ada
grace@example.com,Grace
alan@example.com,Alan
";

fn setup(temp: &TempDir) -> (PathBuf, PathBuf) {
    let source = temp.path().join("contacts.csv");
    let results = temp.path().join("result.csv");
    fs::write(&source, SOURCE).expect("write source");
    (source, results)
}

fn matched(name: &str, number: &str) -> Outcome {
    Outcome::Matched(MatchRecord::new(
        name,
        PhoneCandidate::new(number).expect("candidate"),
    ))
}

fn pending_emails(path: &Path) -> Vec<String> {
    WorkingSet::open(path)
        .expect("reopen source")
        .contacts()
        .map(|contact| contact.email.clone())
        .collect()
}

#[test]
fn commit_applies_each_transition() {
    let temp = TempDir::new().expect("temp dir");
    let (source, results) = setup(&temp);
    let mut store = CheckpointStore::open(&source, &results).expect("open");

    let retry = store
        .commit(0, &Outcome::TransientError("timeout".to_string()))
        .expect("retry");
    assert_eq!(retry, Disposition::Retry);
    assert_eq!(pending_emails(&source).len(), 3);

    let saved = store.commit(0, &matched("Ada", "5550100")).expect("saved");
    assert_eq!(saved, Disposition::Saved);
    assert_eq!(
        pending_emails(&source),
        vec!["grace@example.com", "alan@example.com"]
    );

    let removed = store.commit(1, &Outcome::NoNameMatch).expect("removed");
    assert_eq!(removed, Disposition::Removed);
    assert_eq!(pending_emails(&source), vec!["grace@example.com"]);

    let records = ResultsStore::read_existing(&results).expect("results");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].first_name, "Ada");
    assert_eq!(records[0].phone_number.as_str(), "5550100");
}

#[test]
fn run_processes_in_order_and_keeps_transient_failures() {
    let temp = TempDir::new().expect("temp dir");
    let (source, results) = setup(&temp);
    let mut store = CheckpointStore::open(&source, &results).expect("open");

    let mut seen = Vec::new();
    let mut reports = Vec::new();
    let summary = store.run(
        None,
        |contact: &Contact| {
            seen.push(contact.first_name.clone());
            match contact.first_name.as_str() {
                "Ada" => matched("Ada", "5550100"),
                "Grace" => Outcome::TransientError("search failed".to_string()),
                _ => Outcome::NoSnippets,
            }
        },
        |report| reports.push((report.position, report.disposition)),
    );

    assert_eq!(seen, vec!["Ada", "Grace", "Alan"]);
    assert_eq!(
        reports,
        vec![
            (0, Disposition::Saved),
            (0, Disposition::Retry),
            (1, Disposition::Removed),
        ]
    );
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.matched, 1);
    assert_eq!(summary.no_snippets, 1);
    assert_eq!(summary.retry, 1);
    assert_eq!(summary.remaining, 1);
    assert!(summary.unsaved.is_empty());
    assert!(!summary.source_stale);
    assert_eq!(pending_emails(&source), vec!["grace@example.com"]);
}

#[test]
fn rerun_retries_pending_and_appends_to_prior_results() {
    let temp = TempDir::new().expect("temp dir");
    let (source, results) = setup(&temp);

    {
        let mut store = CheckpointStore::open(&source, &results).expect("open");
        store.run(
            None,
            |contact: &Contact| match contact.first_name.as_str() {
                "Ada" => matched("Ada", "5550100"),
                _ => Outcome::TransientError("offline".to_string()),
            },
            |_| {},
        );
    }

    let mut store = CheckpointStore::open(&source, &results).expect("reopen");
    assert!(!store.results().created());
    assert_eq!(store.pending().len(), 2);
    let summary = store.run(
        None,
        |contact: &Contact| match contact.first_name.as_str() {
            "Grace" => matched("Grace", "5550101"),
            _ => Outcome::NoCandidates,
        },
        |_| {},
    );

    assert_eq!(summary.matched, 1);
    assert_eq!(summary.no_candidates, 1);
    assert_eq!(summary.remaining, 0);
    let records = ResultsStore::read_existing(&results).expect("results");
    let names: Vec<_> = records.iter().map(|r| r.first_name.as_str()).collect();
    assert_eq!(names, vec!["Ada", "Grace"]);
}

#[test]
fn run_respects_limit() {
    let temp = TempDir::new().expect("temp dir");
    let (source, results) = setup(&temp);
    let mut store = CheckpointStore::open(&source, &results).expect("open");

    let summary = store.run(Some(2), |_: &Contact| Outcome::NoNameMatch, |_| {});

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.no_name_match, 2);
    assert_eq!(summary.remaining, 1);
    assert_eq!(pending_emails(&source), vec!["alan@example.com"]);
}

#[test]
fn unwritable_results_keep_match_in_memory_and_contact_pending() {
    let temp = TempDir::new().expect("temp dir");
    let (source, results) = setup(&temp);
    let mut store = CheckpointStore::open(&source, &results).expect("open");

    fs::remove_file(&results).expect("remove results");
    fs::create_dir(&results).expect("block results path");

    let summary = store.run(
        Some(1),
        |contact: &Contact| matched(&contact.first_name, "5550100"),
        |report| assert_eq!(report.disposition, Disposition::Unsaved),
    );

    assert_eq!(summary.matched, 0);
    assert_eq!(summary.retry, 1);
    assert_eq!(summary.unsaved.len(), 1);
    assert_eq!(summary.unsaved[0].first_name, "Ada");
    assert!(!summary.source_stale);
    assert_eq!(pending_emails(&source).len(), 3);
}

fn nested_setup(temp: &TempDir) -> (PathBuf, PathBuf, PathBuf) {
    let dir = temp.path().join("input");
    fs::create_dir(&dir).expect("create input dir");
    let source = dir.join("contacts.csv");
    fs::write(&source, SOURCE).expect("write source");
    (dir, source, temp.path().join("result.csv"))
}

#[test]
fn failed_source_rewrite_is_retried_after_the_run() {
    let temp = TempDir::new().expect("temp dir");
    let (dir, source, results) = nested_setup(&temp);
    let moved = temp.path().join("moved");
    let mut store = CheckpointStore::open(&source, &results).expect("open");

    // The source directory disappears while Ada is processed, so her
    // removal cannot be written; it is back before the run ends.
    let summary = store.run(
        None,
        |contact: &Contact| match contact.first_name.as_str() {
            "Ada" => {
                fs::rename(&dir, &moved).expect("move source dir");
                Outcome::NoSnippets
            }
            "Grace" => {
                fs::rename(&moved, &dir).expect("restore source dir");
                Outcome::TransientError("offline".to_string())
            }
            _ => Outcome::TransientError("offline".to_string()),
        },
        |_| {},
    );

    assert_eq!(summary.no_snippets, 1);
    assert_eq!(summary.retry, 2);
    assert_eq!(summary.remaining, 2);
    assert!(!summary.source_stale);
    assert_eq!(
        pending_emails(&source),
        vec!["grace@example.com", "alan@example.com"]
    );
}

#[test]
fn source_left_stale_when_final_rewrite_fails() {
    let temp = TempDir::new().expect("temp dir");
    let (dir, source, results) = nested_setup(&temp);
    let moved = temp.path().join("moved");
    let mut store = CheckpointStore::open(&source, &results).expect("open");

    let summary = store.run(
        Some(1),
        |_: &Contact| {
            fs::rename(&dir, &moved).expect("move source dir");
            matched("Ada", "5550100")
        },
        |report| assert_eq!(report.disposition, Disposition::Saved),
    );

    assert_eq!(summary.matched, 1);
    assert_eq!(summary.remaining, 2);
    assert!(summary.source_stale);
    assert!(summary.unsaved.is_empty());
    assert_eq!(
        ResultsStore::read_existing(&results).expect("results").len(),
        1
    );
    assert_eq!(pending_emails(&moved.join("contacts.csv")).len(), 3);
}
