mod common;

use std::fs;
use std::path::Path;

use proptest::prelude::*;
use zetteldev_experiment::templates::quote::{python_str, snakemake_braces};
use zetteldev_experiment::{
    read_metadata, scaffold, ExperimentIdentity, ScaffoldError, ScaffoldPlan, EXPERIMENTS_DIR,
};

fn plan(name: &str) -> ScaffoldPlan {
    ScaffoldPlan::new(
        ExperimentIdentity::manual(name).expect("valid name"),
        "http://localhost:8000",
        "2026-10-16",
        None,
    )
    .expect("plan")
}

#[test]
fn test_manual_name_creates_fixed_tree() {
    let td = tempfile::tempdir().expect("tmpdir");
    let root = td.path().join(EXPERIMENTS_DIR);
    let out = scaffold(&root, &plan("my-test")).expect("scaffold my-test");
    assert_eq!(out.name, "my-test");
    assert_eq!(out.path, root.join("my-test"));

    let snap = common::snapshot(&out.path);
    let mut listed: Vec<String> = snap
        .keys()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .collect();
    listed.sort();
    assert_eq!(
        listed,
        vec![
            ".zetteldev",
            "Snakefile",
            "design.md",
            "design.org",
            "figures",
            "main.py",
            "processed_data",
            "report.qmd",
            "scratchpad_my-test.ipynb",
            "tests",
            "tests/test_my_test.py",
        ]
    );
    assert!(fs::read_dir(out.path.join("figures")).expect("figures").next().is_none());
    assert!(fs::read_dir(out.path.join("processed_data")).expect("data").next().is_none());
}

#[test]
fn test_name_appears_in_every_named_artifact() {
    let td = tempfile::tempdir().expect("tmpdir");
    let root = td.path().join(EXPERIMENTS_DIR);
    let out = scaffold(&root, &plan("my-test")).expect("scaffold");
    for f in [
        ".zetteldev",
        "design.md",
        "design.org",
        "main.py",
        "report.qmd",
        "Snakefile",
        "scratchpad_my-test.ipynb",
    ] {
        let text = fs::read_to_string(out.path.join(f)).expect("read");
        assert!(text.contains("my-test"), "{} does not mention my-test:\n{}", f, text);
        assert!(!text.contains("{{experiment_name}}"), "{} left a placeholder", f);
    }
    let snake = fs::read_to_string(out.path.join("Snakefile")).expect("read");
    assert!(snake.contains("quarto render report.qmd --output my-test.html"));
}

#[test]
fn test_basic_test_stub_references_name() {
    let td = tempfile::tempdir().expect("tmpdir");
    let root = td.path().join(EXPERIMENTS_DIR);
    let out = scaffold(&root, &plan("my-test")).expect("scaffold");
    let stub = fs::read_to_string(out.path.join("tests").join("test_my_test.py")).expect("stub");
    assert!(stub.contains("EXPERIMENT_NAME = \"my-test\""), "{}", stub);
    assert!(stub.contains("def test_my_test_sanity():"), "{}", stub);
    assert!(stub.contains("assert EXPERIMENT_NAME == \"my-test\""), "{}", stub);
}

#[test]
fn test_metadata_url_matches_report_url() {
    let td = tempfile::tempdir().expect("tmpdir");
    let root = td.path().join(EXPERIMENTS_DIR);
    let p = plan("roundtrip");
    let out = scaffold(&root, &p).expect("scaffold");
    let meta = read_metadata(&out.path).expect("metadata");
    let url = meta.get("url").expect("url key");
    let token = meta.get("token").expect("token key");
    assert_eq!(url, &out.url);
    assert_eq!(token, &out.token);
    assert_eq!(
        url,
        &format!("http://localhost:8000/experiments/roundtrip-{}", token)
    );
    let report = fs::read_to_string(out.path.join("report.qmd")).expect("report");
    let fm = common::front_matter(&report);
    assert_eq!(fm["experiment-url"].as_str(), Some(url.as_str()));
    assert_eq!(fm["title"].as_str(), Some("roundtrip Report"));
    assert!(report.contains(&format!("<{}>", url)));
    let nb = fs::read_to_string(out.path.join("scratchpad_roundtrip.ipynb")).expect("nb");
    assert!(nb.contains(url.as_str()));
}

#[test]
fn test_existing_name_fails_without_touching_disk() {
    let td = tempfile::tempdir().expect("tmpdir");
    let root = td.path().join(EXPERIMENTS_DIR);
    scaffold(&root, &plan("taken")).expect("first scaffold");
    fs::write(root.join("taken").join("main.py"), "edited by hand\n").expect("edit");
    let before = common::snapshot(td.path());

    let err = scaffold(&root, &plan("taken")).expect_err("second scaffold must fail");
    assert!(matches!(err, ScaffoldError::AlreadyExists(ref n) if n == "taken"));
    assert_eq!(common::snapshot(td.path()), before);
}

#[test]
fn test_existing_plain_file_counts_as_collision() {
    let td = tempfile::tempdir().expect("tmpdir");
    let root = td.path().join(EXPERIMENTS_DIR);
    fs::create_dir_all(&root).expect("mkdir");
    fs::write(root.join("notes"), "x").expect("write");
    let err = scaffold(&root, &plan("notes")).expect_err("collision");
    assert!(err.is_already_exists());
}

#[test]
fn test_experiments_root_is_created_on_demand() {
    let td = tempfile::tempdir().expect("tmpdir");
    let root = td.path().join("nested").join(EXPERIMENTS_DIR);
    assert!(!root.exists());
    scaffold(&root, &plan("first")).expect("scaffold");
    assert!(Path::new(&root).join("first").join("tests").is_dir());
}

#[test]
fn test_each_run_draws_a_new_token() {
    let td = tempfile::tempdir().expect("tmpdir");
    let root = td.path().join(EXPERIMENTS_DIR);
    let a = scaffold(&root, &plan("a")).expect("a");
    let b = scaffold(&root, &plan("b")).expect("b");
    assert_ne!(a.token, b.token);
    assert_eq!(a.token.len(), 16);
}

#[cfg(unix)]
#[test]
fn test_write_failure_leaves_no_partial_folder() {
    let td = tempfile::tempdir().expect("tmpdir");
    let root = td.path().join(EXPERIMENTS_DIR);
    // The folder itself is never created under this name; the test stub file name
    // exceeds the 255-byte component limit while the tree is being written.
    let long = "a".repeat(300);
    let err = scaffold(&root, &plan(&long)).expect_err("name too long for the file system");
    match &err {
        ScaffoldError::PartialWriteFailure { path, .. } => {
            assert!(path.starts_with(root.join(&long)), "{}", path.display());
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(fs::read_dir(&root).expect("read").count(), 0);
}

#[cfg(unix)]
#[test]
fn test_quoted_name_yields_well_formed_files() {
    let td = tempfile::tempdir().expect("tmpdir");
    let root = td.path().join(EXPERIMENTS_DIR);
    let out = scaffold(&root, &plan("a\"b")).expect("scaffold");

    let snake = fs::read_to_string(out.path.join("Snakefile")).expect("snakefile");
    assert!(snake.contains(r#"        "a\"b.html""#), "{}", snake);
    assert!(
        snake.contains(r#""quarto render report.qmd --output 'a\"b.html'""#),
        "{}",
        snake
    );

    let report = fs::read_to_string(out.path.join("report.qmd")).expect("report");
    assert_eq!(common::front_matter(&report)["title"].as_str(), Some("a\"b Report"));
    assert!(report.contains(r#"print("Hello from Quarto in " + "a\"b" + "!")"#));

    let main = fs::read_to_string(out.path.join("main.py")).expect("main");
    assert!(main.contains(r#"EXPERIMENT_NAME = "a\"b""#), "{}", main);
}

#[test]
fn test_braces_in_name_are_doubled_for_snakemake() {
    let td = tempfile::tempdir().expect("tmpdir");
    let root = td.path().join(EXPERIMENTS_DIR);
    let out = scaffold(&root, &plan("run{1}")).expect("scaffold");
    let snake = fs::read_to_string(out.path.join("Snakefile")).expect("snakefile");
    assert!(snake.contains(r#""run{{1}}.html""#), "{}", snake);
    assert!(snake.contains("--output 'run{{1}}.html'"), "{}", snake);
}

#[cfg(unix)]
const NAME_PATTERN: &str = "[A-Za-z0-9 ._'\"(){}\u{e9}\u{4e2d}-]{1,24}";
#[cfg(not(unix))]
const NAME_PATTERN: &str = "[A-Za-z0-9 ._'(){}\u{e9}\u{4e2d}-]{1,24}";

fn valid_name() -> impl Strategy<Value = String> {
    NAME_PATTERN.prop_filter("accepted as a manual name", |n| {
        ExperimentIdentity::manual(n).is_ok()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_any_valid_name_scaffolds_well_formed_tree(name in valid_name()) {
        let td = tempfile::tempdir().expect("tmpdir");
        let root = td.path().join(EXPERIMENTS_DIR);
        let p = plan(&name);
        let ident = p.identity().ident();
        let out = scaffold(&root, &p).expect("scaffold");

        let mut listed: Vec<String> = common::snapshot(&out.path)
            .keys()
            .map(|k| k.to_string_lossy().replace('\\', "/"))
            .collect();
        listed.sort();
        let mut expected: Vec<String> = [
            ".zetteldev",
            "Snakefile",
            "design.md",
            "design.org",
            "figures",
            "main.py",
            "processed_data",
            "report.qmd",
            "tests",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        expected.push(format!("scratchpad_{}.ipynb", name));
        expected.push(format!("tests/test_{}.py", ident));
        expected.sort();
        prop_assert_eq!(listed, expected);

        let read = |f: &str| fs::read_to_string(out.path.join(f)).expect("read");
        for f in ["design.md", "design.org", "main.py", "report.qmd"] {
            let text = read(f);
            prop_assert!(text.contains(name.as_str()), "{} misses {:?}", f, name);
        }
        let meta = read_metadata(&out.path).expect("metadata");
        prop_assert_eq!(meta.get("name").map(String::as_str), Some(name.as_str()));

        let literal = python_str(&name);
        let expected_line = format!("EXPERIMENT_NAME = {}", literal);
        prop_assert!(read("main.py").contains(&expected_line));
        let stub = read(&format!("tests/test_{}.py", ident));
        let expected_def = format!("def test_{}_sanity():", ident);
        prop_assert!(stub.contains(&expected_def));
        prop_assert!(stub.contains(&literal));
        prop_assert!(ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));

        let html = python_str(&snakemake_braces(&format!("{}.html", name)));
        prop_assert!(read("Snakefile").contains(&html), "Snakefile misses {}", html);

        let fm = common::front_matter(&read("report.qmd"));
        let title = format!("{} Report", name);
        prop_assert_eq!(fm["title"].as_str(), Some(title.as_str()));
        prop_assert_eq!(fm["experiment-url"].as_str(), meta.get("url").map(String::as_str));

        let nb_text = read(&format!("scratchpad_{}.ipynb", name));
        let nb: serde_json::Value = serde_json::from_str(&nb_text).expect("notebook json");
        let intro: String = nb["cells"][0]["source"]
            .as_array()
            .expect("source lines")
            .iter()
            .filter_map(serde_json::Value::as_str)
            .collect();
        prop_assert!(intro.contains(name.as_str()));
    }
}
