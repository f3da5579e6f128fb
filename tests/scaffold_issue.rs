mod common;

use std::fs;

use zetteldev_experiment::{
    resolve, scaffold, IssueChoice, IssueRecord, Prompter, Resolution, ResolveContext,
    ScaffoldError, ScaffoldPlan, StaticIssueSource, TargetInput, EXPERIMENTS_DIR,
};

struct NoPrompt;

impl Prompter for NoPrompt {
    fn choose_issue(&mut self, _issues: &[IssueRecord]) -> Result<IssueChoice, ScaffoldError> {
        panic!("must not prompt");
    }
    fn ask_name(&mut self) -> Result<String, ScaffoldError> {
        panic!("must not prompt");
    }
}

#[test]
fn test_issue_number_resolves_and_embeds_issue() {
    let td = tempfile::tempdir().expect("tmpdir");
    let root = td.path().join(EXPERIMENTS_DIR);
    let src = StaticIssueSource::new(vec![
        common::issue(42, "Fix bug!!", "The parser drops {braces}."),
        common::issue(43, "Other", ""),
    ]);
    let ctx = ResolveContext {
        experiments_root: &root,
        issues: &src,
        interactive: false,
    };
    let identity = match resolve(&TargetInput::parse(Some("42")), &ctx, &mut NoPrompt) {
        Ok(Resolution::Resolved(id)) => id,
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(identity.name(), "42-fix-bug");

    let plan = ScaffoldPlan::new(identity, "http://localhost:8000", "2026-10-16", None)
        .expect("plan");
    let out = scaffold(&root, &plan).expect("scaffold");
    assert_eq!(out.path, root.join("42-fix-bug"));

    let md = fs::read_to_string(out.path.join("design.md")).expect("design.md");
    assert!(md.contains("Issue #42: Fix bug!!"), "{}", md);
    assert!(md.contains("The parser drops {braces}."), "{}", md);
    assert!(md.contains("Link: #42"), "{}", md);
    let org = fs::read_to_string(out.path.join("design.org")).expect("design.org");
    assert!(org.contains("* Issue #42: Fix bug!!"), "{}", org);
    assert!(out.path.join("tests").join("test_42_fix_bug.py").is_file());
    assert!(out.path.join("scratchpad_42-fix-bug.ipynb").is_file());
}

#[test]
fn test_issue_already_scaffolded_aborts_before_any_write() {
    let td = tempfile::tempdir().expect("tmpdir");
    let root = td.path().join(EXPERIMENTS_DIR);
    fs::create_dir_all(root.join("42-old-title")).expect("mkdir");
    let before = common::snapshot(td.path());
    let src = StaticIssueSource::new(vec![common::issue(42, "Fix bug!!", "")]);
    let ctx = ResolveContext {
        experiments_root: &root,
        issues: &src,
        interactive: false,
    };
    let err = resolve(&TargetInput::Issue(42), &ctx, &mut NoPrompt).expect_err("exists");
    assert!(err.is_already_exists(), "{:?}", err);
    assert!(err.to_string().contains("42-old-title"));
    assert_eq!(common::snapshot(td.path()), before);
}

#[test]
fn test_unknown_issue_is_not_found() {
    let td = tempfile::tempdir().expect("tmpdir");
    let src = StaticIssueSource::new(vec![common::issue(1, "One", "")]);
    let ctx = ResolveContext {
        experiments_root: td.path(),
        issues: &src,
        interactive: false,
    };
    assert!(matches!(
        resolve(&TargetInput::Issue(999), &ctx, &mut NoPrompt),
        Err(ScaffoldError::NotFound(999))
    ));
}

#[test]
fn test_non_interactive_listing_excludes_scaffolded_issues() {
    let td = tempfile::tempdir().expect("tmpdir");
    let root = td.path().join(EXPERIMENTS_DIR);
    fs::create_dir_all(root.join("7-already-done")).expect("mkdir");
    let before = common::snapshot(td.path());
    let src = StaticIssueSource::new(vec![
        common::issue(7, "Already done", ""),
        common::issue(8, "Still open", ""),
    ]);
    let ctx = ResolveContext {
        experiments_root: &root,
        issues: &src,
        interactive: false,
    };
    match resolve(&TargetInput::None, &ctx, &mut NoPrompt).expect("listing") {
        Resolution::Listed(issues) => {
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].number, 8);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(common::snapshot(td.path()), before);
}

#[test]
fn test_listing_with_unavailable_tracker_is_empty() {
    let td = tempfile::tempdir().expect("tmpdir");
    let src = StaticIssueSource::unavailable();
    let ctx = ResolveContext {
        experiments_root: td.path(),
        issues: &src,
        interactive: false,
    };
    assert_eq!(
        resolve(&TargetInput::None, &ctx, &mut NoPrompt).expect("listing"),
        Resolution::Listed(Vec::new())
    );
}
