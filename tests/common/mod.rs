#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use zetteldev_experiment::IssueRecord;

pub fn issue(number: u64, title: &str, body: &str) -> IssueRecord {
    IssueRecord {
        number,
        title: title.to_string(),
        body: body.to_string(),
    }
}

/// Every file and directory under `root` (relative path -> file contents, or None for dirs).
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
    fn walk(base: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Option<Vec<u8>>>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let p = entry.path();
            let rel = p.strip_prefix(base).expect("under base").to_path_buf();
            if p.is_dir() {
                out.insert(rel, None);
                walk(base, &p, out);
            } else {
                out.insert(rel, Some(fs::read(&p).expect("read file")));
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

/// Parse the YAML front matter at the top of a Quarto document.
pub fn front_matter(report: &str) -> serde_yaml::Value {
    let rest = report.strip_prefix("---\n").expect("front matter opener");
    let end = rest.find("\n---\n").expect("front matter closer");
    serde_yaml::from_str(&rest[..end]).expect("front matter is valid yaml")
}

/// Write an executable stand-in for `gh` that serves `issues` for `issue list` / `issue view`.
#[cfg(unix)]
pub fn write_fake_gh(dir: &Path, issues: &[IssueRecord]) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let list = serde_json::to_string(issues).expect("issues json");
    let mut views = String::new();
    for i in issues {
        views.push_str(&format!(
            "    {}) cat <<'JSON'\n{}\nJSON\n    ;;\n",
            i.number,
            serde_json::to_string(i).expect("issue json")
        ));
    }
    let script = format!(
        "#!/bin/sh\nif [ \"$1\" = issue ] && [ \"$2\" = list ]; then\n  cat <<'JSON'\n{list}\nJSON\n  exit 0\nfi\nif [ \"$1\" = issue ] && [ \"$2\" = view ]; then\n  case \"$3\" in\n{views}    *) echo \"GraphQL: Could not resolve to an issue with the number of $3.\" >&2; exit 1 ;;\n  esac\n  exit 0\nfi\nexit 2\n"
    );
    let path = dir.join("fake-gh");
    fs::write(&path, script).expect("write fake gh");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake gh");
    path
}
