use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn dirseek() -> Command {
    Command::cargo_bin("dirseek").expect("dirseek binary")
}

fn parse_jsonl(stdout: &[u8]) -> Vec<Value> {
    let s = String::from_utf8_lossy(stdout);
    s.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str::<Value>(l).expect("valid jsonl line"))
        .collect()
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// root/{a.txt, sub/{a.txt, b.txt}}
fn sample(root: &Path) -> PathBuf {
    write_file(&root.join("a.txt"), "a");
    write_file(&root.join("sub/a.txt"), "a");
    write_file(&root.join("sub/b.txt"), "b");
    root.canonicalize().unwrap()
}

fn sorted_paths(items: &[Value]) -> Vec<String> {
    let mut paths: Vec<String> = items
        .iter()
        .map(|v| v["path"].as_str().unwrap().to_string())
        .collect();
    paths.sort();
    paths
}

fn path_str(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn non_recursive_matches_only_root_entries() {
    let temp = tempdir().unwrap();
    let root = sample(temp.path());

    let assert = dirseek()
        .args(["--format", "jsonl", "a.txt"])
        .arg(&root)
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);

    assert_eq!(sorted_paths(&items), vec![path_str(root.join("a.txt"))]);
}

#[test]
fn recursive_matches_nested_entries() {
    let temp = tempdir().unwrap();
    let root = sample(temp.path());

    let assert = dirseek()
        .args(["-R", "--format", "jsonl", "a.txt"])
        .arg(&root)
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);

    assert_eq!(
        sorted_paths(&items),
        vec![path_str(root.join("a.txt")), path_str(root.join("sub/a.txt"))]
    );
}

#[test]
fn line_output_format() {
    let temp = tempdir().unwrap();
    let root = sample(temp.path());
    let expected = format!("1 : a.txt : {}\n", root.join("a.txt").display());

    dirseek()
        .arg("a.txt")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::diff(expected));
}

#[test]
fn line_output_tags_nested_matches_with_another_worker() {
    let temp = tempdir().unwrap();
    let root = sample(temp.path());

    let assert = dirseek().args(["-R", "b.txt"]).arg(&root).assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();

    let fields: Vec<&str> = stdout.trim_end().split(" : ").collect();
    assert_eq!(fields.len(), 3);
    assert_ne!(fields[0], "1");
    assert_eq!(fields[1], "b.txt");
    assert_eq!(fields[2], root.join("sub/b.txt").display().to_string());
}

#[test]
fn ignore_case_flag() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("FILE.TXT"), "x");
    let root = temp.path().canonicalize().unwrap();

    dirseek()
        .arg("file.txt")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    dirseek()
        .args(["-i", "file.txt"])
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains(" : FILE.TXT : "));
}

#[test]
fn combined_flags_in_either_order() {
    let temp = tempdir().unwrap();
    let root = sample(temp.path());

    for flags in ["-Ri", "-iR"] {
        let assert = dirseek()
            .args([flags, "--format", "jsonl", "A.TXT"])
            .arg(&root)
            .assert()
            .success();
        let items = parse_jsonl(&assert.get_output().stdout);
        assert_eq!(items.len(), 2, "flags {flags}");
    }
}

#[test]
fn relative_path_is_resolved() {
    let temp = tempdir().unwrap();
    let root = sample(temp.path());

    let assert = dirseek()
        .current_dir(&root)
        .args(["--format", "jsonl", "b.txt", "sub"])
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);

    assert_eq!(sorted_paths(&items), vec![path_str(root.join("sub/b.txt"))]);
}

#[test]
fn path_option_allows_names_with_separators() {
    let temp = tempdir().unwrap();
    let root = sample(temp.path());

    dirseek()
        .arg("--path")
        .arg(&root)
        .args(["sub/a.txt", "a.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains(" : a.txt : ").count(1));
}

#[test]
fn empty_target_set_matches_nothing() {
    let temp = tempdir().unwrap();
    let root = sample(temp.path());

    dirseek()
        .args(["-R", "-i"])
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn file_as_root_matches_nothing() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("plain.txt");
    write_file(&file, "not a directory");

    dirseek()
        .args(["-R", "plain.txt"])
        .arg(&file)
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

#[cfg(unix)]
#[test]
fn unreadable_root_matches_nothing() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempdir().unwrap();
    let root = sample(temp.path());
    fs::set_permissions(&root, fs::Permissions::from_mode(0o000)).unwrap();
    // Privileged users read through mode bits; nothing to check then
    let readable = fs::read_dir(&root).is_ok();

    let output = dirseek()
        .args(["-R", "a.txt"])
        .arg(&root)
        .output()
        .unwrap();
    fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();

    if readable {
        return;
    }
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
}

#[test]
fn missing_path_is_an_error() {
    let temp = tempdir().unwrap();

    dirseek()
        .arg("a.txt")
        .arg(temp.path().join("does-not-exist"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot resolve search path"));
}

#[test]
fn unknown_options_are_reported_and_ignored() {
    let temp = tempdir().unwrap();
    let root = sample(temp.path());

    let assert = dirseek()
        .args(["-Rx", "--bogus", "--format", "jsonl", "a.txt"])
        .arg(&root)
        .assert()
        .success()
        .stderr(predicate::str::contains("unknown option: -x"))
        .stderr(predicate::str::contains("unknown option: --bogus"));
    let items = parse_jsonl(&assert.get_output().stdout);

    assert_eq!(items.len(), 2);
}

#[test]
fn verbose_reports_summary_on_stderr() {
    let temp = tempdir().unwrap();
    let root = sample(temp.path());

    dirseek()
        .args(["-R", "-v", "a.txt"])
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains(" : a.txt : ").count(2))
        .stderr(predicate::str::contains("search finished"));
}

#[test]
fn default_run_is_quiet_on_stderr() {
    let temp = tempdir().unwrap();
    let root = sample(temp.path());

    dirseek()
        .args(["-R", "a.txt"])
        .arg(&root)
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn fanout_schedule_finds_the_same_matches() {
    let temp = tempdir().unwrap();
    let root = temp.path().canonicalize().unwrap();
    for dir in ["a", "b", "c", "a/aa", "b/bb/bbb"] {
        write_file(&root.join(dir).join("hit"), "");
    }

    let run = |extra: &[&str]| {
        let assert = dirseek()
            .args(["-R", "--format", "jsonl"])
            .args(extra)
            .arg("hit")
            .arg(&root)
            .assert()
            .success();
        sorted_paths(&parse_jsonl(&assert.get_output().stdout))
    };

    let sequential = run(&[]);
    assert_eq!(sequential.len(), 5);
    assert_eq!(sequential, run(&["--fanout"]));
}
