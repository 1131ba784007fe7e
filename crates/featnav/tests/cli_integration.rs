//! Integration tests that run the featnav binary

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn featnav_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_featnav"))
}

/// A project with a config file, one tagged source file and two features
fn create_project() -> TempDir {
    let temp = tempfile::tempdir().expect("Failed to create temp dir");
    let root = temp.path();

    write(
        root,
        ".config/featnav/config.json",
        r#"{
            "tagPattern": "TAG:(\\d+)",
            "searchPattern": "**/*${caseNumber}*.feature",
            "relativeRoot": "features"
        }"#,
    );
    write(root, "src/login.ts", "function login() {}\n// TAG:42\n// TAG:7\n");
    write(
        root,
        "features/login-42.feature",
        "Feature: Login\n  Scenario: works\n",
    );
    write(
        root,
        "features/session.feature",
        "# covers TAG:42\nFeature: Session\n",
    );

    temp
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).expect("Failed to create dir");
    std::fs::write(path, content).expect("Failed to write file");
}

fn find(project: &TempDir, extra: &[&str]) -> Output {
    featnav_bin()
        .current_dir(project.path())
        .arg("--root")
        .arg(project.path())
        .arg("find")
        .arg("src/login.ts")
        .args(extra)
        .output()
        .expect("Failed to run featnav")
}

fn json_paths(output: &Output) -> Vec<String> {
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let mut paths: Vec<String> = value
        .as_array()
        .expect("JSON output should be an array")
        .iter()
        .map(|m| m["path"].as_str().unwrap().to_string())
        .collect();
    paths.sort();
    paths
}

#[test]
fn test_find_by_filename() {
    let project = create_project();
    let output = find(&project, &["--line", "2", "--column", "5", "--json"]);

    assert!(
        output.status.success(),
        "Command should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let paths = json_paths(&output);
    assert_eq!(paths.len(), 1, "Only the filename match: {:?}", paths);
    assert!(paths[0].ends_with("login-42.feature"));
}

#[test]
fn test_find_with_content_search() {
    let project = create_project();
    let output = find(
        &project,
        &["--line", "2", "--column", "5", "--json", "--search-in-content"],
    );

    assert!(output.status.success());
    let paths = json_paths(&output);
    assert_eq!(paths.len(), 2, "Filename and content matches: {:?}", paths);
    assert!(paths.iter().any(|p| p.ends_with("login-42.feature")));
    assert!(paths.iter().any(|p| p.ends_with("session.feature")));
}

#[test]
fn test_find_text_output() {
    let project = create_project();
    let output = find(&project, &["--line", "2", "--column", "5"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("filename"), "Should label the match: {}", stdout);
    assert!(
        stdout.contains("features/login-42.feature"),
        "Should print the path relative to the root: {}",
        stdout
    );
}

#[test]
fn test_cursor_outside_tag() {
    let project = create_project();
    let output = find(&project, &["--line", "1", "--column", "3", "--json"]);

    assert!(output.status.success());
    assert!(json_paths(&output).is_empty());
}

#[test]
fn test_nothing_found() {
    let project = create_project();
    let output = find(&project, &["--line", "3", "--column", "5", "--json"]);

    assert!(output.status.success());
    assert!(json_paths(&output).is_empty());
}

#[test]
fn test_invalid_pattern_fails() {
    let project = create_project();
    let output = find(
        &project,
        &["--line", "2", "--column", "5", "--tag-pattern", "TAG:(\\d+"],
    );

    assert!(!output.status.success(), "Invalid pattern should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid tagPattern regex"),
        "Should show the pattern message: {}",
        stderr
    );
}

#[test]
fn test_missing_tag_pattern_fails() {
    let temp = tempfile::tempdir().expect("Failed to create temp dir");
    write(temp.path(), "src/login.ts", "// TAG:42\n");

    let output = featnav_bin()
        .current_dir(temp.path())
        .arg("--root")
        .arg(temp.path())
        .args(["find", "src/login.ts", "--line", "1", "--column", "5"])
        .output()
        .expect("Failed to run featnav");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--tag-pattern"), "Should hint at the fix: {}", stderr);
}

#[test]
fn test_line_past_end_fails() {
    let project = create_project();
    let output = find(&project, &["--line", "40", "--column", "1"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("has no line 40"), "stderr: {}", stderr);
}
