// Integration tests for the tqa binary: exit codes, --json stdout, CSV output.
//
// Run with: cargo test -p transqa-cli --test cli_tests -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn tqa() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tqa"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("TQA_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    tqa().args(args).output().expect("run tqa")
}

fn s(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn json_stdout(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout must be one JSON value: {e}\n{stdout}"))
}

const SOURCE: &str = "The meeting starts at nine. Please bring your report. Thank you all.";

// ===========================================================================
// tqa check
// ===========================================================================

#[test]
fn identical_texts_pass() {
    let dir = TempDir::new().unwrap();
    let src = write(&dir, "src.txt", SOURCE);
    let tgt = write(&dir, "tgt.txt", SOURCE);

    let output = run(&["check", s(&src), s(&tgt), "--json", "--strict-exit"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report = json_stdout(&output);
    assert_eq!(report["summary"]["total_issues"], 0);
    assert_eq!(report["summary"]["kept_groups"], 3);
    assert_eq!(report["meta"]["source_sentences"], 3);
    assert_eq!(report["rows"].as_array().unwrap().len(), 3);
    assert!(stderr(&output).contains("0 omission(s), 0 addition(s)"));
}

#[test]
fn strict_exit_reports_issues() {
    let dir = TempDir::new().unwrap();
    let src = write(&dir, "src.txt", SOURCE);
    let tgt = write(&dir, "tgt.txt", &format!("{SOURCE} An extra closing remark."));

    let output = run(&["check", s(&src), s(&tgt), "--json", "--strict-exit"]);
    assert_eq!(output.status.code(), Some(1));

    let report = json_stdout(&output);
    assert_eq!(report["summary"]["addition_count"], 1);
    assert_eq!(report["issues"][0]["type"], "addition");
    assert_eq!(report["issues"][0]["tgt_index"], 3);
    assert!(stderr(&output).contains("1 issue(s) found"));
}

#[test]
fn issues_without_strict_exit_succeed() {
    let dir = TempDir::new().unwrap();
    let src = write(&dir, "src.txt", SOURCE);
    let tgt = write(&dir, "tgt.txt", "The meeting starts at nine.");

    let output = run(&["check", s(&src), s(&tgt), "--quiet"]);
    assert!(output.status.success());
    assert!(stderr(&output).is_empty());
}

#[test]
fn csv_to_stdout() {
    let dir = TempDir::new().unwrap();
    let src = write(&dir, "src.txt", SOURCE);
    let tgt = write(&dir, "tgt.txt", SOURCE);

    let output = run(&["check", s(&src), s(&tgt), "--csv", "-", "-q"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "source,target,source_index,target_index,similarity,exception");
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("The meeting starts at nine.,The meeting starts at nine.,0,0,"));
    assert!(lines[1].ends_with(",OK"));
}

#[test]
fn csv_and_json_files() {
    let dir = TempDir::new().unwrap();
    let src = write(&dir, "src.txt", SOURCE);
    let tgt = write(&dir, "tgt.txt", SOURCE);
    let csv = dir.path().join("out.csv");
    let json = dir.path().join("out.json");

    let output = run(&["check", s(&src), s(&tgt), "--csv", s(&csv), "--output", s(&json)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(output.stdout.is_empty());

    let csv_text = std::fs::read_to_string(&csv).unwrap();
    assert_eq!(csv_text.lines().count(), 4);
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(report["meta"]["config_name"], "translation-audit");
}

#[test]
fn json_and_csv_stdout_conflict() {
    let dir = TempDir::new().unwrap();
    let src = write(&dir, "src.txt", SOURCE);
    let output = run(&["check", s(&src), s(&src), "--json", "--csv", "-"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("hint:"));
}

#[test]
fn alignment_and_embeddings_files() {
    let dir = TempDir::new().unwrap();
    let src = write(&dir, "src.txt", "A.\nB.\n");
    let tgt = write(&dir, "tgt.txt", "a.\n");
    let alignment = write(&dir, "groups.json", "[[[0, 1], [0]]]");
    let vectors = write(
        &dir,
        "vectors.json",
        r#"{"A.": [1.0, 0.0], "B.": [1.0, 0.0], "a.": [0.5, 0.8660254]}"#,
    );

    let output = run(&[
        "check",
        s(&src),
        s(&tgt),
        "--presplit",
        "--alignment",
        s(&alignment),
        "--embeddings",
        s(&vectors),
        "--json",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report = json_stdout(&output);
    assert_eq!(report["summary"]["low_similarity_count"], 1);
    assert_eq!(report["summary"]["omission_count"], 0);
    assert_eq!(report["summary"]["addition_count"], 0);
    assert_eq!(report["issues"][0]["src_indices"], serde_json::json!([0, 1]));
    assert_eq!(report["rows"][0]["exception"], "low_similarity");
    assert!(report["rows"][1]["exception"].is_null());
}

#[test]
fn threshold_flags_override_defaults() {
    let dir = TempDir::new().unwrap();
    let src = write(&dir, "src.txt", "A.\nB.\n");
    let tgt = write(&dir, "tgt.txt", "a.\n");
    let alignment = write(&dir, "groups.json", r#"[{"src": [0, 1], "tgt": [0]}]"#);
    let vectors = write(
        &dir,
        "vectors.json",
        r#"{"A.": [1.0, 0.0], "B.": [1.0, 0.0], "a.": [0.5, 0.8660254]}"#,
    );

    let output = run(&[
        "check",
        s(&src),
        s(&tgt),
        "--presplit",
        "--alignment",
        s(&alignment),
        "--embeddings",
        s(&vectors),
        "--force-split-threshold",
        "0.6",
        "--policy",
        "min-pairwise",
        "--label-policy",
        "every-row",
        "--json",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report = json_stdout(&output);
    assert_eq!(report["meta"]["policy"], "min_pairwise");
    assert_eq!(report["meta"]["label_policy"], "every_row");
    assert_eq!(report["summary"]["force_split_count"], 1);
    assert_eq!(report["summary"]["omission_count"], 2);
    assert_eq!(report["summary"]["addition_count"], 1);
}

#[test]
fn config_table_path_is_relative_to_config() {
    let dir = TempDir::new().unwrap();
    let src = write(&dir, "src.txt", "A.\n");
    let tgt = write(&dir, "tgt.txt", "a.\n");
    write(&dir, "vectors.json", r#"{"A.": [1.0, 0.0], "a.": [0.9, 0.1]}"#);
    let config = write(
        &dir,
        "audit.toml",
        "name = \"relative\"\n\n[embedder]\nkind = \"table\"\ntable = \"vectors.json\"\n",
    );

    let output = run(&[
        "check",
        s(&src),
        s(&tgt),
        "--presplit",
        "--config",
        s(&config),
        "--json",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report = json_stdout(&output);
    assert_eq!(report["meta"]["config_name"], "relative");
    assert_eq!(report["summary"]["total_issues"], 0);
}

// ===========================================================================
// Exit codes
// ===========================================================================

#[test]
fn invalid_config_exits_60() {
    let dir = TempDir::new().unwrap();
    let src = write(&dir, "src.txt", SOURCE);
    let config = write(&dir, "bad.toml", "[thresholds]\nsimilarity = 3.0\n");

    let output = run(&["check", s(&src), s(&src), "--config", s(&config)]);
    assert_eq!(output.status.code(), Some(60));
    assert!(stderr(&output).contains("thresholds.similarity"));
}

#[test]
fn threshold_flag_out_of_range_exits_60() {
    let dir = TempDir::new().unwrap();
    let src = write(&dir, "src.txt", SOURCE);
    let output = run(&["check", s(&src), s(&src), "--similarity-threshold", "-1.5"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn empty_input_exits_61() {
    let dir = TempDir::new().unwrap();
    let src = write(&dir, "src.txt", "   \n");
    let tgt = write(&dir, "tgt.txt", SOURCE);

    let output = run(&["check", s(&src), s(&tgt)]);
    assert_eq!(output.status.code(), Some(61));
    assert!(stderr(&output).contains("source text is empty"));
}

#[test]
fn missing_input_file_exits_61() {
    let output = run(&["check", "/nonexistent/src.txt", "/nonexistent/tgt.txt"]);
    assert_eq!(output.status.code(), Some(61));
}

#[test]
fn malformed_alignment_exits_61() {
    let dir = TempDir::new().unwrap();
    let src = write(&dir, "src.txt", SOURCE);
    let alignment = write(&dir, "groups.json", "{not json");
    let output = run(&["check", s(&src), s(&src), "--alignment", s(&alignment)]);
    assert_eq!(output.status.code(), Some(61));
}

#[test]
fn contract_violation_exits_62() {
    let dir = TempDir::new().unwrap();
    let src = write(&dir, "src.txt", SOURCE);
    let alignment = write(&dir, "groups.json", "[[[0], [0]], [[0], [1]]]");

    let output = run(&["check", s(&src), s(&src), "--alignment", s(&alignment)]);
    assert_eq!(output.status.code(), Some(62));
    let err = stderr(&output);
    assert!(err.contains("alignment group 1"), "stderr: {err}");
    assert!(err.contains("hint:"));
}

#[test]
fn out_of_range_alignment_exits_62() {
    let dir = TempDir::new().unwrap();
    let src = write(&dir, "src.txt", SOURCE);
    let alignment = write(&dir, "groups.json", "[[[0], [9]]]");
    let output = run(&["check", s(&src), s(&src), "--alignment", s(&alignment)]);
    assert_eq!(output.status.code(), Some(62));
}

#[test]
fn missing_embedding_exits_63() {
    let dir = TempDir::new().unwrap();
    let src = write(&dir, "src.txt", "A.\n");
    let tgt = write(&dir, "tgt.txt", "b.\n");
    let vectors = write(&dir, "vectors.json", r#"{"A.": [1.0, 0.0]}"#);

    let output = run(&[
        "check",
        s(&src),
        s(&tgt),
        "--presplit",
        "--embeddings",
        s(&vectors),
    ]);
    assert_eq!(output.status.code(), Some(63));
    assert!(stderr(&output).contains("no embedding for \"b.\""));
}

#[test]
fn unknown_policy_is_usage_error() {
    let output = run(&["check", "a.txt", "b.txt", "--policy", "strictest"]);
    assert_eq!(output.status.code(), Some(2));
}

// ===========================================================================
// tqa split / tqa validate
// ===========================================================================

#[test]
fn split_prints_numbered_lines() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "text.txt", "First one. Second one?\nThird!");

    let output = run(&["split", s(&file)]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec!["0\tFirst one.", "1\tSecond one?", "2\tThird!"]
    );
}

#[test]
fn split_json_chinese() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "zh.txt", "今天天气很好。我们去公园吧！");

    let output = run(&["split", s(&file), "--lang", "zh", "--json"]);
    assert!(output.status.success());
    assert_eq!(json_stdout(&output), serde_json::json!(["今天天气很好", "我们去公园吧"]));
}

#[test]
fn validate_accepts_good_config() {
    let dir = TempDir::new().unwrap();
    let config = write(
        &dir,
        "audit.toml",
        "name = \"nightly\"\n\n[scoring]\npolicy = \"min_pairwise\"\nauto_split = true\n",
    );

    let output = run(&["validate", s(&config)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let err = stderr(&output);
    assert!(err.contains("valid: audit 'nightly'"));
    assert!(err.contains("policy min_pairwise"));
}

#[test]
fn validate_rejects_bad_config() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "audit.toml", "[embedder]\nkind = \"table\"\n");
    let output = run(&["validate", s(&config)]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn version_mentions_engine() {
    let output = run(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("tqa "));
}
