use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn fixture_path(rel: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(rel)
}

fn spawn_sidecar(args: &[&str]) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradebookd");
    let mut child = Command::new(exe)
        .args(args)
        .env_remove("GRADEBOOKD_MARK_POLICY")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradebookd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> Option<&str> {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
}

fn load_fixture_roster(stdin: &mut ChildStdin, reader: &mut BufReader<ChildStdout>) {
    let roster: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(fixture_path("fixtures/roster.json")).expect("read roster"),
    )
    .expect("parse roster");
    let _ = request_ok(stdin, reader, "load", "session.load", roster);
}

fn add_assessment(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    name: &str,
    max_score: f64,
) -> String {
    let result = request_ok(
        stdin,
        reader,
        &format!("add-{name}"),
        "assessments.add",
        json!({ "subjectId": "math-10a", "name": name, "maxScore": max_score }),
    );
    result["assessment"]["id"]
        .as_str()
        .expect("assessment id")
        .to_string()
}

#[test]
fn ignore_policy_leaves_matrix_unchanged_on_bad_writes() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&[]);
    load_fixture_roster(&mut stdin, &mut reader);
    let final_id = add_assessment(&mut stdin, &mut reader, "Final", 100.0);

    let before = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "marks.get",
        json!({ "studentId": "s1", "assessmentId": final_id }),
    );
    assert_eq!(before["score"], json!(null));
    assert_eq!(before["percent"], json!("unscored"));
    assert_eq!(before["grade"], json!(null));

    let too_big = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "set-mark",
        json!({ "studentId": "s1", "assessmentId": final_id, "value": "150" }),
    );
    assert_eq!(too_big["stored"], json!(false));
    assert_eq!(too_big["ignored"], json!("mark_out_of_range"));

    let garbage = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "marks.set",
        json!({ "studentId": "s1", "assessmentId": final_id, "value": "ninety" }),
    );
    assert_eq!(garbage["ignored"], json!("mark_parse_failed"));

    let after = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "marks.percentage",
        json!({ "studentId": "s1", "assessmentId": final_id }),
    );
    assert_eq!(after["percent"], json!("unscored"));

    let saved = request_ok(&mut stdin, &mut reader, "5", "save-marks", json!({}));
    assert_eq!(saved["saved"], json!(0));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn valid_writes_store_overwrite_and_derive_grades() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&[]);
    load_fixture_roster(&mut stdin, &mut reader);
    let quiz_id = add_assessment(&mut stdin, &mut reader, "Quiz", 30.0);

    let stored = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "marks.set",
        json!({ "studentId": "s2", "assessmentId": quiz_id, "value": " 27 " }),
    );
    assert_eq!(stored["stored"], json!(true));
    assert_eq!(stored["mark"]["score"], json!(27.0));
    assert_eq!(stored["percent"], json!(90.0));
    assert_eq!(stored["grade"], json!("A+"));

    let overwritten = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "set-mark",
        json!({ "studentId": "s2", "assessmentId": quiz_id, "value": 20 }),
    );
    assert_eq!(overwritten["percent"], json!(66.7));
    assert_eq!(overwritten["grade"], json!("B"));

    let zero = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "marks.set",
        json!({ "studentId": "s3", "assessmentId": quiz_id, "value": 0 }),
    );
    assert_eq!(zero["percent"], json!(0.0));
    assert_eq!(zero["grade"], json!("F"));

    let full = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "marks.set",
        json!({ "studentId": "s4", "assessmentId": quiz_id, "value": 30 }),
    );
    assert_eq!(full["percent"], json!(100.0));

    let saved = request_ok(&mut stdin, &mut reader, "5", "marks.saveAll", json!({}));
    assert_eq!(saved["saved"], json!(3));
    assert!(saved["savedAt"].is_string());

    // Saving is a confirmation only; the marks stay where they are.
    let still = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "marks.get",
        json!({ "studentId": "s2", "assessmentId": quiz_id }),
    );
    assert_eq!(still["score"], json!(20.0));

    let grid = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "marks.grid",
        json!({ "subjectId": "math-10a" }),
    );
    let rows = grid["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["studentId"], json!("s1"));
    assert_eq!(rows[0]["cells"], json!([null]));
    assert_eq!(rows[1]["cells"][0]["grade"], json!("B"));

    let filtered = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "marks.grid",
        json!({ "subjectId": "math-10a", "query": "st004" }),
    );
    let rows = filtered["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["cells"][0]["score"], json!(30.0));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn reject_policy_reports_bad_writes_as_errors() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&["--mark-policy", "reject"]);
    load_fixture_roster(&mut stdin, &mut reader);
    let quiz_id = add_assessment(&mut stdin, &mut reader, "Quiz", 100.0);

    let health = request_ok(&mut stdin, &mut reader, "h", "health", json!({}));
    assert_eq!(health["markPolicy"], json!("reject"));

    let too_big = request(
        &mut stdin,
        &mut reader,
        "1",
        "set-mark",
        json!({ "studentId": "s1", "assessmentId": quiz_id, "value": "150" }),
    );
    assert_eq!(error_code(&too_big), Some("mark_out_of_range"));
    assert_eq!(too_big["error"]["details"]["maxScore"], json!(100.0));

    let blank = request(
        &mut stdin,
        &mut reader,
        "2",
        "set-mark",
        json!({ "studentId": "s1", "assessmentId": quiz_id, "value": "" }),
    );
    assert_eq!(error_code(&blank), Some("mark_parse_failed"));

    let missing_value = request(
        &mut stdin,
        &mut reader,
        "3",
        "set-mark",
        json!({ "studentId": "s1", "assessmentId": quiz_id }),
    );
    assert_eq!(error_code(&missing_value), Some("mark_parse_failed"));

    let cell = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "marks.get",
        json!({ "studentId": "s1", "assessmentId": quiz_id }),
    );
    assert_eq!(cell["score"], json!(null));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn unknown_ids_are_not_found_under_either_policy() {
    for policy in ["ignore", "reject"] {
        let (mut child, mut stdin, mut reader) = spawn_sidecar(&["--mark-policy", policy]);
        load_fixture_roster(&mut stdin, &mut reader);
        let quiz_id = add_assessment(&mut stdin, &mut reader, "Quiz", 10.0);

        let who = request(
            &mut stdin,
            &mut reader,
            "1",
            "marks.set",
            json!({ "studentId": "s99", "assessmentId": quiz_id, "value": 5 }),
        );
        assert_eq!(error_code(&who), Some("not_found"), "{policy}");

        let what = request(
            &mut stdin,
            &mut reader,
            "2",
            "marks.get",
            json!({ "studentId": "s1", "assessmentId": "nope" }),
        );
        assert_eq!(error_code(&what), Some("not_found"), "{policy}");
        assert_eq!(what["error"]["details"]["entity"], json!("assessment"));

        drop(stdin);
        let _ = child.wait();
    }
}

#[test]
fn grade_bands_at_the_boundaries() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&[]);

    for (i, (percent, grade)) in [
        (json!(90), "A+"),
        (json!(89.9), "A"),
        (json!(40), "C"),
        (json!(39.9), "F"),
        (json!("75"), "B+"),
        (json!(120), "A+"),
        (json!(-3), "F"),
    ]
    .into_iter()
    .enumerate()
    {
        let result = request_ok(
            &mut stdin,
            &mut reader,
            &format!("g{i}"),
            "marks.grade",
            json!({ "percent": percent }),
        );
        assert_eq!(result["grade"], json!(grade), "{percent}");
    }

    let bad = request(
        &mut stdin,
        &mut reader,
        "bad",
        "marks.grade",
        json!({ "percent": "lots" }),
    );
    assert_eq!(error_code(&bad), Some("bad_params"));

    drop(stdin);
    let _ = child.wait();
}
