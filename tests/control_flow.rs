use std::io::Write;
use std::process::Command;

fn run_basic(program: &str) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_minibasic"))
        .args(["-e", program])
        .output()
        .expect("failed to run minibasic")
}

fn run_basic_file(source: &str) -> std::process::Output {
    let mut tmp = tempfile::NamedTempFile::with_suffix(".bas").expect("failed to create temp file");
    tmp.write_all(source.as_bytes()).expect("failed to write");
    tmp.flush().expect("failed to flush");
    Command::new(env!("CARGO_BIN_EXE_minibasic"))
        .arg(tmp.path())
        .output()
        .expect("failed to run minibasic")
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("non-utf8 output")
}

#[test]
fn statements_execute_in_ascending_line_order() {
    // loaded out of order, executed by numeric key
    let out = run_basic("30 PRINT \"c\" : 10 PRINT \"a\" : 20 PRINT \"b\"");
    assert_eq!(stdout_of(&out), "a\nb\nc\n");
}

#[test]
fn goto_skips_lines() {
    let out = run_basic("10 PRINT \"one\" : 20 GOTO 40 : 30 PRINT \"two\" : 40 PRINT \"three\"");
    assert_eq!(stdout_of(&out), "one\nthree\n");
}

#[test]
fn goto_missing_line_reports_and_continues() {
    let out = run_basic("10 GOTO 999 : 20 PRINT \"still here\"");
    assert_eq!(stdout_of(&out), "still here\n");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error on line 10"), "stderr: {stderr}");
    assert!(stderr.contains("no such line"), "stderr: {stderr}");
}

#[test]
fn if_then_branches_to_line() {
    let out = run_basic("10 IF 1 < 2 THEN 40 : 20 PRINT \"skipped\" : 40 PRINT \"taken\"");
    assert_eq!(stdout_of(&out), "taken\n");
}

#[test]
fn if_then_executes_inline_statement() {
    let out = run_basic("10 A = 5 : 20 IF A = 5 THEN PRINT \"yes\" : 30 IF A <> 5 THEN PRINT \"no\"");
    assert_eq!(stdout_of(&out), "yes\n");
}

#[test]
fn for_loop_runs_body_three_times() {
    let out = run_basic("10 FOR i = 1 TO 3 : 20 PRINT i : 30 NEXT i : 40 PRINT i");
    assert_eq!(stdout_of(&out), "1\n2\n3\n4\n");
}

#[test]
fn for_loop_descending() {
    let out = run_basic("10 FOR i = 5 TO 1 STEP -1 : 20 PRINT i : 30 NEXT i");
    assert_eq!(stdout_of(&out), "5\n4\n3\n2\n1\n");
}

#[test]
fn for_loop_with_step_two() {
    let out = run_basic("10 FOR i = 1 TO 7 STEP 2 : 20 PRINT i : 30 NEXT");
    assert_eq!(stdout_of(&out), "1\n3\n5\n7\n");
}

#[test]
fn nested_for_loops() {
    let out = run_basic(
        "10 FOR i = 1 TO 2 : 20 FOR j = 1 TO 2 : 30 PRINT i, j : 40 NEXT j : 50 NEXT i",
    );
    assert_eq!(stdout_of(&out), "1\t1\n1\t2\n2\t1\n2\t2\n");
}

#[test]
fn end_stops_execution() {
    let out = run_basic("10 PRINT \"before\" : 20 END : 30 PRINT \"after\"");
    assert_eq!(stdout_of(&out), "before\n");
}

#[test]
fn rem_is_ignored() {
    let out = run_basic("10 REM this says nothing : 20 PRINT \"ok\"");
    assert_eq!(stdout_of(&out), "ok\n");
}

#[test]
fn file_with_auto_numbered_lines() {
    let out = run_basic_file("PRINT \"first\"\nPRINT \"second\"\n");
    assert!(out.status.success());
    assert_eq!(stdout_of(&out), "first\nsecond\n");
}

#[test]
fn file_mixing_numbered_and_bare_lines() {
    // the bare second line auto-numbers to 20 and still runs in order
    let out = run_basic_file("100 PRINT \"late\"\nPRINT \"early\"\n");
    assert_eq!(stdout_of(&out), "early\nlate\n");
}

#[test]
fn file_comment_lines_and_trailing_comments() {
    let out = run_basic_file("! whole-line comment\n10 PRINT \"ok\" ! trailing\n");
    assert_eq!(stdout_of(&out), "ok\n");
}

#[test]
fn bang_inside_string_is_not_a_comment() {
    let out = run_basic_file("10 PRINT \"wow!\"\n");
    assert_eq!(stdout_of(&out), "wow!\n");
}

#[test]
fn missing_file_is_fatal() {
    let out = Command::new(env!("CARGO_BIN_EXE_minibasic"))
        .arg("no-such-program.bas")
        .output()
        .expect("failed to run minibasic");
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("cannot read"), "stderr: {stderr}");
}

#[test]
fn extra_arguments_rejected() {
    let out = Command::new(env!("CARGO_BIN_EXE_minibasic"))
        .args(["a.bas", "b.bas"])
        .output()
        .expect("failed to run minibasic");
    assert!(!out.status.success());
}
