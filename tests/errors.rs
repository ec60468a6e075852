use std::process::Command;

fn run_basic(program: &str) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_minibasic"))
        .args(["-e", program])
        .output()
        .expect("failed to run minibasic")
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("non-utf8 output")
}

#[test]
fn statement_errors_do_not_abort_the_program() {
    let out = run_basic("10 GOTO 999 : 20 NEXT : 30 READ X : 40 PRINT \"survived\"");
    assert!(out.status.success());
    assert_eq!(stdout_of(&out), "survived\n");
}

#[test]
fn goto_error_names_the_offending_line() {
    let out = run_basic("10 PRINT \"a\" : 20 GOTO 999 : 30 PRINT \"b\"");
    let stderr = stderr_of(&out);
    assert!(stderr.contains("error on line 20"), "stderr: {stderr}");
    assert!(stderr.contains("line 999 does not exist"), "stderr: {stderr}");
    assert_eq!(stdout_of(&out), "a\nb\n");
}

#[test]
fn next_without_for() {
    let out = run_basic("10 NEXT : 20 PRINT \"ok\"");
    let stderr = stderr_of(&out);
    assert!(
        stderr.contains("NEXT without matching FOR"),
        "stderr: {stderr}"
    );
    assert_eq!(stdout_of(&out), "ok\n");
}

#[test]
fn next_with_mismatched_variable() {
    let out = run_basic("10 FOR i = 1 TO 2 : 20 NEXT j : 30 PRINT \"ok\"");
    let stderr = stderr_of(&out);
    assert!(
        stderr.contains("NEXT variable does not match FOR"),
        "stderr: {stderr}"
    );
    assert!(stdout_of(&out).contains("ok"));
}

#[test]
fn comparing_incompatible_types() {
    let out = run_basic("10 IF 1 = \"1\" THEN PRINT \"never\" : 20 PRINT \"ok\"");
    let stderr = stderr_of(&out);
    assert!(
        stderr.contains("incompatible types in comparison"),
        "stderr: {stderr}"
    );
    assert_eq!(stdout_of(&out), "ok\n");
}

#[test]
fn unknown_statement_is_reported() {
    let out = run_basic("10 FROBNICATE : 20 PRINT \"ok\"");
    let stderr = stderr_of(&out);
    assert!(stderr.contains("unknown statement"), "stderr: {stderr}");
    assert_eq!(stdout_of(&out), "ok\n");
}

#[test]
fn bad_let_syntax_is_reported() {
    let out = run_basic("10 LET X 5 : 20 PRINT \"ok\"");
    let stderr = stderr_of(&out);
    assert!(stderr.contains("invalid statement syntax"), "stderr: {stderr}");
    assert_eq!(stdout_of(&out), "ok\n");
}

#[test]
fn method_outside_class_is_reported() {
    let out = run_basic("10 METHOD stray : 20 PRINT \"ok\"");
    let stderr = stderr_of(&out);
    assert!(stderr.contains("METHOD outside CLASS"), "stderr: {stderr}");
    assert_eq!(stdout_of(&out), "ok\n");
}

#[test]
fn goto_with_non_numeric_target() {
    let out = run_basic("10 GOTO nowhere : 20 PRINT \"ok\"");
    let stderr = stderr_of(&out);
    assert!(stderr.contains("numeric value expected"), "stderr: {stderr}");
    assert_eq!(stdout_of(&out), "ok\n");
}
