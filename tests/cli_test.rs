//! Integration tests for command dispatch and exit codes.

use clap::Parser;
use tempfile::TempDir;

use graphphys::cli::{execute_command, Cli, CliError};
use graphphys::exitcode;
use graphphys::util::testing::{chain_document, write_document};

fn run(args: &[&str]) -> Result<(), CliError> {
    let cli = Cli::try_parse_from(std::iter::once("graphphys").chain(args.iter().copied()))
        .expect("arguments parse");
    execute_command(&cli)
}

#[test]
fn given_valid_document_when_checking_then_succeeds() {
    let dir = TempDir::new().unwrap();
    let path = write_document(dir.path(), "d0.gp", "D0 -> {K- pi+} [fraction=0.0389]");

    assert!(run(&["check", path.to_str().unwrap()]).is_ok());
    assert!(run(&["tree", path.to_str().unwrap()]).is_ok());
    assert!(run(&["expand", "--limit", "5", path.to_str().unwrap()]).is_ok());
}

#[test]
fn given_broken_document_when_checking_then_dataerr() {
    let dir = TempDir::new().unwrap();
    let path = write_document(dir.path(), "broken.gp", "D0 -> K-");

    let err = run(&["check", path.to_str().unwrap()]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
}

#[test]
fn given_missing_document_when_checking_then_noinput() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.gp");

    let err = run(&["check", path.to_str().unwrap()]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::NOINPUT);
}

#[test]
fn given_output_option_when_emitting_then_file_written() {
    let dir = TempDir::new().unwrap();
    let path = write_document(dir.path(), "a.gp", "A -> {B C}");
    let target = dir.path().join("emitted/a.gp");

    run(&["emit", path.to_str().unwrap(), "-o", target.to_str().unwrap()]).unwrap();

    let text = std::fs::read_to_string(&target).unwrap();
    assert!(text.contains("->"));
}

#[test]
fn given_unwritable_name_when_checking_id_then_usage_error() {
    assert!(run(&["id", "pi+"]).is_ok());
    assert!(run(&["id", "K S0"]).is_ok());

    let err = run(&["id", "say \"hi\""]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_expansion_over_limit_when_expanding_then_dataerr() {
    let dir = TempDir::new().unwrap();
    let path = write_document(dir.path(), "a.gp", "A -> {B}; A -> {C}; A -> {D}");

    let err = run(&["expand", "-l", "2", path.to_str().unwrap()]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
}

#[test]
fn given_runaway_nesting_when_checking_then_dataerr() {
    let dir = TempDir::new().unwrap();
    let deep_params = format!("A {}x{}", "[a=".repeat(10_000), "]".repeat(10_000));
    let params_path = write_document(dir.path(), "params.gp", &deep_params);
    let chain_path = write_document(dir.path(), "chain.gp", &chain_document(1_000));

    for path in [params_path, chain_path] {
        let err = run(&["check", path.to_str().unwrap()]).unwrap_err();
        assert_eq!(err.exit_code(), exitcode::DATAERR);
    }
}
