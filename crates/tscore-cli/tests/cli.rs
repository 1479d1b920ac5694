use std::path::{Path, PathBuf};

use clap::Parser;
use tscore_cli::cli::{Cli, redacted_args};
use tscore_cli::output::{Destination, copy_report};
use tscore_model::{ParamKey, ParameterSet};

#[test]
fn test_positional_files_and_defaults() {
    let cli = Cli::try_parse_from(["temporal-score", "drugs.txt", "conds.txt"]).unwrap();
    assert_eq!(cli.drug_ids_file, PathBuf::from("drugs.txt"));
    assert_eq!(cli.cond_ids_file, PathBuf::from("conds.txt"));
    assert_eq!(cli.sqlplus, PathBuf::from("sqlplus"));
    assert!(cli.parameters.is_none());
    assert!(cli.timeout.is_none());
    assert!(!cli.debug);
    assert_eq!(cli.overrides(), tscore_core::Overrides::default());
}

#[test]
fn test_connection_overrides() {
    let cli = Cli::try_parse_from([
        "temporal-score",
        "-p",
        "params.cfg",
        "--db-conn",
        "prod",
        "--db-user",
        "scott",
        "--db-pass",
        "tiger",
        "--db-schema",
        "omop",
        "--timeout",
        "600",
        "drugs.txt",
        "conds.txt",
    ])
    .unwrap();
    let overrides = cli.overrides();
    assert_eq!(overrides.connection.as_deref(), Some("prod"));
    assert_eq!(overrides.user.as_deref(), Some("scott"));
    assert_eq!(overrides.password.as_deref(), Some("tiger"));
    assert_eq!(overrides.schema.as_deref(), Some("omop"));
    assert_eq!(cli.parameters, Some(PathBuf::from("params.cfg")));
    assert_eq!(cli.timeout, Some(600));
}

#[test]
fn test_both_id_files_are_required() {
    assert!(Cli::try_parse_from(["temporal-score", "drugs.txt"]).is_err());
}

#[test]
fn test_password_is_redacted_from_logged_args() {
    let args = redacted_args([
        "--db-user",
        "scott",
        "--db-pass",
        "tiger",
        "--db-pass=tiger2",
        "drugs.txt",
    ]);
    assert_eq!(
        args,
        vec![
            "--db-user",
            "scott",
            "--db-pass",
            "[REDACTED]",
            "--db-pass=[REDACTED]",
            "drugs.txt",
        ]
    );
}

#[cfg(unix)]
#[test]
fn test_non_utf8_args_are_logged_lossily() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let args = redacted_args([
        OsStr::new("--db-pass"),
        OsStr::from_bytes(b"ti\xffger"),
        OsStr::from_bytes(b"drugs\xff.txt"),
    ]);
    assert_eq!(args, vec!["--db-pass", "[REDACTED]", "drugs\u{FFFD}.txt"]);
}

#[test]
fn test_destination_precedence() {
    let mut params = ParameterSet::defaults();
    assert_eq!(Destination::choose(None, &params), Destination::Stdout);

    params.set(ParamKey::ReportFileName, "from_params.csv");
    assert_eq!(
        Destination::choose(None, &params),
        Destination::File(PathBuf::from("from_params.csv"))
    );
    assert_eq!(
        Destination::choose(Some(Path::new("cli.csv")), &params),
        Destination::File(PathBuf::from("cli.csv"))
    );
}

#[test]
fn test_report_is_copied_unchanged() {
    let report = "  773,  421, 2, 1, 3, 3, 4, 2, 4, 6, 7, 11, 1.8\n";
    let mut out = Vec::new();
    copy_report(report.as_bytes(), &mut out, None).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), report);
}

#[test]
fn test_report_is_reformatted_with_precision() {
    let report = "  773,  421, 2, 1, 3, 3, 4, 2, 4, 6, 7, 11, 1.8\n\n";
    let mut out = Vec::new();
    copy_report(report.as_bytes(), &mut out, Some(2)).unwrap();
    insta::assert_snapshot!(String::from_utf8(out).unwrap(), @"773,421,2,1,3,3,4,2,4,6,7,11,1.80");
}

#[test]
fn test_report_written_to_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("report.csv");
    Destination::File(path.clone())
        .open()
        .unwrap()
        .write("1,2,0,0,0,0,0,0,0,0,0,0,2\n".as_bytes(), None)
        .unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "1,2,0,0,0,0,0,0,0,0,0,0,2\n"
    );
}

#[test]
fn test_unusable_output_path_fails_on_open() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("missing").join("report.csv");
    let err = Destination::File(path).open().unwrap_err();
    assert!(err.to_string().starts_with("create report file "), "{err}");
}
