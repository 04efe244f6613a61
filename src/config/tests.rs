//! Tests for argument parsing and validation.

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use clap::Parser;
use rstest::rstest;

use super::*;

fn parse(args: &[&str]) -> Command {
    let mut argv = vec!["merge-audit"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv)
        .expect("arguments should parse")
        .command
}

fn fetch_args(args: &[&str]) -> FetchArgs {
    match parse(args) {
        Command::Fetch(fetch) => fetch,
        Command::Report(_) => panic!("expected fetch subcommand"),
    }
}

fn report_args(args: &[&str]) -> ReportArgs {
    match parse(args) {
        Command::Report(report) => report,
        Command::Fetch(_) => panic!("expected report subcommand"),
    }
}

#[rstest]
fn fetch_defaults() {
    let args = fetch_args(&["fetch", "--owner", "octo", "--repo", "hello"]);

    assert_eq!(args.out, Utf8PathBuf::from("outputs/raw"));
    assert_eq!(args.per_page, 50);
    assert_eq!(args.api_base, "https://api.github.com");
    assert_eq!(args.token, None);
}

#[rstest]
fn report_defaults() {
    let config = report_args(&["report"])
        .into_config()
        .expect("defaults should validate");

    assert_eq!(config.input_dir, Utf8PathBuf::from("outputs/raw"));
    assert_eq!(config.output, Utf8PathBuf::from("outputs/processed/report.csv"));
    assert!(!config.columnar);
    assert!(config.date_range.is_unbounded());
}

#[rstest]
fn report_reads_dates_and_flags() {
    let config = report_args(&[
        "report",
        "--in",
        "snap",
        "--out",
        "out/r.csv",
        "--parquet",
        "--since",
        "2024-01-01",
        "--until",
        "2024-01-31",
    ])
    .into_config()
    .expect("arguments should validate");

    assert_eq!(config.input_dir, Utf8PathBuf::from("snap"));
    assert!(config.columnar);
    assert_eq!(config.date_range.since(), NaiveDate::from_ymd_opt(2024, 1, 1));
    assert_eq!(config.date_range.until(), NaiveDate::from_ymd_opt(2024, 1, 31));
}

#[rstest]
fn report_rejects_inverted_dates() {
    let result = report_args(&["report", "--since", "2024-02-01", "--until", "2024-01-01"])
        .into_config();

    assert!(matches!(result, Err(AuditError::Configuration { .. })));
}

#[rstest]
#[case::parquet_destination(&["report", "--out", "report.parquet", "--parquet"], false)]
#[case::parquet_destination_csv_only(&["report", "--out", "report.parquet"], true)]
#[case::csv_destination(&["report", "--out", "report.csv", "--parquet"], true)]
fn report_keeps_csv_and_parquet_apart(#[case] args: &[&str], #[case] accepted: bool) {
    let result = report_args(args).into_config();

    if accepted {
        assert!(result.is_ok(), "expected valid config, got {result:?}");
    } else {
        assert!(
            matches!(result, Err(AuditError::Configuration { .. })),
            "expected Configuration error, got {result:?}"
        );
    }
}

#[rstest]
#[case::not_a_date(&["report", "--since", "01/02/2024"])]
#[case::missing_owner(&["fetch", "--repo", "hello"])]
#[case::per_page_overflow(&["fetch", "--owner", "o", "--repo", "r", "--per-page", "300"])]
fn clap_rejects_bad_arguments(#[case] args: &[&str]) {
    let mut argv = vec!["merge-audit"];
    argv.extend_from_slice(args);
    assert!(Cli::try_parse_from(argv).is_err());
}

#[rstest]
fn explicit_token_wins_over_environment() {
    let _guard = env_lock::lock_env([(TOKEN_ENV_VAR, Some("env-token"))]);

    let token = resolve_token(Some("cli-token")).expect("token should resolve");

    assert_eq!(token.value(), "cli-token");
}

#[rstest]
#[case::absent(None)]
#[case::blank(Some("  "))]
fn token_falls_back_to_environment(#[case] explicit: Option<&str>) {
    let _guard = env_lock::lock_env([(TOKEN_ENV_VAR, Some("env-token"))]);

    let token = resolve_token(explicit).expect("token should resolve");

    assert_eq!(token.value(), "env-token");
}

#[rstest]
fn missing_token_is_reported() {
    let _guard = env_lock::lock_env([(TOKEN_ENV_VAR, None::<&str>)]);

    assert_eq!(resolve_token(None).map(|_| ()), Err(AuditError::MissingToken));
}

#[rstest]
fn fetch_config_validates_everything_before_network() {
    let _guard = env_lock::lock_env([(TOKEN_ENV_VAR, None::<&str>)]);
    let args = fetch_args(&[
        "fetch",
        "--owner",
        "octo",
        "--repo",
        "hello",
        "--token",
        "t0ken",
        "--per-page",
        "100",
        "--api-base",
        "https://ghe.example.com/api/v3/",
    ]);

    let config = args.into_config().expect("arguments should validate");

    assert_eq!(config.page_size.get(), 100);
    assert_eq!(
        config.locator.pulls_url(),
        "https://ghe.example.com/api/v3/repos/octo/hello/pulls"
    );
    assert_eq!(config.snapshot_dir, Utf8PathBuf::from("outputs/raw"));
}

#[rstest]
#[case::zero_page("0", "https://api.github.com")]
#[case::large_page("101", "https://api.github.com")]
fn fetch_config_rejects_page_size(#[case] per_page: &str, #[case] api_base: &str) {
    let args = fetch_args(&[
        "fetch",
        "--owner",
        "o",
        "--repo",
        "r",
        "--token",
        "t",
        "--per-page",
        per_page,
        "--api-base",
        api_base,
    ]);

    assert!(matches!(
        args.into_config(),
        Err(AuditError::Configuration { .. })
    ));
}

#[rstest]
fn fetch_config_rejects_bad_api_base() {
    let args = fetch_args(&[
        "fetch",
        "--owner",
        "o",
        "--repo",
        "r",
        "--token",
        "t",
        "--api-base",
        "not a url",
    ]);

    assert!(matches!(args.into_config(), Err(AuditError::InvalidUrl(_))));
}
