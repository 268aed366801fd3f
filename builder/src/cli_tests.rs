//! Tests for CLI parsing.

use super::*;
use rstest::rstest;

#[test]
fn cli_parses_positional_roots_and_defaults() {
    let cli = Cli::parse_from(["terraform-registry-builder", "dist", "registry"]);
    assert_eq!(cli.source, Utf8PathBuf::from("dist"));
    assert_eq!(cli.destination, Utf8PathBuf::from("registry"));
    assert!(cli.config.is_none());
    assert!(cli.key_file.is_none());
    assert!(cli.key_id.is_none());
    assert!(cli.jobs.is_none());
    assert!(cli.version_order.is_none());
    assert_eq!(cli.verbosity, 0);
    assert!(!cli.quiet);
}

#[test]
fn cli_requires_both_roots() {
    assert!(Cli::try_parse_from(["terraform-registry-builder", "dist"]).is_err());
}

#[test]
fn cli_parses_signing_overrides() {
    let cli = Cli::parse_from([
        "terraform-registry-builder",
        "--key-file",
        "/secrets/key.asc",
        "--key-id",
        "ABCDEF0123456789",
        "dist",
        "registry",
    ]);
    assert_eq!(cli.key_file, Some(Utf8PathBuf::from("/secrets/key.asc")));
    assert_eq!(cli.key_id.as_deref(), Some("ABCDEF0123456789"));
}

#[rstest]
#[case::lexicographic("lexicographic", VersionOrder::Lexicographic)]
#[case::semantic("semantic", VersionOrder::Semantic)]
fn cli_parses_version_order(#[case] raw: &str, #[case] expected: VersionOrder) {
    let cli = Cli::parse_from(["terraform-registry-builder", "--version-order", raw, "a", "b"]);
    assert_eq!(cli.version_order.map(VersionOrder::from), Some(expected));
}

#[test]
fn cli_rejects_unknown_version_order() {
    assert!(
        Cli::try_parse_from(["terraform-registry-builder", "--version-order", "numeric", "a", "b"])
            .is_err()
    );
}

#[rstest]
#[case::zero("0")]
#[case::negative("-1")]
#[case::text("many")]
fn cli_rejects_invalid_job_counts(#[case] raw: &str) {
    assert!(Cli::try_parse_from(["terraform-registry-builder", "-j", raw, "a", "b"]).is_err());
}

#[test]
fn cli_counts_verbosity() {
    let cli = Cli::parse_from(["terraform-registry-builder", "-vv", "a", "b"]);
    assert_eq!(cli.verbosity, 2);
}

#[test]
fn cli_rejects_quiet_with_verbose() {
    assert!(Cli::try_parse_from(["terraform-registry-builder", "-q", "-v", "a", "b"]).is_err());
}
