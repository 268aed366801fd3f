//! Registry builder CLI entrypoint.
//!
//! Resolves configuration, loads the signing key, and runs the build over
//! the real filesystem. Exits non-zero if configuration fails, the build
//! cannot start, or any artefact failed.

use clap::Parser;
use std::io::Write;
use terraform_registry_builder::builder::RegistryBuilder;
use terraform_registry_builder::cli::Cli;
use terraform_registry_builder::config::{BuildConfig, ConfigError};
use terraform_registry_builder::error::BuildError;
use terraform_registry_builder::fs::OsFilesystem;
use terraform_registry_builder::output::{init_logging, write_report, write_stderr_line};
use terraform_registry_builder::report::BuildReport;
use terraform_registry_builder::signing::{OpenPgpSigner, SignerError};

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Signer(#[from] SignerError),
    #[error(transparent)]
    Build(#[from] BuildError),
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbosity, cli.quiet);
    let mut stderr = std::io::stderr();
    let exit_code = exit_code_for_run_result(run(&cli), cli.quiet, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli) -> Result<BuildReport, RunError> {
    let config = BuildConfig::from_env(cli)?;
    let signer = OpenPgpSigner::from_config(&config.signer)?;
    let fs = OsFilesystem;
    let report = RegistryBuilder::new(&fs, &signer, config.options)
        .build(&config.source, &config.destination)?;
    Ok(report)
}

fn exit_code_for_run_result(
    result: Result<BuildReport, RunError>,
    quiet: bool,
    stderr: &mut dyn Write,
) -> i32 {
    match result {
        Ok(report) if report.has_failures() => {
            write_report(stderr, &report);
            1
        }
        Ok(report) => {
            if !quiet {
                write_report(stderr, &report);
            }
            0
        }
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terraform_registry_builder::report::ArtefactOutcome;

    #[test]
    fn successful_build_prints_summary_and_returns_zero() {
        let mut report = BuildReport::new();
        report.record("src/a", ArtefactOutcome::Published);
        let mut stderr = Vec::new();

        let exit_code = exit_code_for_run_result(Ok(report), false, &mut stderr);

        assert_eq!(exit_code, 0);
        let text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert_eq!(text, "1 published, 0 skipped, 0 failed\n");
    }

    #[test]
    fn quiet_success_prints_nothing() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(BuildReport::new()), true, &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn artefact_failures_return_one_even_when_quiet() {
        let mut report = BuildReport::new();
        report.record(
            "src/bad",
            ArtefactOutcome::Failed {
                reason: "boom".to_owned(),
            },
        );
        let mut stderr = Vec::new();

        let exit_code = exit_code_for_run_result(Ok(report), true, &mut stderr);

        assert_eq!(exit_code, 1);
        let text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(text.contains("failed: src/bad: boom"));
    }

    #[test]
    fn fatal_errors_are_prefixed_and_return_one() {
        let err = RunError::Build(BuildError::SourceNotDirectory {
            path: "missing".into(),
        });
        let mut stderr = Vec::new();

        let exit_code = exit_code_for_run_result(Err(err), false, &mut stderr);

        assert_eq!(exit_code, 1);
        let text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert_eq!(text, "error: source path is not a directory: missing\n");
    }

    #[test]
    fn missing_key_material_is_reported_before_building() {
        let cli = Cli::parse_from(["terraform-registry-builder", "src", "dst"]);
        let result = temp_env::with_vars_unset(
            [
                "TFREGBUILDER_GPG_KEY",
                "TFREGBUILDER_GPG_KEY_FILE",
                "TFREGBUILDER_GPG_PASSPHRASE",
                "TFREGBUILDER_GPG_ID",
            ],
            || run(&cli),
        );
        assert!(matches!(
            result,
            Err(RunError::Config(ConfigError::Signer(
                SignerError::MissingKeyMaterial
            )))
        ));
    }
}
