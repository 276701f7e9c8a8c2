//! Unit tests for CLI argument parsing and configuration merging.
//!
//! This module exercises the command-line interface defined in
//! [`lmis_steps::cli`] using `rstest` for parameterised coverage of success
//! and error scenarios, and validates `OrthoConfig` layer precedence.

use anyhow::{Context, Result, ensure};
use clap::error::ErrorKind;
use lmis_steps::cli::{self, Cli, Commands, RunArgs};
use lmis_steps::config::EnvProfile;
use ortho_config::{MergeComposer, OrthoError, sanitize_value};
use rstest::rstest;
use serde_json::json;
use std::path::PathBuf;

#[rstest]
#[case(vec!["lmis-steps"], None, false, Commands::Steps)]
#[case(
    vec!["lmis-steps", "--profile", "test", "config"],
    Some(EnvProfile::Test),
    false,
    Commands::Config,
)]
#[case(
    vec!["lmis-steps", "--stress", "run", "smoke.feature", "--visible", "Total:300"],
    None,
    true,
    Commands::Run(RunArgs {
        file: PathBuf::from("smoke.feature"),
        visible: vec!["Total:300".into()],
        present: Vec::new(),
    }),
)]
#[case(
    vec!["lmis-steps", "run", "smoke.feature", "--present", "* text:'Aspirin'"],
    None,
    false,
    Commands::Run(RunArgs {
        file: PathBuf::from("smoke.feature"),
        visible: Vec::new(),
        present: vec!["* text:'Aspirin'".into()],
    }),
)]
fn parse_cli(
    #[case] argv: Vec<&str>,
    #[case] profile: Option<EnvProfile>,
    #[case] stress: bool,
    #[case] command: Commands,
) -> Result<()> {
    let (raw, _) = cli::parse_from(argv)?;
    let parsed = raw.with_default_command();
    ensure!(parsed.profile == profile, "profile {:?}", parsed.profile);
    ensure!(parsed.stress == stress, "stress {}", parsed.stress);
    ensure!(
        parsed.command.as_ref() == Some(&command),
        "command {:?}",
        parsed.command
    );
    Ok(())
}

#[rstest]
#[case(vec!["lmis-steps", "--profile", "staging"], ErrorKind::InvalidValue)]
#[case(vec!["lmis-steps", "--stress-product-count", "0"], ErrorKind::ValueValidation)]
#[case(vec!["lmis-steps", "run"], ErrorKind::MissingRequiredArgument)]
#[case(
    vec!["lmis-steps", "run", "x.feature", "--present", "id:'checkbox'"],
    ErrorKind::ValueValidation,
)]
#[case(vec!["lmis-steps", "launch"], ErrorKind::InvalidSubcommand)]
fn parse_cli_errors(#[case] argv: Vec<&str>, #[case] expected: ErrorKind) -> Result<()> {
    let err = cli::parse_from(argv).err().context("parsing should fail")?;
    ensure!(err.kind() == expected, "unexpected kind {:?}: {err}", err.kind());
    Ok(())
}

#[test]
fn suite_config_follows_flags() -> Result<()> {
    let (parsed, _) = cli::parse_from([
        "lmis-steps",
        "--profile",
        "test",
        "--stress",
        "--stress-product-count",
        "12",
    ])?;
    let suite = parsed.suite_config();
    ensure!(suite.profile() == EnvProfile::Test, "profile");
    ensure!(suite.stress_test(), "stress");
    ensure!(suite.stress_product_count() == 12, "count");
    Ok(())
}

#[test]
fn cli_merge_layers_respects_precedence() -> Result<()> {
    let mut composer = MergeComposer::new();
    composer.push_defaults(sanitize_value(&Cli::default())?);
    composer.push_file(json!({ "profile": "test", "stress_product_count": 50 }), None);
    composer.push_environment(json!({ "stress": true, "stress_product_count": 75 }));
    composer.push_cli(json!({ "profile": "development", "verbose": true }));
    let merged = Cli::merge_from_layers(composer.layers())?;

    ensure!(
        merged.profile == Some(EnvProfile::Development),
        "CLI layer should override the file profile"
    );
    ensure!(merged.stress, "environment should enable stress runs");
    ensure!(
        merged.stress_product_count == Some(75),
        "environment should override the file count"
    );
    ensure!(merged.verbose, "CLI layer should set verbose");
    Ok(())
}

#[test]
fn defaults_select_a_normal_development_run() -> Result<()> {
    let mut composer = MergeComposer::new();
    composer.push_defaults(sanitize_value(&Cli::default())?);
    let merged = Cli::merge_from_layers(composer.layers())?;
    let suite = merged.suite_config();
    ensure!(suite.profile() == EnvProfile::Development, "profile");
    ensure!(!suite.stress_test(), "stress");
    ensure!(suite.stress_product_count() == 300, "count");
    Ok(())
}

#[rstest]
#[case::environment_zero(json!({}), json!({ "stress": true, "stress_product_count": 0 }))]
#[case::file_too_large(json!({ "stress_product_count": 4_000_000_000_u32 }), json!({}))]
fn merged_stress_product_count_is_bounded(
    #[case] file: serde_json::Value,
    #[case] environment: serde_json::Value,
) -> Result<()> {
    let mut composer = MergeComposer::new();
    composer.push_defaults(sanitize_value(&Cli::default())?);
    composer.push_file(file, None);
    composer.push_environment(environment);
    let merged = Cli::merge_from_layers(composer.layers())?;

    let err = merged
        .validated()
        .err()
        .context("out-of-range count should be rejected")?;
    ensure!(
        matches!(
            &*err,
            OrthoError::Validation { key, .. } if key == "stress_product_count"
        ),
        "unexpected error {err}"
    );
    Ok(())
}

#[test]
fn merged_stress_product_count_in_range_is_kept() -> Result<()> {
    let mut composer = MergeComposer::new();
    composer.push_defaults(sanitize_value(&Cli::default())?);
    composer.push_environment(json!({ "stress_product_count": 10_000 }));
    let merged = Cli::merge_from_layers(composer.layers())?.validated()?;
    ensure!(merged.stress_product_count == Some(10_000), "count");
    Ok(())
}
