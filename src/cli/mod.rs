//! Command line interface definition using clap.
//!
//! [`Cli`] carries the suite switches shared by every subcommand. Values are
//! layered with `ortho_config`: built-in defaults, then an optional
//! `lmis-steps.toml`, then `LMIS_STEPS_*` environment variables, then flags
//! given on the command line.

use clap::parser::ValueSource;
use clap::{ArgMatches, Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use ortho_config::declarative::LayerComposition;
use ortho_config::figment::{Figment, providers::Env};
use ortho_config::uncased::Uncased;
use ortho_config::{
    ConfigDiscovery, MergeComposer, OrthoConfig, OrthoMergeExt, OrthoResult, sanitize_value,
};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{DEFAULT_STRESS_PRODUCT_COUNT, EnvProfile, SuiteConfig};

mod parsing;

const CONFIG_ENV_VAR: &str = "LMIS_STEPS_CONFIG_PATH";
const ENV_PREFIX: &str = "LMIS_STEPS_";

/// Step catalogue and dry-run scenario runner for the LMIS stock app.
#[derive(Debug, Parser, Serialize, Deserialize, OrthoConfig)]
#[command(author, version, about, long_about = None)]
#[ortho_config(prefix = "LMIS_STEPS")]
pub struct Cli {
    /// Environment profile supplying credentials and signature switches.
    #[arg(long, value_enum, value_name = "PROFILE")]
    pub profile: Option<EnvProfile>,

    /// Run the stress-test variants of the drug steps.
    #[arg(long)]
    #[ortho_config(default = false)]
    pub stress: bool,

    /// Number of products initialised by stress runs.
    #[arg(long, value_name = "N", value_parser = parsing::parse_product_count)]
    pub stress_product_count: Option<u32>,

    /// Enable verbose diagnostic logging.
    #[arg(short, long)]
    #[ortho_config(default = false)]
    pub verbose: bool,

    /// Subcommand to execute; defaults to `steps` when omitted.
    ///
    /// `OrthoConfig` merging ignores this field; CLI parsing supplies it.
    #[serde(skip)]
    #[command(subcommand)]
    #[ortho_config(skip_cli)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Apply the default command if none was specified.
    #[must_use]
    pub fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Steps);
        }
        self
    }

    /// Check merged values that skipped the clap value parsers, such as
    /// those read from `lmis-steps.toml` or `LMIS_STEPS_*` variables.
    ///
    /// # Errors
    ///
    /// Returns [`ortho_config::OrthoError::Validation`] when the stress
    /// product count lies outside `1..=10000`.
    pub fn validated(self) -> OrthoResult<Self> {
        if let Some(count) = self.stress_product_count {
            parsing::check_product_count(count).map_err(|message| {
                Arc::new(ortho_config::OrthoError::Validation {
                    key: String::from("stress_product_count"),
                    message,
                })
            })?;
        }
        Ok(self)
    }

    /// Suite switches selected by the merged configuration.
    #[must_use]
    pub fn suite_config(&self) -> SuiteConfig {
        SuiteConfig::new(self.profile.unwrap_or_default())
            .with_stress_test(self.stress)
            .with_stress_product_count(
                self.stress_product_count
                    .unwrap_or(DEFAULT_STRESS_PRODUCT_COUNT),
            )
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            profile: None,
            stress: false,
            stress_product_count: None,
            verbose: false,
            command: None,
        }
        .with_default_command()
    }
}

/// Arguments accepted by the `run` command.
#[derive(Debug, Args, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct RunArgs {
    /// Scenario script to run.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Text the scripted device reports as visible.
    #[arg(long = "visible", value_name = "TEXT")]
    #[serde(default)]
    pub visible: Vec<String>,

    /// Selector the scripted device answers with one element on every
    /// query.
    #[arg(long = "present", value_name = "SELECTOR", value_parser = parsing::parse_selector)]
    #[serde(default)]
    pub present: Vec<String>,
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Commands {
    /// List registered steps in resolution order.
    Steps,

    /// Print the selected environment profile and suite switches as JSON.
    Config,

    /// Dry-run a scenario script against a scripted device.
    Run(RunArgs),
}

/// Parse CLI arguments.
///
/// Returns both the parsed CLI struct and the `ArgMatches` required for
/// configuration merging.
///
/// # Errors
///
/// Returns a `clap::Error` when parsing fails.
pub fn parse_from<I, T>(iter: I) -> Result<(Cli, ArgMatches), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = Cli::command();
    let matches = command.try_get_matches_from_mut(iter)?;
    // Clone matches before from_arg_matches_mut consumes the values.
    let matches_for_merge = matches.clone();
    let mut matches_for_parse = matches;
    let cli = Cli::from_arg_matches_mut(&mut matches_for_parse)
        .map_err(|clap_err| clap_err.with_cmd(&command))?;
    Ok((cli, matches_for_merge))
}

/// Return the prefixed environment provider for CLI configuration.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
}

fn config_discovery() -> ConfigDiscovery {
    ConfigDiscovery::builder("lmis-steps")
        .env_var(CONFIG_ENV_VAR)
        .build()
}

/// Return `true` when no CLI overrides were supplied.
///
/// The merge pipeline treats an empty JSON object as "no overrides".
fn is_empty_value(value: &serde_json::Value) -> bool {
    matches!(value, serde_json::Value::Object(map) if map.is_empty())
}

fn cli_overrides_from_matches(cli: &Cli, matches: &ArgMatches) -> OrthoResult<serde_json::Value> {
    let value = sanitize_value(cli)?;
    let mut map = match value {
        serde_json::Value::Object(map) => map,
        other => {
            return Err(Arc::new(ortho_config::OrthoError::Validation {
                key: String::from("cli"),
                message: format!(
                    "expected parsed CLI values to serialize to an object, got {other:?}"
                ),
            }));
        }
    };

    map.remove("command");
    for field in ["profile", "stress", "stress_product_count", "verbose"] {
        if matches.value_source(field) != Some(ValueSource::CommandLine) {
            map.remove(field);
        }
    }

    Ok(serde_json::Value::Object(map))
}

/// Merge configuration layers over the parsed CLI values.
///
/// # Errors
///
/// Returns an [`ortho_config::OrthoError`] if layer composition or merging
/// fails, or if a merged value is out of range.
pub fn merge_with_config(cli: &Cli, matches: &ArgMatches) -> OrthoResult<Cli> {
    let command = cli.command.clone();
    let mut errors = Vec::new();
    let mut composer = MergeComposer::with_capacity(4);

    match sanitize_value(&Cli::default()) {
        Ok(value) => composer.push_defaults(value),
        Err(err) => errors.push(err),
    }

    let mut file_layers = config_discovery().compose_layers();
    errors.append(&mut file_layers.required_errors);
    if file_layers.value.is_empty() {
        errors.append(&mut file_layers.optional_errors);
    }
    for layer in file_layers.value {
        composer.push_layer(layer);
    }

    let env_provider = env_provider()
        .map(|key| Uncased::new(key.as_str().to_ascii_uppercase()))
        .split("__");
    match Figment::from(env_provider)
        .extract::<serde_json::Value>()
        .into_ortho_merge()
    {
        Ok(value) => composer.push_environment(value),
        Err(err) => errors.push(err),
    }

    match cli_overrides_from_matches(cli, matches) {
        Ok(value) if !is_empty_value(&value) => composer.push_cli(value),
        Ok(_) => {}
        Err(err) => errors.push(err),
    }

    let composition = LayerComposition::new(composer.layers(), errors);
    let mut merged = composition
        .into_merge_result(Cli::merge_from_layers)?
        .validated()?;
    merged.command = command;
    Ok(merged)
}
