//! Environment profiles and suite-wide switches.
//!
//! Two fixed environment profiles supply the account and signature settings
//! the acceptance suite runs against. [`SuiteConfig`] bundles the selected
//! profile with the stress-test switch and is handed to the dispatcher once at
//! start-up; nothing mutates it afterwards.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Number of synthetic products initialised by stress runs.
pub const DEFAULT_STRESS_PRODUCT_COUNT: u32 = 300;

/// Account and signature settings for one target environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvConfig {
    /// Login name used by the suite.
    pub username: &'static str,
    /// Password for [`EnvConfig::username`].
    pub password: &'static str,
    /// Whether MMIA requisitions require a signature.
    pub mmia_signature: bool,
    /// Whether stock movements require a signature.
    pub stock_movement_signature: bool,
}

/// Settings for the development server.
pub static DEVELOPMENT: EnvConfig = EnvConfig {
    username: "superuser",
    password: "password1",
    mmia_signature: true,
    stock_movement_signature: true,
};

/// Settings for the shared test server.
pub static TEST: EnvConfig = EnvConfig {
    username: "test_user",
    password: "testuser",
    mmia_signature: false,
    stock_movement_signature: false,
};

/// Named environment profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EnvProfile {
    /// The development server ([`DEVELOPMENT`]).
    #[default]
    Development,
    /// The shared test server ([`TEST`]).
    Test,
}

/// Source of the active [`EnvConfig`].
pub trait ConfigProvider {
    /// Return the environment settings to run against.
    fn env_config(&self) -> &'static EnvConfig;
}

impl ConfigProvider for EnvProfile {
    fn env_config(&self) -> &'static EnvConfig {
        match self {
            Self::Development => &DEVELOPMENT,
            Self::Test => &TEST,
        }
    }
}

/// Return the default environment settings.
///
/// # Examples
///
/// ```
/// let config = lmis_steps::config::get_config();
/// assert_eq!(config.username, "superuser");
/// assert!(config.mmia_signature);
/// ```
#[must_use]
pub fn get_config() -> &'static EnvConfig {
    EnvProfile::default().env_config()
}

/// Immutable switches shared by every step of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteConfig {
    profile: EnvProfile,
    stress_test: bool,
    stress_product_count: u32,
}

impl SuiteConfig {
    /// Configure a normal (non-stress) run against `profile`.
    #[must_use]
    pub const fn new(profile: EnvProfile) -> Self {
        Self {
            profile,
            stress_test: false,
            stress_product_count: DEFAULT_STRESS_PRODUCT_COUNT,
        }
    }

    /// Enable or disable the stress-test step variants.
    #[must_use]
    pub const fn with_stress_test(mut self, enabled: bool) -> Self {
        self.stress_test = enabled;
        self
    }

    /// Override how many products stress variants initialise.
    #[must_use]
    pub const fn with_stress_product_count(mut self, count: u32) -> Self {
        self.stress_product_count = count;
        self
    }

    /// Selected environment profile.
    #[must_use]
    pub const fn profile(&self) -> EnvProfile {
        self.profile
    }

    /// Whether stress-test variants are active.
    #[must_use]
    pub const fn stress_test(&self) -> bool {
        self.stress_test
    }

    /// Products initialised by stress variants.
    #[must_use]
    pub const fn stress_product_count(&self) -> u32 {
        self.stress_product_count
    }
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self::new(EnvProfile::default())
    }
}

impl ConfigProvider for SuiteConfig {
    fn env_config(&self) -> &'static EnvConfig {
        self.profile.env_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn get_config_is_stable_within_a_process() {
        let first = get_config();
        let second = get_config();
        assert!(std::ptr::eq(first, second));
        assert_eq!(*first, DEVELOPMENT);
    }

    #[rstest]
    #[case(EnvProfile::Development, "superuser", "password1", true)]
    #[case(EnvProfile::Test, "test_user", "testuser", false)]
    fn profiles_supply_fixed_settings(
        #[case] profile: EnvProfile,
        #[case] username: &str,
        #[case] password: &str,
        #[case] signatures: bool,
    ) {
        let config = profile.env_config();
        assert_eq!(config.username, username);
        assert_eq!(config.password, password);
        assert_eq!(config.mmia_signature, signatures);
        assert_eq!(config.stock_movement_signature, signatures);
    }

    #[test]
    fn env_config_serialises_with_camel_case_keys() -> anyhow::Result<()> {
        let value = serde_json::to_value(DEVELOPMENT)?;
        assert_eq!(
            value,
            serde_json::json!({
                "username": "superuser",
                "password": "password1",
                "mmiaSignature": true,
                "stockMovementSignature": true,
            })
        );
        Ok(())
    }

    #[test]
    fn suite_defaults_to_normal_development_run() {
        let suite = SuiteConfig::default();
        assert_eq!(suite.profile(), EnvProfile::Development);
        assert!(!suite.stress_test());
        assert_eq!(suite.stress_product_count(), 300);
        assert_eq!(suite.env_config().username, "superuser");
    }
}
