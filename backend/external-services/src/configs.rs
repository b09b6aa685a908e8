use std::path::PathBuf;

use domain_types::types::{Connectors, Proxy};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::logger::config::Log;

/// Prefix of environment variables overriding file values, e.g.
/// `CONNECTOR__PROXY__HTTPS_URL`.
pub const ENV_PREFIX: &str = "CONNECTOR";
/// Selects the config file to load.
pub const RUN_ENV: &str = "RUN_ENV";

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum Env {
    #[default]
    Development,
    Sandbox,
    Production,
}

impl Env {
    pub fn current_env() -> Self {
        #[cfg(debug_assertions)]
        let default_env = Self::Development;
        #[cfg(not(debug_assertions))]
        let default_env = Self::Production;

        std::env::var(RUN_ENV).map_or(default_env, |env| env.parse().unwrap_or(default_env))
    }

    pub const fn config_path(self) -> &'static str {
        match self {
            Self::Development => "development.toml",
            Self::Sandbox => "sandbox.toml",
            Self::Production => "production.toml",
        }
    }
}

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub proxy: Proxy,
    pub connectors: Connectors,
}

impl Config {
    /// Function to build the configuration by picking it from default locations
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::new_with_config_path(None)
    }

    pub fn new_with_config_path(
        explicit_config_path: Option<PathBuf>,
    ) -> Result<Self, config::ConfigError> {
        let env = Env::current_env();
        let config_path = Self::config_path(env, explicit_config_path);

        let config = Self::builder(env)?
            .add_source(config::File::from(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("proxy.bypass_proxy_urls"),
            )
            .build()?;

        #[allow(clippy::print_stderr)]
        serde_path_to_error::deserialize(config).map_err(|error| {
            eprintln!("Unable to deserialize application configuration: {error}");
            error.into_inner()
        })
    }

    pub fn builder(
        environment: Env,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        // "env" is an override, not a default: the file cannot change it.
        config::Config::builder().set_override("env", environment.to_string())
    }

    pub fn config_path(environment: Env, explicit_config_path: Option<PathBuf>) -> PathBuf {
        explicit_config_path.unwrap_or_else(|| {
            let mut config_path = workspace_path();
            config_path.push("config");
            config_path.push(environment.config_path());
            config_path
        })
    }
}

/// Repository root when run through cargo, the working directory otherwise.
pub fn workspace_path() -> PathBuf {
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        let mut path = PathBuf::from(manifest_dir);
        path.pop();
        path.pop();
        path
    } else {
        PathBuf::from(".")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_development_config_loads() {
        std::env::remove_var(RUN_ENV);
        let config = Config::new_with_config_path(Some(
            workspace_path().join("config").join("development.toml"),
        ))
        .unwrap();
        assert_eq!(
            config.connectors.quickbooks.secondary_base_url.as_deref(),
            Some("https://oauth.platform.intuit.com/oauth2/v1/tokens/bearer")
        );
        assert!(config.connectors.versapay.base_url.starts_with("https://"));
        assert!(!config.proxy.is_configured());
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        std::env::set_var("CONNECTOR__CONNECTORS__FUSEBOX__BASE_URL", "http://localhost:8099/");
        std::env::set_var(
            "CONNECTOR__PROXY__BYPASS_PROXY_URLS",
            "http://localhost:8099/,http://localhost:8100/",
        );
        let config = Config::new_with_config_path(Some(
            workspace_path().join("config").join("development.toml"),
        ));
        std::env::remove_var("CONNECTOR__CONNECTORS__FUSEBOX__BASE_URL");
        std::env::remove_var("CONNECTOR__PROXY__BYPASS_PROXY_URLS");

        let config = config.unwrap();
        assert_eq!(config.connectors.fusebox.base_url, "http://localhost:8099/");
        assert_eq!(config.proxy.bypass_proxy_urls.len(), 2);
    }

    #[test]
    fn test_env_config_file_names() {
        assert_eq!("Sandbox".parse::<Env>().unwrap().config_path(), "sandbox.toml");
        assert_eq!(Env::Production.config_path(), "production.toml");
    }
}
