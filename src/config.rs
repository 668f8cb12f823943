//! Service configuration.
//!
//! Configuration is loaded from a YAML file with environment variable
//! overrides. The file path defaults to `config.yaml` and can be set via
//! `-f` or the `TOOLCRIB_CONFIG` environment variable; individual values
//! are overridden by `TOOLCRIB_`-prefixed variables (e.g. `TOOLCRIB_PORT=9000`).

use clap::Parser;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// CLI args: where the config lives, and whether to only validate it.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "TOOLCRIB_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// Every field has a default, so a missing config file is fine.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
        }
    }
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        Self::figment(args).extract()
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("TOOLCRIB_").split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_for(path: &str) -> Args {
        Args {
            config: path.to_string(),
            validate: false,
        }
    }

    #[test]
    fn test_defaults_without_config_file() {
        figment::Jail::expect_with(|_| {
            let config = Config::load(&args_for("missing.yaml")).unwrap();
            assert_eq!(config.host, "0.0.0.0");
            assert_eq!(config.port, 8001);
            Ok(())
        });
    }

    #[test]
    fn test_yaml_file_overridden_by_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "host: 127.0.0.1\nport: 9000\n")?;
            jail.set_env("TOOLCRIB_PORT", "9100");

            let config = Config::load(&args_for("config.yaml")).unwrap();
            assert_eq!(config.host, "127.0.0.1");
            assert_eq!(config.port, 9100);
            Ok(())
        });
    }
}
