//! Utilities shared by the actionform binaries: path handling and the
//! JSON-backed CLI configuration file.

pub mod config;
pub mod paths;

pub use config::{CONFIG_PATH_ENV, CliConfig, ConfigError, default_config_path};
pub use paths::expand_tilde;
