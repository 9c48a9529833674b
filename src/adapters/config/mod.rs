//! Configuration loading (figment: defaults, YAML file, environment).

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
