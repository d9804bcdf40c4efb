//! Configuration loading
//!
//! Layers, lowest to highest: built-in defaults, TOML file, `PENMAN_*`
//! environment variables. CLI flags are applied by the caller.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use penman_core::EngineConfig;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "PENMAN";

/// `<config dir>/penman/config.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "penman", "penman").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load the engine configuration
///
/// An explicit path must exist; the default path is optional.
pub fn load(explicit: Option<&Path>) -> Result<EngineConfig> {
    let path = explicit.map(Path::to_path_buf).or_else(default_config_path);
    load_from(path.as_deref(), explicit.is_some())
}

fn load_from(path: Option<&Path>, required: bool) -> Result<EngineConfig> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(
            File::from(path)
                .format(FileFormat::Toml)
                .required(required),
        );
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(":")
            .with_list_parse_key("search_roots")
            .with_list_parse_key("extra_path_dirs"),
    );

    let mut engine: EngineConfig = builder
        .build()
        .and_then(|config| config.try_deserialize())
        .with_context(|| match path {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Failed to load configuration".to_string(),
        })?;

    engine.search_roots = engine.search_roots.iter().map(|p| expand_tilde(p)).collect();
    engine.extra_path_dirs = engine.extra_path_dirs.iter().map(|p| expand_tilde(p)).collect();
    Ok(engine)
}

fn expand_tilde(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
