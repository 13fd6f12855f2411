//! `config.toml` loading.
//!
//! Lookup order: `--config`, `$TAILBOX_CONFIG`, `$XDG_CONFIG_HOME/tailbox/config.toml`,
//! `$HOME/.config/tailbox/config.toml`. An explicitly named file must exist;
//! a missing default file means built-in defaults.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_ENV: &str = "TAILBOX_CONFIG";
const CONFIG_DIR: &str = "tailbox";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Lines kept in the scroll buffer.
    pub height: usize,
    pub wait_message: String,
    /// Pause before each delivered line, in milliseconds. Zero disables pacing.
    pub pace_ms: u64,
    /// Lines read back from the end of a followed file.
    pub tail: usize,
    pub no_color: bool,
    pub show_labels: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            height: 10,
            wait_message: "waiting for logs".to_owned(),
            pace_ms: 10,
            tail: 50,
            no_color: false,
            show_labels: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Environment inputs to config lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigEnv {
    pub explicit: Option<PathBuf>,
    pub tailbox_config: Option<PathBuf>,
    pub xdg_config_home: Option<PathBuf>,
    pub home: Option<PathBuf>,
}

impl ConfigEnv {
    pub fn from_env(explicit: Option<PathBuf>) -> Self {
        Self {
            explicit,
            tailbox_config: non_empty_var(CONFIG_ENV),
            xdg_config_home: non_empty_var("XDG_CONFIG_HOME"),
            home: non_empty_var("HOME"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub path: PathBuf,
    /// Named by flag or environment, so it must exist.
    pub required: bool,
}

pub fn resolve_config_path(env: &ConfigEnv) -> Option<ConfigLocation> {
    if let Some(path) = env.explicit.as_ref().or(env.tailbox_config.as_ref()) {
        return Some(ConfigLocation {
            path: path.clone(),
            required: true,
        });
    }

    let base = env
        .xdg_config_home
        .clone()
        .or_else(|| env.home.as_ref().map(|home| home.join(".config")))?;
    Some(ConfigLocation {
        path: base.join(CONFIG_DIR).join(CONFIG_FILE),
        required: false,
    })
}

pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_config(env: &ConfigEnv) -> Result<Config, ConfigError> {
    let Some(location) = resolve_config_path(env) else {
        return Ok(Config::default());
    };

    match fs::read_to_string(&location.path) {
        Ok(text) => {
            tracing::debug!(path = %location.path.display(), "loaded config");
            parse_config(&text, &location.path)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound && !location.required => {
            Ok(Config::default())
        }
        Err(source) => Err(ConfigError::Read {
            path: location.path,
            source,
        }),
    }
}
