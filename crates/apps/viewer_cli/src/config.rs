//! Runtime configuration: command-line flags, then environment variables,
//! then an optional session manifest, then built-in defaults.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::Context;
use formats::DatasetManifest;
use state::ApiState;

pub const API_URL_ENV: &str = "EXPRSCOPE_API_URL";
pub const PREFIX_ENV: &str = "EXPRSCOPE_PREFIX";
pub const DBNAME_ENV: &str = "EXPRSCOPE_DBNAME";
pub const USERNAME_ENV: &str = "EXPRSCOPE_USERNAME";

pub const DEFAULT_PREFIX: &str = "or";

/// Connection overrides given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub prefix: Option<String>,
    pub dbname: Option<String>,
    pub username: Option<String>,
}

/// Flag wins over environment; `None` keeps the lower layer.
fn layered(flag: Option<String>, env_value: Option<String>) -> Option<String> {
    flag.or(env_value).filter(|v| !v.trim().is_empty())
}

fn env_var(key: &str) -> Option<String> {
    env::var(key).ok()
}

pub fn load_manifest(path: &Path) -> anyhow::Result<DatasetManifest> {
    let text = fs::read_to_string(path).with_context(|| format!("reading manifest {}", path.display()))?;
    DatasetManifest::from_json(&text).with_context(|| format!("parsing manifest {}", path.display()))
}

/// Builds the API state from all configuration layers.
pub fn api_state(overrides: Overrides, manifest: Option<&DatasetManifest>) -> ApiState {
    api_state_with_env(overrides, manifest, env_var)
}

fn api_state_with_env(
    overrides: Overrides,
    manifest: Option<&DatasetManifest>,
    env_lookup: impl Fn(&str) -> Option<String>,
) -> ApiState {
    let mut api = match manifest {
        Some(m) => ApiState::from_manifest(m),
        None => ApiState::new(DEFAULT_PREFIX),
    };
    if let Some(v) = layered(overrides.api_url, env_lookup(API_URL_ENV)) {
        api.base_url = v;
    }
    if let Some(v) = layered(overrides.prefix, env_lookup(PREFIX_ENV)) {
        api.prefix = v;
    }
    if let Some(v) = layered(overrides.dbname, env_lookup(DBNAME_ENV)) {
        api.dbname = v;
    }
    if let Some(v) = layered(overrides.username, env_lookup(USERNAME_ENV)) {
        api.username = v;
    }
    api
}
