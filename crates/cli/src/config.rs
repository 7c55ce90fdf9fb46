//! Optional configuration file for `switchctl`.

use std::env::VarError;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use fn_error_context::context;
use serde::Deserialize;

use crate::output::Format;

/// The environment variable that can be used to name a config file.
const CONFIG_VAR: &str = "SWITCHCTL_CONFIG";

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub(crate) struct Config {
    /// Output format used when `--format` is not given.
    pub(crate) format: Option<Format>,
    /// Elements appended after every parse, before those from `--append`.
    pub(crate) append: Vec<String>,
}

impl Config {
    /// Load the file named by `SWITCHCTL_CONFIG`, if set.
    #[context("Loading config")]
    pub(crate) fn load() -> Result<Option<Self>> {
        let path = match std::env::var(CONFIG_VAR) {
            Ok(path) => Utf8PathBuf::from(path),
            Err(VarError::NotPresent) => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("Reading {CONFIG_VAR}")),
        };
        tracing::debug!("loading config from {path}");
        Self::load_from(&path).map(Some)
    }

    pub(crate) fn load_from(path: &Utf8Path) -> Result<Self> {
        let buf =
            std::fs::read_to_string(path).with_context(|| format!("Opening {path}"))?;
        toml::from_str(&buf).with_context(|| format!("Parsing config from {path}"))
    }
}
