// SPDX-License-Identifier: MIT

//! Runtime settings read from the environment
//!
//! `main` loads `.env` first, so these can live there too:
//! - `PERMIT_MAX_EXPRESSION_LENGTH` (characters, `0` disables the bound)
//! - `PERMIT_MAX_NESTING_DEPTH` (`0` disables the bound)
//! - `PERMIT_RULES_FILE` (rules file for the server)
//! - `PERMIT_PORT`

use std::path::PathBuf;

use crate::error::PermitError;
use crate::expression::Limits;

pub const DEFAULT_PORT: u16 = 8080;

/// Settings shared by the CLI and the server
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub limits: Limits,
    pub rules_file: Option<PathBuf>,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            rules_file: None,
            port: DEFAULT_PORT,
        }
    }
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self, PermitError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PermitError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(raw) = lookup("PERMIT_MAX_EXPRESSION_LENGTH") {
            settings.limits.max_length = parse_bound("PERMIT_MAX_EXPRESSION_LENGTH", &raw)?;
        }
        if let Some(raw) = lookup("PERMIT_MAX_NESTING_DEPTH") {
            settings.limits.max_depth = parse_bound("PERMIT_MAX_NESTING_DEPTH", &raw)?;
        }
        if let Some(path) = lookup("PERMIT_RULES_FILE").filter(|p| !p.trim().is_empty()) {
            settings.rules_file = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup("PERMIT_PORT") {
            settings.port = raw.trim().parse().map_err(|_| {
                PermitError::config(format!("PERMIT_PORT must be a port number, got '{}'", raw))
            })?;
        }

        Ok(settings)
    }
}

/// `0` means unbounded
fn parse_bound(key: &str, raw: &str) -> Result<Option<usize>, PermitError> {
    let value: usize = raw.trim().parse().map_err(|_| {
        PermitError::config(format!("{} must be a non-negative integer, got '{}'", key, raw))
    })?;
    Ok((value > 0).then_some(value))
}
