// SPDX-License-Identifier: MIT

//! Environment configuration

use std::env;
use std::path::{Path, PathBuf};

use crate::error::QuestflowError;

const QUESTIONNAIRE_DIR_VAR: &str = "QUESTFLOW_QUESTIONNAIRE_DIR";
const STRICT_VAR: &str = "QUESTFLOW_STRICT";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base directory for relative questionnaire paths
    pub questionnaire_dir: PathBuf,
    /// Treat validation warnings as failures
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            questionnaire_dir: PathBuf::from("."),
            strict: false,
        }
    }
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, QuestflowError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, QuestflowError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(dir) = lookup(QUESTIONNAIRE_DIR_VAR) {
            config.questionnaire_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(STRICT_VAR) {
            config.strict = parse_bool(&raw).ok_or_else(|| {
                QuestflowError::config(format!("{} must be a boolean, got '{}'", STRICT_VAR, raw))
            })?;
        }
        Ok(config)
    }

    /// Resolve a questionnaire path against `questionnaire_dir`. Absolute
    /// paths are returned unchanged.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.questionnaire_dir.join(path)
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
