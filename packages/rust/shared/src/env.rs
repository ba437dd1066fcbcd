//! Explicit snapshot of the process environment.
//!
//! Parsing and name inference read the working directory and environment
//! variables through [`EnvContext`] instead of the global process state, so
//! tests can hand in a fabricated environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{BundlerError, Result};

/// Variable GitHub Actions sets to `true` inside a workflow run.
pub const GITHUB_ACTIONS_VAR: &str = "GITHUB_ACTIONS";

#[derive(Debug, Clone, Default)]
pub struct EnvContext {
    cwd: PathBuf,
    vars: HashMap<String, String>,
}

impl EnvContext {
    /// Build an environment with the given working directory and no variables.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            vars: HashMap::new(),
        }
    }

    /// Capture the current process working directory and variables.
    pub fn from_process() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| BundlerError::io(".", e))?;
        Ok(Self {
            cwd,
            vars: std::env::vars().collect(),
        })
    }

    /// Add or replace a variable.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Look up a variable; empty values count as unset.
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Whether the process runs inside a GitHub Actions workflow.
    pub fn is_github_actions(&self) -> bool {
        self.var(GITHUB_ACTIONS_VAR) == Some("true")
    }
}
