//! Bundle name inference.
//!
//! Without an explicit name, the bundle is named after the `origin` remote of
//! the git repository in the working directory, or else after the working
//! directory itself.

use std::path::Path;

use gix::remote::Direction;
use tracing::debug;

use xk6bundler_shared::{BundlerError, EnvContext, Result};

/// Use `explicit` when non-empty, otherwise infer a name from `env`.
pub fn resolve_name(explicit: Option<&str>, env: &EnvContext) -> Result<String> {
    match explicit.filter(|n| !n.is_empty()) {
        Some(name) => Ok(name.to_string()),
        None => guess_name(env).ok_or(BundlerError::MissingName),
    }
}

/// Guess a name from the git origin remote, falling back to the directory name.
pub fn guess_name(env: &EnvContext) -> Option<String> {
    origin_name(env.cwd()).or_else(|| dir_name(env.cwd()))
}

fn origin_name(dir: &Path) -> Option<String> {
    let repo = match gix::open(dir) {
        Ok(repo) => repo,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "no git repository");
            return None;
        }
    };

    let remote = repo.find_remote("origin").ok()?;
    let url = remote.url(Direction::Fetch)?;
    let name = name_from_remote_url(&url.to_bstring().to_string());

    debug!(?name, "name from origin remote");
    name
}

fn dir_name(dir: &Path) -> Option<String> {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
}

/// Last path segment of a remote URL without a `.git` suffix.
///
/// Handles both URL and scp-like (`git@host:owner/repo.git`) forms.
pub fn name_from_remote_url(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(trimmed);
    let name = last.strip_suffix(".git").unwrap_or(last);

    (!name.is_empty()).then(|| name.to_string())
}
