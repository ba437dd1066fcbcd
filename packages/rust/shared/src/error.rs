//! Error types for xk6bundler.
//!
//! Library crates use [`BundlerError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all bundling operations.
#[derive(Debug, thiserror::Error)]
pub enum BundlerError {
    /// An extension token had no module path.
    #[error("module name is required: {token}")]
    MissingModule { token: String },

    /// A platform token was not in `os/arch` form.
    #[error("invalid platform: {token}")]
    InvalidPlatform { token: String },

    /// No bundle name given and none could be inferred.
    #[error("couldn't guess bundle name, please specify it")]
    MissingName,

    /// Template source could not be parsed.
    #[error("template: {name}: {message}")]
    TemplateSyntax { name: String, message: String },

    /// Template parsed but could not be executed against its context.
    #[error("template: {name}: executing: {message}")]
    TemplateRender { name: String, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The module builder failed for a platform.
    #[error("build failed for {platform}: {message}")]
    Build { platform: String, message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BundlerError>;

impl BundlerError {
    /// Create a missing-module error for the offending token.
    pub fn missing_module(token: impl Into<String>) -> Self {
        Self::MissingModule {
            token: token.into(),
        }
    }

    /// Create an invalid-platform error for the offending token.
    pub fn invalid_platform(token: impl Into<String>) -> Self {
        Self::InvalidPlatform {
            token: token.into(),
        }
    }

    /// Create a template syntax error.
    pub fn template_syntax(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::TemplateSyntax {
            name: name.into(),
            message: msg.into(),
        }
    }

    /// Create a template execution error.
    pub fn template_render(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::TemplateRender {
            name: name.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a build error for a platform.
    pub fn build(platform: impl ToString, msg: impl Into<String>) -> Self {
        Self::Build {
            platform: platform.to_string(),
            message: msg.into(),
        }
    }

    /// Whether this is an I/O error caused by a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
