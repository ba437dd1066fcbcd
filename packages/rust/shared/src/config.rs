//! Bundle configuration defaults and raw option values.
//!
//! CLI flags override environment variables, which override the defaults
//! declared here.

use std::path::PathBuf;

/// Application name, used in the about line and as the env prefix source.
pub const APP_NAME: &str = "xk6bundler";

/// Prefix of the environment variables mirroring each flag.
pub const ENV_PREFIX: &str = "XK6BUNDLER";

/// Default bundle version when none is given.
pub const DEFAULT_VERSION: &str = "SNAPSHOT";

/// Default core runtime version.
pub const DEFAULT_BASE_VERSION: &str = "latest";

/// Platforms built when none are given.
pub const DEFAULT_PLATFORMS: &[&str] = &["linux/amd64", "windows/amd64", "darwin/amd64"];

/// Default output binary path template.
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "dist/{{.Name}}_{{.Os}}_{{.Arch}}/k6{{.Ext}}";

/// Default archive path template.
pub const DEFAULT_ARCHIVE_TEMPLATE: &str = "dist/{{.Name}}_{{.Version}}_{{.Os}}_{{.Arch}}.tar.gz";

/// Language tag of Markdown code blocks listing extensions.
pub const MARKDOWN_LANGUAGE: &str = "xk6";

/// Auxiliary files packed next to each binary when present.
pub const AUX_FILES: &[&str] = &["LICENSE", "README.md"];

/// File name of the generated container build file.
pub const DOCKERFILE_NAME: &str = "Dockerfile";

// ---------------------------------------------------------------------------
// Raw options (merged from CLI flags + environment)
// ---------------------------------------------------------------------------

/// Option values exactly as the user supplied them, before normalization.
#[derive(Debug, Clone)]
pub struct BundleOptions {
    /// Bundle name; inferred from git or the working directory when `None`.
    pub name: Option<String>,
    /// Bundle version.
    pub version: String,
    /// Extension tokens in `module[@version][=replacement]` form.
    pub with: Vec<String>,
    /// Markdown document to extract more extension tokens from.
    pub markdown: Option<PathBuf>,
    /// Platform tokens in `os/arch` form.
    pub platforms: Vec<String>,
    /// Output binary path template.
    pub output: String,
    /// Archive path template.
    pub archive: String,
    /// Fork repository or local directory of the core runtime.
    pub base_repo: Option<String>,
    /// Core runtime version.
    pub base_version: String,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            name: None,
            version: DEFAULT_VERSION.to_string(),
            with: Vec::new(),
            markdown: None,
            platforms: DEFAULT_PLATFORMS.iter().map(|p| p.to_string()).collect(),
            output: DEFAULT_OUTPUT_TEMPLATE.to_string(),
            archive: DEFAULT_ARCHIVE_TEMPLATE.to_string(),
            base_repo: None,
            base_version: DEFAULT_BASE_VERSION.to_string(),
        }
    }
}

/// Name of the environment variable mirroring a long flag, e.g.
/// `k6-version` becomes `XK6BUNDLER_K6_VERSION`.
pub fn env_key(prefix: &str, flag: &str) -> String {
    format!("{prefix}_{}", flag.replace('-', "_").to_uppercase())
}
