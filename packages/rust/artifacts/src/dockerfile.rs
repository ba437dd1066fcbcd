//! Container build file emitted next to the canonical-platform binary.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use xk6bundler_shared::config::DOCKERFILE_NAME;
use xk6bundler_shared::{BundlerError, Result};

/// Embedded `Dockerfile` template; `{{.Output}}` is the binary's base name.
pub const DOCKERFILE_TEMPLATE: &str = include_str!("../templates/Dockerfile");

/// Render the container build file for `binary`. Never built here.
pub fn render_dockerfile(binary: &Path) -> Result<String> {
    let output = binary
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut data = BTreeMap::new();
    data.insert("Output", output);

    xk6bundler_template::expand(DOCKERFILE_NAME, DOCKERFILE_TEMPLATE, &data)
}

/// Write `Dockerfile` into the directory containing `binary`.
#[instrument(skip_all, fields(binary = %binary.display()))]
pub fn write_dockerfile(binary: &Path) -> Result<PathBuf> {
    let dir = binary.parent().unwrap_or_else(|| Path::new("."));
    let path = dir.join(DOCKERFILE_NAME);

    let content = render_dockerfile(binary)?;
    std::fs::write(&path, content).map_err(|e| BundlerError::io(&path, e))?;

    info!(path = %path.display(), "container build file written");
    Ok(path)
}
