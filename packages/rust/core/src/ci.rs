//! GitHub Actions integration.
//!
//! Inside a workflow run (`GITHUB_ACTIONS=true`) options are read from
//! `INPUT_*` variables, the ref and repository supply default version and
//! name, and the run ends by publishing step outputs on stdout.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use xk6bundler_shared::config::{DEFAULT_VERSION, DOCKERFILE_NAME, ENV_PREFIX};
use xk6bundler_shared::{BundlerError, EnvContext, PlatformTarget, Result};
use xk6bundler_template::TemplateContext;

use crate::plan::BuildPlan;

/// Option variable prefix inside a workflow run.
pub const CI_ENV_PREFIX: &str = "INPUT";

pub const GITHUB_REF_VAR: &str = "GITHUB_REF";
pub const GITHUB_REPOSITORY_VAR: &str = "GITHUB_REPOSITORY";

/// Prefix of the environment variables mirroring each flag.
pub fn env_prefix(env: &EnvContext) -> &'static str {
    if env.is_github_actions() {
        CI_ENV_PREFIX
    } else {
        ENV_PREFIX
    }
}

/// `refs/tags/v1.2.0` gives `v1.2.0`; the ref must have three parts.
pub fn version_from_ref(git_ref: &str) -> Option<&str> {
    let mut parts = git_ref.splitn(3, '/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(_), Some(version)) if !version.is_empty() => Some(version),
        _ => None,
    }
}

/// `owner/name` gives `name`.
pub fn name_from_repository(repository: &str) -> Option<&str> {
    repository
        .split_once('/')
        .map(|(_, name)| name)
        .filter(|name| !name.is_empty())
}

/// Bundle version used when none is given explicitly.
pub fn default_version(env: &EnvContext) -> String {
    env.is_github_actions()
        .then(|| env.var(GITHUB_REF_VAR).and_then(version_from_ref))
        .flatten()
        .unwrap_or(DEFAULT_VERSION)
        .to_string()
}

/// Bundle name derived from the workflow's repository, if any.
pub fn default_name(env: &EnvContext) -> Option<String> {
    if !env.is_github_actions() {
        return None;
    }
    env.var(GITHUB_REPOSITORY_VAR)
        .and_then(name_from_repository)
        .map(String::from)
}

/// Split every value on whitespace, flattening the result.
///
/// Action inputs are single strings, so lists arrive space or newline
/// separated.
pub fn split_fields(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split_whitespace())
        .map(String::from)
        .collect()
}

/// Directory the canonical-platform binary is written to, as expanded from
/// the output template (not joined with the plan root).
pub fn docker_dir(plan: &BuildPlan) -> Result<PathBuf> {
    let context = TemplateContext::new(plan.name(), plan.version(), &PlatformTarget::canonical());
    let output = xk6bundler_template::expand("output", plan.output_template(), &context)?;

    let dir = match Path::new(&output).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok(dir)
}

/// Write the `name`, `version`, `dockerdir` and `dockerfile` step outputs.
pub fn write_outputs<W: Write>(plan: &BuildPlan, out: &mut W) -> Result<()> {
    let dir = docker_dir(plan)?;
    let dockerfile = dir.join(DOCKERFILE_NAME);

    let outputs = [
        ("name", plan.name().to_string()),
        ("version", plan.version().to_string()),
        ("dockerdir", dir.display().to_string()),
        ("dockerfile", dockerfile.display().to_string()),
    ];

    for (key, value) in &outputs {
        debug!(key = *key, value = %value, "step output");
        writeln!(out, "::set-output name={key}::{value}").map_err(|e| BundlerError::io("<stdout>", e))?;
    }

    out.flush().map_err(|e| BundlerError::io("<stdout>", e))
}

#[cfg(test)]
mod tests {
    use xk6bundler_shared::BundleOptions;
    use xk6bundler_shared::env::GITHUB_ACTIONS_VAR;

    use super::*;

    fn ci_env() -> EnvContext {
        EnvContext::new("/work").with_var(GITHUB_ACTIONS_VAR, "true")
    }

    #[test]
    fn ref_and_repository_parsing() {
        assert_eq!(version_from_ref("refs/tags/v1.2.0"), Some("v1.2.0"));
        assert_eq!(version_from_ref("refs/heads/feature/x"), Some("feature/x"));
        assert_eq!(version_from_ref("refs/tags"), None);
        assert_eq!(version_from_ref("refs/tags/"), None);

        assert_eq!(name_from_repository("szkiba/xk6bundler"), Some("xk6bundler"));
        assert_eq!(name_from_repository("xk6bundler"), None);
        assert_eq!(name_from_repository("owner/"), None);
    }

    #[test]
    fn defaults_only_apply_under_ci() {
        let local = EnvContext::new("/work")
            .with_var(GITHUB_REF_VAR, "refs/tags/v0.3.0")
            .with_var(GITHUB_REPOSITORY_VAR, "acme/k6-acme");
        assert_eq!(env_prefix(&local), "XK6BUNDLER");
        assert_eq!(default_version(&local), "SNAPSHOT");
        assert_eq!(default_name(&local), None);

        let ci = ci_env()
            .with_var(GITHUB_REF_VAR, "refs/tags/v0.3.0")
            .with_var(GITHUB_REPOSITORY_VAR, "acme/k6-acme");
        assert_eq!(env_prefix(&ci), "INPUT");
        assert_eq!(default_version(&ci), "v0.3.0");
        assert_eq!(default_name(&ci).as_deref(), Some("k6-acme"));

        assert_eq!(default_version(&ci_env()), "SNAPSHOT");
    }

    #[test]
    fn fields_are_resplit() {
        let values = vec!["a@1 b".to_string(), "\n c=/src \t".to_string()];
        assert_eq!(split_fields(&values), vec!["a@1", "b", "c=/src"]);
        assert!(split_fields(&["  ".to_string()]).is_empty());
    }

    #[test]
    fn step_outputs() {
        let options = BundleOptions {
            name: Some("acme".into()),
            version: "v1.0.0".into(),
            ..BundleOptions::default()
        };
        let plan = BuildPlan::from_options(&options, &EnvContext::new("/work")).unwrap();

        let mut out = Vec::new();
        write_outputs(&plan, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "::set-output name=name::acme\n\
             ::set-output name=version::v1.0.0\n\
             ::set-output name=dockerdir::dist/acme_linux_amd64\n\
             ::set-output name=dockerfile::dist/acme_linux_amd64/Dockerfile\n"
        );
    }

    #[test]
    fn bare_output_template_uses_current_dir() {
        let options = BundleOptions {
            name: Some("acme".into()),
            output: "k6{{.Ext}}".into(),
            ..BundleOptions::default()
        };
        let plan = BuildPlan::from_options(&options, &EnvContext::new("/work")).unwrap();
        assert_eq!(docker_dir(&plan).unwrap(), PathBuf::from("."));
    }
}
