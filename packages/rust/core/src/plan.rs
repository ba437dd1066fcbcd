//! Normalization of raw options into an immutable [`BuildPlan`].

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use xk6bundler_shared::config::{AUX_FILES, MARKDOWN_LANGUAGE};
use xk6bundler_shared::{
    BaseRuntime, BundleOptions, EnvContext, ExtensionRef, PlatformTarget, ReplacementRef, Result,
};

use crate::{ci, name, spec};

/// The fully resolved inputs of a bundling run.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    name: String,
    version: String,
    extensions: Vec<ExtensionRef>,
    replacements: Vec<ReplacementRef>,
    platforms: Vec<PlatformTarget>,
    output_template: String,
    archive_template: String,
    base: BaseRuntime,
    root: PathBuf,
    aux_files: Vec<PathBuf>,
}

impl BuildPlan {
    /// Normalize `options` against `env`.
    ///
    /// Steps run in a fixed order and the first failure wins: CI re-splitting
    /// of list values, Markdown extraction, extension parsing, platform
    /// parsing, name resolution.
    #[instrument(skip_all)]
    pub fn from_options(options: &BundleOptions, env: &EnvContext) -> Result<Self> {
        let (mut with, platform_tokens) = if env.is_github_actions() {
            (ci::split_fields(&options.with), ci::split_fields(&options.platforms))
        } else {
            (options.with.clone(), options.platforms.clone())
        };

        if let Some(markdown) = &options.markdown {
            let path = env.cwd().join(markdown);
            with.extend(xk6bundler_markdown::extract_from_document(&path, MARKDOWN_LANGUAGE)?);
        }

        let mut extensions = Vec::with_capacity(with.len());
        let mut replacements = Vec::new();
        for token in &with {
            let (extension, replacement) = spec::parse_extension(token, env)?;
            extensions.push(extension);
            replacements.extend(replacement);
        }

        let platforms = platform_tokens
            .iter()
            .map(|token| spec::parse_platform(token))
            .collect::<Result<Vec<_>>>()?;
        if platforms.is_empty() {
            warn!("no target platforms given, nothing will be built");
        }

        let explicit = options.name.clone().or_else(|| ci::default_name(env));
        let name = name::resolve_name(explicit.as_deref(), env)?;

        let root = env.cwd().to_path_buf();
        let aux_files = AUX_FILES.iter().map(|f| root.join(f)).collect();

        let plan = Self {
            name,
            version: options.version.clone(),
            extensions,
            replacements,
            platforms,
            output_template: options.output.clone(),
            archive_template: options.archive.clone(),
            base: BaseRuntime {
                repo: options.base_repo.clone().filter(|r| !r.is_empty()),
                version: options.base_version.clone(),
            },
            root,
            aux_files,
        };

        info!(
            name = %plan.name,
            version = %plan.version,
            extensions = plan.extensions.len(),
            platforms = plan.platforms.len(),
            "build plan ready"
        );
        debug!(?plan, "resolved plan");

        Ok(plan)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn extensions(&self) -> &[ExtensionRef] {
        &self.extensions
    }

    pub fn replacements(&self) -> &[ReplacementRef] {
        &self.replacements
    }

    pub fn platforms(&self) -> &[PlatformTarget] {
        &self.platforms
    }

    pub fn output_template(&self) -> &str {
        &self.output_template
    }

    pub fn archive_template(&self) -> &str {
        &self.archive_template
    }

    pub fn base(&self) -> &BaseRuntime {
        &self.base
    }

    /// Directory relative artifact paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Auxiliary files packed into every archive when they exist.
    pub fn aux_files(&self) -> &[PathBuf] {
        &self.aux_files
    }

    /// Resolve an expanded artifact path against the plan root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }
}
