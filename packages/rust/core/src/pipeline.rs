//! End-to-end bundle pipeline: plan → per-platform build → Dockerfile → archive.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use xk6bundler_shared::{BundlerError, PlatformTarget, Result};
use xk6bundler_template::TemplateContext;

use crate::builder::{BuildRequest, ModuleBuilder};
use crate::plan::BuildPlan;

/// Files produced for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleArtifacts {
    pub platform: PlatformTarget,
    /// Path to the built binary.
    pub binary: PathBuf,
    /// Path to the `.tar.gz` archive.
    pub archive: PathBuf,
    /// Container build file, only written for `linux/amd64`.
    pub dockerfile: Option<PathBuf>,
}

/// Result of a full bundling run.
#[derive(Debug)]
pub struct BundleResult {
    /// Artifacts per platform, in build order.
    pub artifacts: Vec<BundleArtifacts>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called before a platform is built. `index` is 1-based.
    fn platform_started(&self, platform: &PlatformTarget, index: usize, total: usize);
    /// Called once a platform's archive is closed.
    fn platform_finished(&self, artifacts: &BundleArtifacts);
    /// Called when every platform has been bundled.
    fn done(&self, result: &BundleResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn platform_started(&self, _platform: &PlatformTarget, _index: usize, _total: usize) {}
    fn platform_finished(&self, _artifacts: &BundleArtifacts) {}
    fn done(&self, _result: &BundleResult) {}
}

/// Bundle every platform of `plan`, strictly one after another.
///
/// The first failing platform aborts the run; artifacts of platforms that
/// already finished stay on disk.
#[instrument(skip_all, fields(name = %plan.name(), version = %plan.version()))]
pub fn run(
    plan: &BuildPlan,
    builder: &dyn ModuleBuilder,
    progress: &dyn ProgressReporter,
) -> Result<BundleResult> {
    let start = Instant::now();
    let total = plan.platforms().len();

    info!(platforms = total, "starting bundle pipeline");

    let mut artifacts = Vec::with_capacity(total);
    for (i, platform) in plan.platforms().iter().enumerate() {
        progress.platform_started(platform, i + 1, total);
        let bundled = bundle_platform(plan, platform, builder)?;
        progress.platform_finished(&bundled);
        artifacts.push(bundled);
    }

    let result = BundleResult {
        artifacts,
        elapsed: start.elapsed(),
    };

    info!(elapsed_ms = result.elapsed.as_millis() as u64, "bundle pipeline complete");
    progress.done(&result);

    Ok(result)
}

/// Build, optionally containerize, and archive a single platform.
#[instrument(skip_all, fields(platform = %platform))]
pub fn bundle_platform(
    plan: &BuildPlan,
    platform: &PlatformTarget,
    builder: &dyn ModuleBuilder,
) -> Result<BundleArtifacts> {
    let context = TemplateContext::new(plan.name(), plan.version(), platform);
    let binary = plan.resolve(xk6bundler_template::expand("output", plan.output_template(), &context)?);
    let archive = plan.resolve(xk6bundler_template::expand("archive", plan.archive_template(), &context)?);

    create_parent(&binary)?;

    let request = BuildRequest::new(platform.clone())
        .extensions(plan.extensions())
        .replacements(plan.replacements())
        .cgo_enabled(false)
        .base(plan.base().clone());
    builder.build(&request, &binary)?;

    info!(binary = %binary.display(), "binary built");

    let dockerfile = if platform.is_canonical() {
        Some(xk6bundler_artifacts::write_dockerfile(&binary)?)
    } else {
        None
    };

    xk6bundler_artifacts::package(&archive, &binary, plan.aux_files())?;

    Ok(BundleArtifacts {
        platform: platform.clone(),
        binary,
        archive,
        dockerfile,
    })
}

fn create_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|e| BundlerError::io(dir, e))
        }
        _ => Ok(()),
    }
}
