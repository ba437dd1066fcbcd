//! The module builder seam and its `xk6`-backed implementation.
//!
//! The orchestrator hands a [`BuildRequest`] and an output path to a
//! [`ModuleBuilder`]; how the binary is produced is up to the implementation.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, info, instrument};

use xk6bundler_shared::{BaseRuntime, BundlerError, ExtensionRef, PlatformTarget, ReplacementRef, Result};

/// Compiles a bundle binary for one platform.
pub trait ModuleBuilder {
    /// Build `request` into the file at `output`. The parent directory exists.
    fn build(&self, request: &BuildRequest, output: &Path) -> Result<()>;
}

// ---------------------------------------------------------------------------
// BuildRequest
// ---------------------------------------------------------------------------

/// Everything the builder needs for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub platform: PlatformTarget,
    pub extensions: Vec<ExtensionRef>,
    pub replacements: Vec<ReplacementRef>,
    pub cgo_enabled: bool,
    pub base: BaseRuntime,
}

impl BuildRequest {
    pub fn new(platform: PlatformTarget) -> Self {
        Self {
            platform,
            extensions: Vec::new(),
            replacements: Vec::new(),
            cgo_enabled: false,
            base: BaseRuntime::default(),
        }
    }

    pub fn extensions(mut self, extensions: impl Into<Vec<ExtensionRef>>) -> Self {
        self.extensions = extensions.into();
        self
    }

    pub fn replacements(mut self, replacements: impl Into<Vec<ReplacementRef>>) -> Self {
        self.replacements = replacements.into();
        self
    }

    pub fn cgo_enabled(mut self, enabled: bool) -> Self {
        self.cgo_enabled = enabled;
        self
    }

    pub fn base(mut self, base: BaseRuntime) -> Self {
        self.base = base;
        self
    }

    /// The effective replacement for `module`; later entries override earlier ones.
    fn replacement_for(&self, module: &str) -> Option<&ReplacementRef> {
        self.replacements.iter().rev().find(|r| r.module_path == module)
    }
}

// ---------------------------------------------------------------------------
// Xk6Builder
// ---------------------------------------------------------------------------

/// Default name of the builder executable looked up on `PATH`.
pub const DEFAULT_XK6: &str = "xk6";

/// Runs `xk6 build` as a child process.
#[derive(Debug, Clone)]
pub struct Xk6Builder {
    executable: OsString,
}

impl Default for Xk6Builder {
    fn default() -> Self {
        Self::new(DEFAULT_XK6)
    }
}

impl Xk6Builder {
    pub fn new(executable: impl Into<OsString>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Command-line arguments for building `request` into `output`.
    ///
    /// Each extension becomes one `--with` flag, carrying its replacement when
    /// one exists for the same module. Replacements for modules that are not
    /// extensions are passed with `--replace`.
    pub fn command_args(request: &BuildRequest, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "build".into(),
            request.base.version.clone().into(),
            "--output".into(),
            output.as_os_str().to_owned(),
        ];

        for ext in &request.extensions {
            let mut with = OsString::from(ext.to_string());
            if let Some(repl) = request.replacement_for(&ext.module_path) {
                with.push("=");
                with.push(&repl.local_path);
            }
            args.push("--with".into());
            args.push(with);
        }

        for (i, repl) in request.replacements.iter().enumerate() {
            let overridden = request.replacements[i + 1..]
                .iter()
                .any(|later| later.module_path == repl.module_path);
            if overridden || request.extensions.iter().any(|e| e.module_path == repl.module_path) {
                continue;
            }
            let mut replace = OsString::from(format!("{}=", repl.module_path));
            replace.push(&repl.local_path);
            args.push("--replace".into());
            args.push(replace);
        }

        args
    }

    /// Environment variables selecting the target platform and base runtime.
    pub fn command_env(request: &BuildRequest) -> Vec<(&'static str, String)> {
        let mut env = vec![
            ("GOOS", request.platform.os.clone()),
            ("GOARCH", request.platform.arch.clone()),
            ("CGO_ENABLED", if request.cgo_enabled { "1" } else { "0" }.to_string()),
        ];
        if let Some(arm) = &request.platform.arm {
            env.push(("GOARM", arm.clone()));
        }
        if let Some(repo) = &request.base.repo {
            env.push(("XK6_K6_REPO", repo.clone()));
        }
        env
    }
}

impl ModuleBuilder for Xk6Builder {
    #[instrument(skip_all, fields(platform = %request.platform))]
    fn build(&self, request: &BuildRequest, output: &Path) -> Result<()> {
        let mut command = Command::new(&self.executable);
        command
            .args(Self::command_args(request, output))
            .envs(Self::command_env(request))
            .stdin(Stdio::null());

        info!(
            extensions = request.extensions.len(),
            base = %request.base.version,
            "running builder"
        );

        let result = command.output().map_err(|e| {
            BundlerError::build(
                &request.platform,
                format!("failed to run {}: {e}", self.executable.to_string_lossy()),
            )
        })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(BundlerError::build(&request.platform, stderr.trim_end()));
        }

        debug!(
            stdout = %String::from_utf8_lossy(&result.stdout),
            stderr = %String::from_utf8_lossy(&result.stderr),
            "builder finished"
        );

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
