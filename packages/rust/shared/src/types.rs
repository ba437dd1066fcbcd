//! Core domain types shared by the parser, planner and orchestrator.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ExtensionRef / ReplacementRef
// ---------------------------------------------------------------------------

/// An extension module compiled into the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRef {
    /// Module path, never empty and without trailing `/`.
    pub module_path: String,
    /// Opaque version string passed through to the builder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ExtensionRef {
    pub fn new(module_path: impl Into<String>, version: Option<String>) -> Self {
        Self {
            module_path: module_path.into(),
            version: version.filter(|v| !v.is_empty()),
        }
    }
}

impl fmt::Display for ExtensionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{version}", self.module_path),
            None => f.write_str(&self.module_path),
        }
    }
}

/// A local source directory substituted for a module during the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementRef {
    pub module_path: String,
    pub local_path: PathBuf,
}

impl ReplacementRef {
    pub fn new(module_path: impl Into<String>, local_path: impl Into<PathBuf>) -> Self {
        Self {
            module_path: module_path.into(),
            local_path: local_path.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// PlatformTarget
// ---------------------------------------------------------------------------

/// An (operating system, architecture) pair, using Go-style names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformTarget {
    pub os: String,
    pub arch: String,
    /// ARM variant. Reserved: parsing never sets it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm: Option<String>,
}

impl PlatformTarget {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
            arm: None,
        }
    }

    /// The platform that additionally receives a container build file.
    pub fn canonical() -> Self {
        Self::new("linux", "amd64")
    }

    /// Whether this is exactly `linux/amd64`.
    pub fn is_canonical(&self) -> bool {
        self.os == "linux" && self.arch == "amd64"
    }

    /// Executable file suffix on this platform.
    pub fn executable_extension(&self) -> &'static str {
        if self.os == "windows" { ".exe" } else { "" }
    }

    /// The platform this process runs on, translated to Go naming.
    pub fn host() -> Self {
        let os = match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        };
        let arch = match std::env::consts::ARCH {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            "powerpc64" => "ppc64",
            other => other,
        };
        Self::new(os, arch)
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

// ---------------------------------------------------------------------------
// BaseRuntime
// ---------------------------------------------------------------------------

/// Which core runtime the extensions are bundled into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseRuntime {
    /// Fork repository or local directory to build from instead of upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    /// Core version to build.
    pub version: String,
}

impl Default for BaseRuntime {
    fn default() -> Self {
        Self {
            repo: None,
            version: crate::config::DEFAULT_BASE_VERSION.to_string(),
        }
    }
}
