//! End-to-end pipeline runs against a stub module builder.

use std::cell::RefCell;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tempfile::TempDir;

use xk6bundler_core::{BuildPlan, BuildRequest, ModuleBuilder, SilentProgress, run};
use xk6bundler_shared::{BundleOptions, BundlerError, EnvContext, Result};

/// Writes a fake binary and records every request it receives.
#[derive(Default)]
struct StubBuilder {
    requests: RefCell<Vec<(BuildRequest, PathBuf)>>,
    fail_on: Option<&'static str>,
}

impl ModuleBuilder for StubBuilder {
    fn build(&self, request: &BuildRequest, output: &Path) -> Result<()> {
        self.requests
            .borrow_mut()
            .push((request.clone(), output.to_path_buf()));

        if self.fail_on == Some(request.platform.os.as_str()) {
            return Err(BundlerError::build(&request.platform, "stub failure"));
        }

        std::fs::write(output, format!("binary for {}", request.platform))
            .map_err(|e| BundlerError::io(output, e))
    }
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("LICENSE"), "MIT License\n").unwrap();
    dir
}

fn options(platforms: &[&str]) -> BundleOptions {
    BundleOptions {
        name: Some("acme".into()),
        version: "v1.0.0".into(),
        with: vec!["github.com/grafana/xk6-sql@v0.4.0".into(), "github.com/me/xk6-foo=.".into()],
        platforms: platforms.iter().map(|p| p.to_string()).collect(),
        ..BundleOptions::default()
    }
}

fn archive_entries(path: &Path) -> Vec<(String, String)> {
    let mut archive = tar::Archive::new(GzDecoder::new(File::open(path).unwrap()));
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().to_string_lossy().into_owned();
            let mut content = String::new();
            entry.read_to_string(&mut content).unwrap();
            (name, content)
        })
        .collect()
}

#[test]
fn two_platforms_produce_binaries_archives_and_one_dockerfile() {
    let dir = project();
    let env = EnvContext::new(dir.path());
    let plan = BuildPlan::from_options(&options(&["linux/amd64", "windows/amd64"]), &env).unwrap();
    let builder = StubBuilder::default();

    let result = run(&plan, &builder, &SilentProgress).unwrap();
    assert_eq!(result.artifacts.len(), 2);

    let root = dir.path();
    let linux_bin = root.join("dist/acme_linux_amd64/k6");
    let windows_bin = root.join("dist/acme_windows_amd64/k6.exe");
    assert!(linux_bin.is_file());
    assert!(windows_bin.is_file());

    let linux_tgz = root.join("dist/acme_v1.0.0_linux_amd64.tar.gz");
    let windows_tgz = root.join("dist/acme_v1.0.0_windows_amd64.tar.gz");
    assert_eq!(result.artifacts[0].archive, linux_tgz);
    assert_eq!(result.artifacts[1].archive, windows_tgz);

    // Only the canonical platform gets a container build file.
    assert_eq!(
        result.artifacts[0].dockerfile.as_deref(),
        Some(root.join("dist/acme_linux_amd64/Dockerfile").as_path())
    );
    assert_eq!(result.artifacts[1].dockerfile, None);
    assert!(!root.join("dist/acme_windows_amd64/Dockerfile").exists());

    // README.md is absent, so each archive holds the binary and LICENSE.
    assert_eq!(
        archive_entries(&windows_tgz),
        vec![
            ("k6.exe".to_string(), "binary for windows/amd64".to_string()),
            ("LICENSE".to_string(), "MIT License\n".to_string()),
        ]
    );

    let requests = builder.requests.borrow();
    let (request, output) = &requests[0];
    assert_eq!(output, &linux_bin);
    assert!(!request.cgo_enabled);
    assert_eq!(request.base.version, "latest");
    assert_eq!(request.extensions.len(), 2);
    assert_eq!(request.replacements[0].local_path, root);
}

#[test]
fn failure_stops_before_later_platforms() {
    let dir = project();
    let env = EnvContext::new(dir.path());
    let plan = BuildPlan::from_options(&options(&["linux/amd64", "darwin/arm64", "windows/amd64"]), &env).unwrap();
    let builder = StubBuilder {
        fail_on: Some("darwin"),
        ..StubBuilder::default()
    };

    let err = run(&plan, &builder, &SilentProgress).unwrap_err();
    assert_eq!(err.to_string(), "build failed for darwin/arm64: stub failure");

    // Platforms before the failure are complete, later ones never start.
    assert!(dir.path().join("dist/acme_v1.0.0_linux_amd64.tar.gz").is_file());
    assert!(!dir.path().join("dist/acme_v1.0.0_darwin_arm64.tar.gz").exists());
    assert!(!dir.path().join("dist/acme_windows_amd64").exists());
    assert_eq!(builder.requests.borrow().len(), 2);
}

#[test]
fn template_errors_abort_before_building() {
    let dir = project();
    let env = EnvContext::new(dir.path());
    let plan = BuildPlan::from_options(
        &BundleOptions {
            output: "dist/{{.Missing}}/k6".into(),
            ..options(&["linux/amd64"])
        },
        &env,
    )
    .unwrap();
    let builder = StubBuilder::default();

    let err = run(&plan, &builder, &SilentProgress).unwrap_err();
    assert!(matches!(err, BundlerError::TemplateRender { .. }), "{err}");
    assert!(builder.requests.borrow().is_empty());
}
