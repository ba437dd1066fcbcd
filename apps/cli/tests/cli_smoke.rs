//! CLI smoke tests for xk6bundler.
//!
//! These run the real binary against a temporary project directory. Builds
//! go through `sh` reading a `build` script in that directory instead of xk6.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Stand-in for `xk6 build`: writes `GOOS/GOARCH` into the `--output` file.
const FAKE_BUILD: &str = r#"
while [ $# -gt 0 ]; do
  if [ "$1" = "--output" ]; then
    printf '%s/%s' "$GOOS" "$GOARCH" > "$2"
  fi
  shift
done
"#;

const ISOLATED_VARS: &[&str] = &[
    "GITHUB_ACTIONS",
    "GITHUB_REF",
    "GITHUB_REPOSITORY",
    "RUST_LOG",
    "XK6BUNDLER_NAME",
    "XK6BUNDLER_VERSION",
    "XK6BUNDLER_WITH",
    "XK6BUNDLER_PLATFORM",
    "XK6BUNDLER_XK6",
    "INPUT_NAME",
    "INPUT_VERSION",
    "INPUT_WITH",
    "INPUT_PLATFORM",
    "INPUT_XK6",
];

/// Get a Command for the xk6bundler binary with a clean environment.
fn bundler_cmd(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("xk6bundler");
    cmd.current_dir(dir.path());
    for var in ISOLATED_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("build"), FAKE_BUILD).unwrap();
    std::fs::write(dir.path().join("README.md"), "# Acme\n\n```xk6\ngithub.com/grafana/xk6-sql\n```\n").unwrap();
    dir
}

// =============================================================================
// About & Help
// =============================================================================

#[test]
fn about_flag_prints_to_stderr() {
    let dir = project();
    bundler_cmd(&dir)
        .arg("-V")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::starts_with("xk6bundler/"));
}

#[test]
fn help_lists_flags() {
    let dir = project();
    bundler_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--k6-version"))
        .stdout(predicate::str::contains("--platform"));
}

// =============================================================================
// Option errors
// =============================================================================

#[test]
fn invalid_platform_fails() {
    let dir = project();
    bundler_cmd(&dir)
        .args(["-n", "acme", "-p", "linux"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid platform: linux"));
}

#[test]
fn missing_module_fails() {
    let dir = project();
    bundler_cmd(&dir)
        .args(["-n", "acme", "-w", "@1.0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("module name is required: @1.0"));
}

#[test]
fn platform_from_environment() {
    let dir = project();
    bundler_cmd(&dir)
        .env("XK6BUNDLER_PLATFORM", "bogus")
        .args(["-n", "acme"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid platform: bogus"));
}

#[test]
fn unknown_flag_exits_with_one() {
    let dir = project();
    bundler_cmd(&dir).arg("--no-such-flag").assert().code(1);
}

// =============================================================================
// Bundling
// =============================================================================

#[cfg(unix)]
#[test]
fn bundles_with_builder_executable() {
    let dir = project();
    bundler_cmd(&dir)
        .args(["-n", "acme", "-v", "v1.0.0", "-m", "README.md"])
        .args(["-p", "linux/amd64", "-p", "windows/arm64", "--xk6", "sh"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let root = dir.path();
    assert_eq!(
        std::fs::read_to_string(root.join("dist/acme_linux_amd64/k6")).unwrap(),
        "linux/amd64"
    );
    assert!(root.join("dist/acme_windows_arm64/k6.exe").is_file());
    assert!(root.join("dist/acme_linux_amd64/Dockerfile").is_file());
    assert!(!root.join("dist/acme_windows_arm64/Dockerfile").exists());
    assert!(root.join("dist/acme_v1.0.0_linux_amd64.tar.gz").is_file());
    assert!(root.join("dist/acme_v1.0.0_windows_arm64.tar.gz").is_file());
}

#[cfg(unix)]
#[test]
fn github_actions_inputs_and_outputs() {
    let dir = project();
    bundler_cmd(&dir)
        .env("GITHUB_ACTIONS", "true")
        .env("GITHUB_REF", "refs/tags/v0.2.0")
        .env("GITHUB_REPOSITORY", "acme/k6-acme")
        .env("INPUT_PLATFORM", "linux/amd64")
        .env("INPUT_XK6", "sh")
        .assert()
        .success()
        .stdout(predicate::str::contains("::set-output name=name::k6-acme\n"))
        .stdout(predicate::str::contains("::set-output name=version::v0.2.0\n"))
        .stdout(predicate::str::contains("::set-output name=dockerdir::dist/k6-acme_linux_amd64\n"))
        .stdout(predicate::str::contains(
            "::set-output name=dockerfile::dist/k6-acme_linux_amd64/Dockerfile\n",
        ));

    assert!(dir.path().join("dist/k6-acme_v0.2.0_linux_amd64.tar.gz").is_file());
}

#[cfg(unix)]
#[test]
fn github_actions_empty_version_input_uses_ref() {
    let dir = project();
    bundler_cmd(&dir)
        .env("GITHUB_ACTIONS", "true")
        .env("GITHUB_REF", "refs/tags/v0.3.0")
        .env("INPUT_NAME", "acme")
        .env("INPUT_VERSION", "")
        .env("INPUT_PLATFORM", "linux/amd64")
        .env("INPUT_XK6", "sh")
        .assert()
        .success()
        .stdout(predicate::str::contains("::set-output name=version::v0.3.0\n"));

    assert!(dir.path().join("dist/acme_v0.3.0_linux_amd64.tar.gz").is_file());
}

#[test]
fn builder_failure_is_reported() {
    let dir = project();
    bundler_cmd(&dir)
        .args(["-n", "acme", "-p", "linux/amd64", "--xk6", "xk6bundler-no-such-builder"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("build failed for linux/amd64"));
}
