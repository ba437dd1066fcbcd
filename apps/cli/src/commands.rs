//! CLI flag definitions, environment binding, tracing setup and dispatch.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use xk6bundler_core::builder::DEFAULT_XK6;
use xk6bundler_core::pipeline::{BundleArtifacts, BundleResult, ProgressReporter};
use xk6bundler_core::{BuildPlan, Xk6Builder, ci};
use xk6bundler_shared::config::{
    APP_NAME, DEFAULT_ARCHIVE_TEMPLATE, DEFAULT_BASE_VERSION, DEFAULT_OUTPUT_TEMPLATE,
    DEFAULT_PLATFORMS, DEFAULT_VERSION, ENV_PREFIX,
};
use xk6bundler_shared::{BundleOptions, EnvContext, PlatformTarget};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Bundle k6 with extensions as fast and easily as possible.
#[derive(Parser, Debug)]
#[command(name = "xk6bundler", disable_version_flag = true, long_about = None)]
pub(crate) struct Cli {
    /// Show version information.
    #[arg(short = 'V')]
    pub about: bool,

    /// Short name of the bundle.
    #[arg(short, long, value_name = "name", env = "XK6BUNDLER_NAME")]
    pub name: Option<String>,

    /// Bundle version.
    #[arg(
        short = 'v',
        long = "version",
        value_name = "version",
        env = "XK6BUNDLER_VERSION",
        default_value = DEFAULT_VERSION
    )]
    pub bundle_version: String,

    /// Add extension in 'module[@version][=replacement]' format. Can be used
    /// multiple times. A '.' replacement means the current directory.
    #[arg(short, long, value_name = "extension", env = "XK6BUNDLER_WITH", value_delimiter = ',')]
    pub with: Vec<String>,

    /// Extract extension list from Markdown code blocks tagged 'xk6'.
    #[arg(short, long, value_name = "markdown", env = "XK6BUNDLER_MARKDOWN")]
    pub markdown: Option<PathBuf>,

    /// Add target platform in 'os/arch' format. Can be used multiple times.
    #[arg(
        short,
        long,
        value_name = "target",
        env = "XK6BUNDLER_PLATFORM",
        value_delimiter = ',',
        default_values = DEFAULT_PLATFORMS.iter().copied()
    )]
    pub platform: Vec<String>,

    /// Output file path template.
    #[arg(short, long, value_name = "path", env = "XK6BUNDLER_OUTPUT", default_value = DEFAULT_OUTPUT_TEMPLATE)]
    pub output: String,

    /// Archive (.tar.gz) file path template.
    #[arg(short, long, value_name = "path", env = "XK6BUNDLER_ARCHIVE", default_value = DEFAULT_ARCHIVE_TEMPLATE)]
    pub archive: String,

    /// Build using a k6 fork repository or local directory.
    #[arg(long = "k6-repo", value_name = "repo", env = "XK6BUNDLER_K6_REPO")]
    pub k6_repo: Option<String>,

    /// The core k6 version to build.
    #[arg(long = "k6-version", value_name = "version", env = "XK6BUNDLER_K6_VERSION", default_value = DEFAULT_BASE_VERSION)]
    pub k6_version: String,

    /// Builder executable.
    #[arg(long, value_name = "path", env = "XK6BUNDLER_XK6", default_value = DEFAULT_XK6)]
    pub xk6: OsString,

    /// Log format: text (default) or json.
    #[arg(long, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (--verbose, --verbose --verbose).
    #[arg(long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

impl Cli {
    /// Raw option values for plan normalization.
    ///
    /// Empty values count as unset, so an empty `INPUT_VERSION` still gets the
    /// version from the workflow ref.
    pub fn options(&self, env: &EnvContext) -> BundleOptions {
        let version = match self.bundle_version.as_str() {
            "" => ci::default_version(env),
            given => given.to_string(),
        };

        BundleOptions {
            name: self.name.clone().filter(|n| !n.is_empty()),
            version,
            with: self.with.clone(),
            markdown: self.markdown.clone().filter(|m| !m.as_os_str().is_empty()),
            platforms: self.platform.clone(),
            output: self.output.clone(),
            archive: self.archive.clone(),
            base_repo: self.k6_repo.clone(),
            base_version: self.k6_version.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Build the clap command for `env`.
///
/// Inside GitHub Actions every environment binding moves from the
/// `XK6BUNDLER_` prefix to `INPUT_`, and the version defaults to the one in
/// the workflow's git ref.
pub(crate) fn command(env: &EnvContext) -> clap::Command {
    let prefix = ci::env_prefix(env);

    Cli::command()
        .mut_args(|arg| {
            let renamed = arg
                .get_env()
                .map(|key| key.to_string_lossy().replacen(ENV_PREFIX, prefix, 1));
            match renamed {
                Some(key) if prefix != ENV_PREFIX => arg.env(key),
                _ => arg,
            }
        })
        .mut_arg("bundle_version", |arg| arg.default_value(ci::default_version(env)))
}

/// Parse `args`, exiting on `--help` or usage errors.
pub(crate) fn parse<I, T>(env: &EnvContext, args: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches: ArgMatches = match command(env).try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(err) => exit_with(err),
    };
    Cli::from_arg_matches(&matches).unwrap_or_else(|err| exit_with(err))
}

fn exit_with(err: clap::Error) -> ! {
    if !err.use_stderr() {
        err.exit();
    }
    let _ = err.print();
    std::process::exit(1);
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber. Logs always go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "xk6bundler=info",
        1 => "xk6bundler=debug",
        _ => "xk6bundler=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// `xk6bundler/<version> <os>/<arch>`
pub(crate) fn about_line() -> String {
    format!("{APP_NAME}/{} {}", env!("CARGO_PKG_VERSION"), PlatformTarget::host())
}

/// Run the bundler for the parsed flags.
pub(crate) fn run(cli: Cli, env: &EnvContext) -> Result<()> {
    if cli.about {
        eprintln!("{}", about_line());
        return Ok(());
    }

    let plan = BuildPlan::from_options(&cli.options(env), env)?;
    let builder = Xk6Builder::new(cli.xk6);

    let progress = CliProgress::new();
    let result = xk6bundler_core::run(&plan, &builder, &progress);
    if result.is_err() {
        progress.clear();
    }
    let result = result?;

    for artifacts in &result.artifacts {
        info!(
            platform = %artifacts.platform,
            archive = %artifacts.archive.display(),
            "bundled"
        );
    }

    if env.is_github_actions() {
        ci::write_outputs(&plan, &mut std::io::stdout().lock())?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner on stderr.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn clear(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn platform_started(&self, platform: &PlatformTarget, index: usize, total: usize) {
        self.spinner
            .set_message(format!("Building [{index}/{total}] {platform}"));
    }

    fn platform_finished(&self, artifacts: &BundleArtifacts) {
        self.spinner.println(format!(
            "  {} -> {}",
            artifacts.platform,
            artifacts.archive.display()
        ));
    }

    fn done(&self, result: &BundleResult) {
        self.spinner.finish_and_clear();
        eprintln!(
            "Bundled {} platform(s) in {:.1}s",
            result.artifacts.len(),
            result.elapsed.as_secs_f64()
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use xk6bundler_shared::env::GITHUB_ACTIONS_VAR;

    use super::*;

    fn parse_with(env: &EnvContext, args: &[&str]) -> Cli {
        let matches = command(env)
            .try_get_matches_from(std::iter::once("xk6bundler").chain(args.iter().copied()))
            .expect("valid args");
        Cli::from_arg_matches(&matches).expect("cli")
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let env = EnvContext::new("/work");
        let cli = parse_with(&env, &[]);
        let options = cli.options(&env);
        assert_eq!(options.name, None);
        assert_eq!(options.version, "SNAPSHOT");
        assert_eq!(options.platforms, vec!["linux/amd64", "windows/amd64", "darwin/amd64"]);
        assert_eq!(options.output, DEFAULT_OUTPUT_TEMPLATE);
        assert_eq!(options.archive, DEFAULT_ARCHIVE_TEMPLATE);
        assert_eq!(options.base_version, "latest");
        assert_eq!(cli.xk6, OsString::from("xk6"));
    }

    #[test]
    fn short_flags_and_repeats() {
        let env = EnvContext::new("/work");
        let cli = parse_with(
            &env,
            &["-n", "acme", "-v", "v1.0.0", "-w", "a@1", "-w", "b,c", "-p", "linux/arm64", "-V"],
        );
        assert!(cli.about);
        let options = cli.options(&env);
        assert_eq!(options.name.as_deref(), Some("acme"));
        assert_eq!(options.version, "v1.0.0");
        assert_eq!(options.with, vec!["a@1", "b", "c"]);
        assert_eq!(options.platforms, vec!["linux/arm64"]);
    }

    #[test]
    fn ci_version_default_comes_from_ref() {
        let env = EnvContext::new("/work")
            .with_var(GITHUB_ACTIONS_VAR, "true")
            .with_var("GITHUB_REF", "refs/tags/v2.0.0");
        assert_eq!(parse_with(&env, &[]).bundle_version, "v2.0.0");
        assert_eq!(parse_with(&env, &["-v", "v3"]).bundle_version, "v3");
    }

    #[test]
    fn empty_version_falls_back_to_ref() {
        let env = EnvContext::new("/work")
            .with_var(GITHUB_ACTIONS_VAR, "true")
            .with_var("GITHUB_REF", "refs/tags/v2.0.0");
        let cli = parse_with(&env, &["-v", "", "-n", ""]);
        let options = cli.options(&env);
        assert_eq!(options.version, "v2.0.0");
        assert_eq!(options.name, None);

        let local = EnvContext::new("/work");
        assert_eq!(parse_with(&local, &["-v", ""]).options(&local).version, "SNAPSHOT");
    }

    #[test]
    fn ci_swaps_env_prefix() {
        let env = EnvContext::new("/work").with_var(GITHUB_ACTIONS_VAR, "true");
        let cmd = command(&env);
        let name = cmd
            .get_arguments()
            .find(|a| a.get_id() == "name")
            .and_then(|a| a.get_env())
            .map(|k| k.to_string_lossy().into_owned());
        assert_eq!(name.as_deref(), Some("INPUT_NAME"));

        let cmd = command(&EnvContext::new("/work"));
        let version = cmd
            .get_arguments()
            .find(|a| a.get_id() == "k6_version")
            .and_then(|a| a.get_env())
            .map(|k| k.to_string_lossy().into_owned());
        assert_eq!(version.as_deref(), Some("XK6BUNDLER_K6_VERSION"));
    }

    #[test]
    fn about_line_format() {
        let line = about_line();
        assert!(line.starts_with("xk6bundler/"));
        assert!(line.ends_with(&PlatformTarget::host().to_string()));
    }
}
