//! xk6bundler CLI: bundle k6 with extensions for multiple platforms.
//!
//! Builds one binary per target platform through `xk6`, packs each into a
//! `.tar.gz` archive and writes a Dockerfile next to the `linux/amd64` binary.

mod commands;

use color_eyre::eyre::Result;

use xk6bundler_shared::EnvContext;

fn main() -> Result<()> {
    color_eyre::install()?;
    let env = EnvContext::from_process()?;
    let cli = commands::parse(&env, std::env::args_os());
    commands::init_tracing(&cli);
    commands::run(cli, &env)
}
