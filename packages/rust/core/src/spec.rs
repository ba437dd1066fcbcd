//! Parsing of raw extension and platform tokens.
//!
//! Extension tokens have the form `module[@version][=replacement]`, platform
//! tokens the form `os/arch`.

use std::path::PathBuf;

use xk6bundler_shared::{BundlerError, EnvContext, ExtensionRef, PlatformTarget, ReplacementRef, Result};

const VERSION_SPLIT: char = '@';
const REPLACE_SPLIT: char = '=';
const PLATFORM_SPLIT: char = '/';

/// Replacement value meaning "the current working directory".
const CURRENT_DIR: &str = ".";

/// The raw parts of an extension token. Empty strings mean "not given".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionParts<'a> {
    pub module: &'a str,
    pub version: &'a str,
    pub replacement: &'a str,
}

/// Split an extension token into module, version and replacement.
///
/// The token is split on the first `@`; without one, the whole token is split
/// on the first `=` instead, otherwise only the part after `@` is. So `@`
/// binds looser than `=`: `m@v=r` has version `v` and replacement `r`.
pub fn split_extension(token: &str) -> Result<ExtensionParts<'_>> {
    let (module, version, replacement) = match token.split_once(VERSION_SPLIT) {
        None => match token.split_once(REPLACE_SPLIT) {
            Some((module, replacement)) => (module, "", replacement),
            None => (token, "", ""),
        },
        Some((module, rest)) => match rest.split_once(REPLACE_SPLIT) {
            Some((version, replacement)) => (module, version, replacement),
            None => (module, rest, ""),
        },
    };

    // Pasted URLs often keep a trailing slash.
    let module = module.trim_end_matches('/');
    if module.is_empty() {
        return Err(BundlerError::missing_module(token));
    }

    Ok(ExtensionParts {
        module,
        version,
        replacement,
    })
}

/// Parse an extension token into an [`ExtensionRef`] and, when the token
/// carries a replacement, a [`ReplacementRef`].
///
/// A `.` replacement resolves to the environment's working directory; other
/// replacements are used verbatim.
pub fn parse_extension(
    token: &str,
    env: &EnvContext,
) -> Result<(ExtensionRef, Option<ReplacementRef>)> {
    let parts = split_extension(token)?;

    let extension = ExtensionRef::new(parts.module, Some(parts.version.to_string()));

    let replacement = match parts.replacement {
        "" => None,
        CURRENT_DIR => Some(ReplacementRef::new(parts.module, env.cwd())),
        path => Some(ReplacementRef::new(parts.module, PathBuf::from(path))),
    };

    Ok((extension, replacement))
}

/// Parse an `os/arch` token. Values are not checked against known platforms.
pub fn parse_platform(token: &str) -> Result<PlatformTarget> {
    match token.split_once(PLATFORM_SPLIT) {
        Some((os, arch)) if !os.is_empty() && !arch.is_empty() => Ok(PlatformTarget::new(os, arch)),
        _ => Err(BundlerError::invalid_platform(token)),
    }
}
