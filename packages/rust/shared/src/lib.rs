//! Shared types, error model, and configuration for xk6bundler.
//!
//! This crate is the foundation depended on by all other xk6bundler crates.
//! It provides:
//! - [`BundlerError`], the unified error type
//! - Domain types ([`ExtensionRef`], [`ReplacementRef`], [`PlatformTarget`], [`BaseRuntime`])
//! - Configuration defaults and raw [`BundleOptions`]
//! - [`EnvContext`], the explicit process-environment snapshot

pub mod config;
pub mod env;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{BundleOptions, env_key};
pub use env::EnvContext;
pub use error::{BundlerError, Result};
pub use types::{BaseRuntime, ExtensionRef, PlatformTarget, ReplacementRef};
