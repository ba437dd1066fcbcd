//! Build planning and orchestration for xk6bundler.
//!
//! This crate turns raw options into a [`BuildPlan`] (token parsing, Markdown
//! extraction, name inference) and drives the per-platform build, Dockerfile
//! and archive steps through a [`ModuleBuilder`].

pub mod builder;
pub mod ci;
pub mod name;
pub mod pipeline;
pub mod plan;
pub mod spec;

pub use builder::{BuildRequest, ModuleBuilder, Xk6Builder};
pub use pipeline::{BundleArtifacts, BundleResult, ProgressReporter, SilentProgress, run};
pub use plan::BuildPlan;
