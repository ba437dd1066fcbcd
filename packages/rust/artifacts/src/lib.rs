//! Distribution artifacts produced for each built binary.
//!
//! - [`archive::package`] packs the binary plus `LICENSE`/`README.md` into a `.tar.gz`
//! - [`dockerfile::write_dockerfile`] emits a container build file for the
//!   canonical platform

pub mod archive;
pub mod dockerfile;

pub use archive::{Presence, add_file, package};
pub use dockerfile::{DOCKERFILE_TEMPLATE, render_dockerfile, write_dockerfile};
