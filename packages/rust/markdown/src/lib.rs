//! Extension list extraction from Markdown documents.
//!
//! A README can declare the extensions a bundle needs inside fenced code
//! blocks tagged with a reserved language (`xk6`):
//!
//! ````text
//! ```xk6
//! github.com/grafana/xk6-sql@v0.4.0
//! github.com/grafana/xk6-dashboard
//! ```
//! ````
//!
//! Every such block is collected and split on whitespace into raw extension
//! tokens; blocks tagged with any other language are ignored.

mod blocks;

use std::path::Path;

use tracing::{debug, instrument};

use xk6bundler_shared::{BundlerError, Result};

pub use blocks::{Block, parse_blocks};

/// Collect whitespace-separated tokens from all fenced blocks tagged `language`.
pub fn extract_tokens(markdown: &str, language: &str) -> Vec<String> {
    let mut buffer = String::new();

    for block in parse_blocks(markdown) {
        match block {
            Block::Fenced { ref info, ref content } if info.trim() == language => {
                buffer.push_str(content);
                buffer.push('\n');
            }
            Block::Fenced { .. } | Block::Indented { .. } | Block::Other => {}
        }
    }

    buffer.split_whitespace().map(String::from).collect()
}

/// Read a Markdown file and extract the tokens of its `language` blocks.
///
/// A document without matching blocks yields an empty list.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn extract_from_document(path: &Path, language: &str) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| BundlerError::io(path, e))?;
    let tokens = extract_tokens(&content, language);

    debug!(count = tokens.len(), "extracted extension tokens");

    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
