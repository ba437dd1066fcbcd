//! Block-level view of a CommonMark document.
//!
//! Only code blocks are materialized; everything else collapses into
//! [`Block::Other`].

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};

/// A top-level node of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A fenced code block with its info string (language tag and any extras).
    Fenced { info: String, content: String },
    /// An indented code block.
    Indented { content: String },
    /// Any other node kind.
    Other,
}

impl Block {
    /// The language tag of a fenced block, if this is one.
    pub fn language(&self) -> Option<&str> {
        match self {
            Block::Fenced { info, .. } => Some(info.trim()),
            Block::Indented { .. } | Block::Other => None,
        }
    }
}

/// Parse Markdown into a flat sequence of blocks, in document order.
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Option<Block> = None;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                current = Some(match kind {
                    CodeBlockKind::Fenced(info) => Block::Fenced {
                        info: info.to_string(),
                        content: String::new(),
                    },
                    CodeBlockKind::Indented => Block::Indented {
                        content: String::new(),
                    },
                });
            }
            Event::Text(text) => match current.as_mut() {
                Some(Block::Fenced { content, .. } | Block::Indented { content }) => {
                    content.push_str(&text);
                }
                _ => {}
            },
            Event::End(TagEnd::CodeBlock) => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
            }
            Event::Start(Tag::Paragraph | Tag::Heading { .. } | Tag::List(_) | Tag::Table(_))
                if current.is_none() =>
            {
                blocks.push(Block::Other);
            }
            _ => {}
        }
    }

    blocks
}
