//! # Parsing
//!
//! Comment text to nodes: line segmentation with the command grammar
//! (`blocks`, `commands`) over CommonMark markup (`markup`).

pub mod blocks;
pub mod commands;
pub mod markup;
pub mod rope;

use xi_rope::Rope;

use blocks::{CommentBlockBuilder, CommentLineClassifier, CommentNode};
use commands::CommandPatterns;
use rope::lines_with_numbers;

pub use markup::{emit, emit_inline, escape, parse_markdown};

/// Segments a comment into markup and command nodes.
pub fn parse_comment(text: &str, patterns: &CommandPatterns) -> Vec<CommentNode> {
    let rope = Rope::from(text);
    let classifier = CommentLineClassifier;
    let mut builder = CommentBlockBuilder::new(patterns);

    for lr in lines_with_numbers(&rope) {
        let lc = classifier.classify(&lr);
        builder.push(&lc);
    }

    builder.finish()
}
