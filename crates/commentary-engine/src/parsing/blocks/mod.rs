//! # Comment Segmentation
//!
//! Two-phase segmentation of comment text into markup and command nodes.
//!
//! ## Parsing Phases
//!
//! 1. **Line Classification** (`classify`): each line is classified into a
//!    `LineClass` holding local facts (indentation, blockquote depth, list
//!    marker, fence detection, blank status)
//!
//! 2. **Segmentation** (`builder`): a `CommentBlockBuilder` tracks fence and
//!    list context, recognises commands at block start and emits
//!    `CommentNode`s; the text between commands is parsed as markdown
//!
//! ## Key Invariants
//!
//! - Fenced code blocks are raw zones: no commands inside
//! - Commands inside block quotes and list items are literal text
//! - A malformed command invocation is literal text, never an error

pub mod builder;
pub mod classify;
pub mod kinds;
pub mod types;

pub use builder::CommentBlockBuilder;
pub use classify::{CommentLineClassifier, LineClass};
pub use types::CommentNode;
