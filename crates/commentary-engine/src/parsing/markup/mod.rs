//! # Markup
//!
//! CommonMark parsing into the entity model ([`parse_markdown`]) and the
//! reverse emission ([`emit`], [`escape`]).

pub mod emit;
pub mod tree;

pub use emit::{emit, emit_inline, escape};
pub use tree::{FUZZY_PREFIXES, parse_markdown};
