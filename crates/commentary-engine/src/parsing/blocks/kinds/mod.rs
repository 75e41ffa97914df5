//! # Block Kinds
//!
//! Markdown constructs the command layer must recognise to know whether a
//! line sits at block start. Each type owns its delimiters; the classifier
//! never hardcodes `>`, fences or list markers.
//!
//! - **`BlockQuote`**: `>` prefixes (commands inside quotes are literal)
//! - **`CodeFence`**: ```` ``` ```` / `~~~` raw zones (no commands inside)
//! - **`ListMarker`**: bullet and ordered markers (commands inside items are literal)

pub mod block_quote;
pub mod code_fence;
pub mod list_marker;

pub use block_quote::BlockQuote;
pub use code_fence::{CodeFence, Fence, FenceKind};
pub use list_marker::ListMarker;

/// Columns of leading spaces (tabs count as four).
pub fn indent_width(s: &str) -> (usize, usize) {
    let mut columns = 0;
    let mut bytes = 0;
    for b in s.bytes() {
        match b {
            b' ' => columns += 1,
            b'\t' => columns += 4 - columns % 4,
            _ => break,
        }
        bytes += 1;
    }
    (columns, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indent_counts_columns_and_bytes() {
        assert_eq!(indent_width("text"), (0, 0));
        assert_eq!(indent_width("  text"), (2, 2));
        assert_eq!(indent_width("\ttext"), (4, 1));
        assert_eq!(indent_width(" \ttext"), (4, 2));
    }
}
