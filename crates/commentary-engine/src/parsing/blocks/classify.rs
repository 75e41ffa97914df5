use crate::parsing::rope::LineRef;

use super::kinds::{BlockQuote, CodeFence, Fence, ListMarker, indent_width};

/// Local facts about one comment line.
///
/// Phase 1 of segmentation: each line is classified without reference to
/// the lines around it. Context (open fence, list membership) is the
/// builder's business.
#[derive(Debug, Clone)]
pub struct LineClass {
    /// 1-based line number within the comment.
    pub number: usize,
    /// The full line text.
    pub text: String,
    /// Whether the line is whitespace only.
    pub is_blank: bool,
    /// Number of blockquote `>` prefixes found.
    pub quote_depth: u8,
    /// Indentation in columns.
    pub indent: usize,
    /// Byte offset where the indentation ends.
    pub content_start: usize,
    /// Width of a list item marker opening the line content.
    pub list_marker: Option<usize>,
    /// If the content looks like a fence opener/closer.
    pub fence: Option<Fence>,
}

impl LineClass {
    /// Line text with indentation stripped.
    pub fn content(&self) -> &str {
        &self.text[self.content_start..]
    }
}

/// Classifies individual lines for the command layer.
pub struct CommentLineClassifier;

impl CommentLineClassifier {
    pub fn classify(&self, lr: &LineRef) -> LineClass {
        let text = lr.text.as_str();
        let (indent, content_start) = indent_width(text);
        let content = &text[content_start..];
        LineClass {
            number: lr.number,
            text: text.to_string(),
            is_blank: content.is_empty(),
            quote_depth: BlockQuote::depth(text),
            indent,
            content_start,
            list_marker: ListMarker::width(content),
            fence: CodeFence::detect(content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::blocks::kinds::FenceKind;

    fn classify(text: &str) -> LineClass {
        CommentLineClassifier.classify(&LineRef {
            number: 1,
            text: text.into(),
        })
    }

    #[test]
    fn command_line_has_plain_content() {
        let c = classify("  \\effects Exchanges values.");
        assert_eq!(c.indent, 2);
        assert_eq!(c.content(), "\\effects Exchanges values.");
        assert_eq!(c.quote_depth, 0);
        assert!(c.list_marker.is_none());
        assert!(!c.is_blank);
    }

    #[test]
    fn quoted_and_listed_lines() {
        assert_eq!(classify("> \\effects ignored").quote_depth, 1);
        assert_eq!(classify("- \\effects ignored").list_marker, Some(1));
    }

    #[test]
    fn whitespace_only_is_blank() {
        assert!(classify(" \t ").is_blank);
        assert!(classify("").is_blank);
    }

    #[test]
    fn fence_is_detected_after_indent() {
        assert_eq!(
            classify("  ~~~").fence.map(|f| f.kind),
            Some(FenceKind::Tildes)
        );
    }
}
