use crate::model::{Entity, SectionKind};
use crate::parsing::commands::{InlineCommand, SpecialCommand};

/// A top-level node of a segmented comment.
///
/// Markup between commands is parsed eagerly; commands carry their own
/// already-parsed content.
#[derive(Debug, Clone, PartialEq)]
pub enum CommentNode {
    /// Ordinary markdown blocks not under any command.
    Markup(Vec<Entity>),
    /// A single-line binding or metadata command.
    Special {
        command: SpecialCommand,
        args: Vec<String>,
        /// 1-based line of the invocation.
        line: usize,
    },
    /// A named block opened by a section command.
    Section {
        kind: SectionKind,
        content: Vec<Entity>,
    },
    /// Documentation of a named sub-part of the bound declaration.
    Inline {
        command: InlineCommand,
        name: String,
        content: Vec<Entity>,
        /// 1-based line of the invocation.
        line: usize,
    },
}
