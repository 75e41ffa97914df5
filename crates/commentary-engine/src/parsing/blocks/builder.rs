use crate::model::SectionKind;
use crate::parsing::commands::{Command, CommandPatterns, InlineCommand, SpecialCommand};
use crate::parsing::markup::parse_markdown;

use super::{
    classify::LineClass,
    kinds::{CodeFence, Fence},
    types::CommentNode,
};

/// Deepest indentation at which a line still starts a block.
const MAX_BLOCK_INDENT: usize = 3;

#[derive(Debug)]
enum OpenCommand {
    Section {
        kind: SectionKind,
        lines: Vec<String>,
    },
    Inline {
        command: InlineCommand,
        name: String,
        line: usize,
        lines: Vec<String>,
    },
}

impl OpenCommand {
    fn lines_mut(&mut self) -> &mut Vec<String> {
        match self {
            OpenCommand::Section { lines, .. } | OpenCommand::Inline { lines, .. } => lines,
        }
    }
}

/// Segments classified comment lines into markup and command nodes.
///
/// Commands are only recognised at block start: outside block quotes, fences
/// and list items, with at most three columns of indentation. Section and
/// inline commands extend until a blank line or the next command.
pub struct CommentBlockBuilder<'p> {
    patterns: &'p CommandPatterns,
    markup: Vec<String>,
    open: Option<OpenCommand>,
    fence: Option<Fence>,
    in_list: bool,
    prev_blank: bool,
    out: Vec<CommentNode>,
}

impl<'p> CommentBlockBuilder<'p> {
    pub fn new(patterns: &'p CommandPatterns) -> Self {
        Self {
            patterns,
            markup: vec![],
            open: None,
            fence: None,
            in_list: false,
            prev_blank: false,
            out: vec![],
        }
    }

    pub fn push(&mut self, c: &LineClass) {
        if let Some(open) = self.fence {
            self.append(&c.text);
            if c.quote_depth == 0 && CodeFence::closes(open, c.fence) {
                self.fence = None;
            }
            self.prev_blank = false;
            return;
        }

        if c.is_blank {
            self.close_command();
            self.markup.push(String::new());
            self.prev_blank = true;
            return;
        }

        self.track_list(c);

        if self.at_block_start(c)
            && let Some((command, len)) = self.patterns.match_command(c.content())
            && self.apply_command(command, &c.content()[len..], c.number)
        {
            self.prev_blank = false;
            return;
        }

        if c.quote_depth == 0 && (c.indent <= MAX_BLOCK_INDENT || self.in_list) {
            self.fence = c.fence;
        }
        self.append(&c.text);
        self.prev_blank = false;
    }

    pub fn finish(mut self) -> Vec<CommentNode> {
        // EOF flush
        self.close_command();
        self.flush_markup();
        self.out
    }

    fn track_list(&mut self, c: &LineClass) {
        if c.quote_depth == 0 && c.indent <= MAX_BLOCK_INDENT && c.list_marker.is_some() {
            self.in_list = true;
        } else if self.in_list && self.prev_blank && c.indent == 0 {
            self.in_list = false;
        }
    }

    fn at_block_start(&self, c: &LineClass) -> bool {
        c.quote_depth == 0 && c.indent <= MAX_BLOCK_INDENT && !self.in_list
    }

    /// Returns `false` when the invocation is malformed and the line must
    /// stay literal.
    fn apply_command(&mut self, command: Command, rest: &str, line: usize) -> bool {
        match command {
            Command::Special(SpecialCommand::End) => {
                if SpecialCommand::End.parse_args(rest).is_none() {
                    log::debug!("line {line}: '\\end' takes no arguments, kept as text");
                    return false;
                }
                self.close_command();
            }
            Command::Special(special) => {
                let Some(args) = special.parse_args(rest) else {
                    log::debug!(
                        "line {line}: malformed '\\{}' invocation kept as text",
                        special.name()
                    );
                    return false;
                };
                self.close_command();
                self.flush_markup();
                self.out.push(CommentNode::Special {
                    command: special,
                    args,
                    line,
                });
            }
            Command::Section(kind) => {
                self.close_command();
                self.flush_markup();
                self.open = Some(OpenCommand::Section {
                    kind,
                    lines: vec![rest.trim_start().to_string()],
                });
            }
            Command::Inline(inline) => {
                let rest = rest.trim();
                let (name, content) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if name.is_empty() {
                    log::debug!(
                        "line {line}: '\\{}' without a name kept as text",
                        inline.name()
                    );
                    return false;
                }
                self.close_command();
                self.flush_markup();
                self.open = Some(OpenCommand::Inline {
                    command: inline,
                    name: name.to_string(),
                    line,
                    lines: vec![content.trim_start().to_string()],
                });
            }
        }
        true
    }

    fn append(&mut self, text: &str) {
        match &mut self.open {
            Some(open) => open.lines_mut().push(text.to_string()),
            None => self.markup.push(text.to_string()),
        }
    }

    fn close_command(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };
        self.out.push(match open {
            OpenCommand::Section { kind, lines } => CommentNode::Section {
                kind,
                content: parse_markdown(&lines.join("\n")),
            },
            OpenCommand::Inline {
                command,
                name,
                line,
                lines,
            } => CommentNode::Inline {
                command,
                name,
                content: parse_markdown(&lines.join("\n")),
                line,
            },
        });
    }

    fn flush_markup(&mut self) {
        let lines = std::mem::take(&mut self.markup);
        if lines.iter().all(|l| l.trim().is_empty()) {
            return;
        }
        let blocks = parse_markdown(&lines.join("\n"));
        if !blocks.is_empty() {
            self.out.push(CommentNode::Markup(blocks));
        }
    }
}
