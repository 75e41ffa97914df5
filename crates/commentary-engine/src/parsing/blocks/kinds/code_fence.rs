#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    Backticks,
    Tildes,
}

impl FenceKind {
    fn marker(self) -> char {
        match self {
            FenceKind::Backticks => '`',
            FenceKind::Tildes => '~',
        }
    }
}

/// A fence line: its character, run length and whether anything follows
/// the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fence {
    pub kind: FenceKind,
    pub len: usize,
    pub bare: bool,
}

/// Fenced code block knowledge. Fences are raw zones for the command layer.
pub struct CodeFence;

impl CodeFence {
    pub const MIN_LEN: usize = 3;

    /// Detects a fence opener/closer in a line whose indentation has already
    /// been stripped.
    pub fn detect(content: &str) -> Option<Fence> {
        let kind = match content.chars().next()? {
            '`' => FenceKind::Backticks,
            '~' => FenceKind::Tildes,
            _ => return None,
        };
        let len = content.len() - content.trim_start_matches(kind.marker()).len();
        if len < Self::MIN_LEN {
            return None;
        }
        Some(Fence {
            kind,
            len,
            bare: content[len..].trim().is_empty(),
        })
    }

    /// A closer uses the opener's character, is at least as long and
    /// carries no info string.
    pub fn closes(open: Fence, line: Option<Fence>) -> bool {
        line.is_some_and(|l| l.kind == open.kind && l.len >= open.len && l.bare)
    }
}
