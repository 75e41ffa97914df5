use xi_rope::Rope;

/// A single line of comment text.
#[derive(Debug, Clone)]
pub struct LineRef {
    /// 1-based line number within the comment.
    pub number: usize,
    /// The line text with the line terminator removed.
    pub text: String,
}

/// Returns an iterator over the lines of `rope`, numbered from 1.
///
/// Uses `lines_raw` and trims the terminator here so `\r\n` and `\n` input
/// classify the same way.
pub fn lines_with_numbers(rope: &Rope) -> impl Iterator<Item = LineRef> + '_ {
    rope.lines_raw(..).enumerate().map(|(i, line)| LineRef {
        number: i + 1,
        text: line.trim_end_matches(['\r', '\n']).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_numbered_and_trimmed() {
        let rope = Rope::from("\\effects a\r\nb\n\nc");
        let lines: Vec<_> = lines_with_numbers(&rope).collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].text, "\\effects a");
        assert_eq!(lines[2].number, 3);
        assert_eq!(lines[2].text, "");
        assert_eq!(lines[3].text, "c");
    }

    #[test]
    fn empty_rope_has_no_lines() {
        let rope = Rope::from("");
        assert_eq!(lines_with_numbers(&rope).count(), 0);
    }
}
