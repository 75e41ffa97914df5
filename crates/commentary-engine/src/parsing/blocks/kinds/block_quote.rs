/// Blockquote prefix knowledge.
pub struct BlockQuote;

impl BlockQuote {
    pub const PREFIX: u8 = b'>';

    /// Counts leading `>` markers (each optionally preceded by up to three
    /// spaces and followed by one space).
    pub fn depth(line: &str) -> u8 {
        let mut rest = line.as_bytes();
        let mut depth = 0u8;
        loop {
            let spaces = rest.iter().take_while(|b| **b == b' ').count();
            if spaces > 3 || rest.get(spaces) != Some(&Self::PREFIX) {
                return depth;
            }
            depth = depth.saturating_add(1);
            rest = &rest[spaces + 1..];
            if rest.first() == Some(&b' ') {
                rest = &rest[1..];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_line_has_no_depth() {
        assert_eq!(BlockQuote::depth("\\effects x"), 0);
    }

    #[test]
    fn nested_markers_count() {
        assert_eq!(BlockQuote::depth("> \\effects ignored"), 1);
        assert_eq!(BlockQuote::depth(">> x"), 2);
        assert_eq!(BlockQuote::depth(" > > x"), 2);
    }

    #[test]
    fn deeply_indented_marker_is_code() {
        assert_eq!(BlockQuote::depth("    > x"), 0);
    }
}
