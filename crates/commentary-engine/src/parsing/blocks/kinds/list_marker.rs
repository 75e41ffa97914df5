/// List item marker knowledge.
pub struct ListMarker;

impl ListMarker {
    pub const BULLETS: [u8; 3] = [b'-', b'*', b'+'];
    pub const ORDERED_DELIMITERS: [u8; 2] = [b'.', b')'];

    /// Width of the marker at the start of `content`, if it opens a list
    /// item. The marker must be followed by whitespace or end the line.
    pub fn width(content: &str) -> Option<usize> {
        let b = content.as_bytes();
        let marker_len = match b.first()? {
            c if Self::BULLETS.contains(c) => 1,
            c if c.is_ascii_digit() => {
                let digits = b.iter().take_while(|c| c.is_ascii_digit()).count();
                if digits > 9 || !Self::ORDERED_DELIMITERS.contains(b.get(digits)?) {
                    return None;
                }
                digits + 1
            }
            _ => return None,
        };
        match b.get(marker_len) {
            None | Some(b' ') | Some(b'\t') => Some(marker_len),
            Some(_) => None,
        }
    }
}
