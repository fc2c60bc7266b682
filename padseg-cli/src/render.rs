//! Text rendering of segment patterns, three lines per digit row.

use padseg_core::glyph::Segment;

fn bar(pattern: u8, segment: Segment, on: char) -> char {
    if segment.is_lit(pattern) {
        on
    } else {
        ' '
    }
}

/// Draw active-low patterns side by side as ASCII seven-segment digits.
pub fn render(patterns: &[u8]) -> String {
    let mut lines = [String::new(), String::new(), String::new()];

    for &p in patterns {
        lines[0].extend([' ', bar(p, Segment::A, '_'), ' ', ' ']);
        lines[1].extend([
            bar(p, Segment::F, '|'),
            bar(p, Segment::G, '_'),
            bar(p, Segment::B, '|'),
            ' ',
        ]);
        lines[2].extend([
            bar(p, Segment::E, '|'),
            bar(p, Segment::D, '_'),
            bar(p, Segment::C, '|'),
            bar(p, Segment::Dp, '.'),
        ]);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use padseg_core::DisplayBuffer;

    #[test]
    fn renders_four_digits() {
        let display = DisplayBuffer::with_text("1F07").unwrap();
        let text = render(display.patterns());
        let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
        assert_eq!(
            lines,
            vec![
                "     _   _   _",
                "  | |_  | |   |",
                "  | |   |_|   |",
            ]
        );
    }

    #[test]
    fn blank_renders_as_spaces() {
        let text = render(&[0xFF, 0xFF]);
        assert!(text.chars().all(|c| c == ' ' || c == '\n'));
    }

    #[test]
    fn decimal_point_follows_digit() {
        // "8." with every bit cleared
        let text = render(&[0x00]);
        assert_eq!(text.lines().last(), Some("|_|."));
    }
}
