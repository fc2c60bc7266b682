//! Generate an HTML/SVG sheet of the keypad layout and every digit glyph.

use padseg_core::glyph::{Segment, Symbol};
use padseg_core::layout::{lookup, Column};
use padseg_core::Slot;

/// Key size in SVG pixels.
const KEY: f64 = 56.0;
/// Gap between keys.
const GAP: f64 = 6.0;
/// Step: key + gap.
const S: f64 = KEY + GAP;
/// Key corner radius.
const R: f64 = 6.0;
/// Margin around each drawing.
const MARGIN: f64 = 20.0;

/// Glyph cell width and height.
const GLYPH_W: f64 = 48.0;
const GLYPH_H: f64 = 80.0;
/// Segment bar thickness.
const BAR: f64 = 6.0;
/// Glyphs per row of the sheet.
const GLYPHS_PER_ROW: usize = 9;

/// Column lines in physical order, left to right.
const PHYSICAL_COLUMNS: [Column; 4] = [Column::Line3, Column::Line2, Column::Line1, Column::Line0];

/// Rectangle of one segment inside a glyph cell: (x, y, w, h).
fn segment_rect(segment: Segment) -> (f64, f64, f64, f64) {
    let inner = GLYPH_W - 2.0 * BAR - 8.0;
    let half = (GLYPH_H - 3.0 * BAR - 16.0) / 2.0;
    let left = 4.0;
    let right = left + BAR + inner;
    let top = 4.0;
    let mid = top + BAR + half;
    let bottom = mid + BAR + half;

    match segment {
        Segment::A => (left + BAR, top, inner, BAR),
        Segment::B => (right, top + BAR, BAR, half),
        Segment::C => (right, mid + BAR, BAR, half),
        Segment::D => (left + BAR, bottom, inner, BAR),
        Segment::E => (left, mid + BAR, BAR, half),
        Segment::F => (left, top + BAR, BAR, half),
        Segment::G => (left + BAR, mid, inner, BAR),
        Segment::Dp => (right + BAR + 1.0, bottom, BAR / 2.0 + 1.0, BAR),
    }
}

/// Render the 4×4 keypad as seen from the front.
fn render_keypad() -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<g transform="translate({MARGIN}, {})">"#,
        MARGIN + 30.0
    ));
    svg.push_str(r#"<text x="0" y="-10" class="title">Keypad</text>"#);

    for row in Slot::ALL {
        for (position, &column) in PHYSICAL_COLUMNS.iter().enumerate() {
            let x = position as f64 * S;
            let y = row.index() as f64 * S;
            let symbol = lookup(row, column);

            svg.push_str(&format!(
                r#"<rect x="{x}" y="{y}" width="{KEY}" height="{KEY}" rx="{R}" class="key"/>"#
            ));
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" class="label">{}</text>"#,
                x + KEY / 2.0,
                y + KEY / 2.0,
                symbol.to_char()
            ));
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" class="wire">r{} c{}</text>"#,
                x + KEY / 2.0,
                y + KEY - 8.0,
                row.index(),
                column.bits()
            ));
        }
    }

    svg.push_str("</g>");
    svg
}

/// Render every glyph of the encoding table, lit segments highlighted.
fn render_glyphs(y_offset: f64) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(r#"<g transform="translate({MARGIN}, {y_offset})">"#));
    svg.push_str(r#"<text x="0" y="-10" class="title">Digit encoding</text>"#);

    for (index, symbol) in Symbol::ALL.iter().enumerate() {
        let pattern = symbol.segments();
        let cx = (index % GLYPHS_PER_ROW) as f64 * (GLYPH_W + GAP * 2.0);
        let cy = (index / GLYPHS_PER_ROW) as f64 * (GLYPH_H + 30.0);

        svg.push_str(&format!(
            r#"<g transform="translate({cx}, {cy})"><rect width="{GLYPH_W}" height="{GLYPH_H}" class="cell"/>"#
        ));
        for segment in Segment::ALL {
            let (x, y, w, h) = segment_rect(segment);
            let class = if segment.is_lit(pattern) { "seg on" } else { "seg off" };
            svg.push_str(&format!(
                r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" class="{class}"/>"#
            ));
        }
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" class="code">0x{:02X}</text></g>"#,
            GLYPH_W / 2.0,
            GLYPH_H + 16.0,
            pattern
        ));
    }

    svg.push_str("</g>");
    svg
}

/// Generate the complete HTML document with inline SVG.
pub fn generate_html() -> String {
    let keypad_h = 4.0 * S + 30.0;
    let glyph_rows = (Symbol::COUNT + GLYPHS_PER_ROW - 1) / GLYPHS_PER_ROW;
    let glyphs_y = MARGIN + keypad_h + 50.0;
    let total_height = glyphs_y + glyph_rows as f64 * (GLYPH_H + 30.0) + MARGIN;
    let total_width =
        2.0 * MARGIN + GLYPHS_PER_ROW as f64 * (GLYPH_W + GAP * 2.0);

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Keypad and display</title>
<style>
  body {{
    background: #101418;
    color: #ddd;
    font-family: system-ui, -apple-system, sans-serif;
    display: flex;
    justify-content: center;
    padding: 2em;
  }}
  .key {{
    fill: #1d2630;
    stroke: #3c4f63;
    stroke-width: 1.5;
  }}
  .label {{
    fill: #eee;
    font-family: "JetBrains Mono", "Fira Code", monospace;
    font-size: 20px;
    text-anchor: middle;
    dominant-baseline: middle;
  }}
  .wire, .code {{
    fill: #7a8a99;
    font-family: monospace;
    font-size: 9px;
    text-anchor: middle;
  }}
  .cell {{
    fill: #050505;
  }}
  .seg.on {{
    fill: #ff3b30;
  }}
  .seg.off {{
    fill: #2a1514;
  }}
  .title {{
    fill: #ff3b30;
    font-size: 16px;
    font-weight: bold;
  }}
</style>
</head>
<body>
<svg width="{total_width}" height="{total_height}" xmlns="http://www.w3.org/2000/svg">
"#
    );

    html.push_str(&render_keypad());
    html.push('\n');
    html.push_str(&render_glyphs(glyphs_y));
    html.push('\n');
    html.push_str("</svg>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_every_key() {
        let html = generate_html();
        assert_eq!(html.matches(r#"class="key""#).count(), 16);
        assert!(html.contains(">r3 c8</text>"));
    }

    #[test]
    fn lit_segments_match_encoding_table() {
        let html = generate_html();
        let lit: usize = Symbol::ALL
            .iter()
            .map(|s| Segment::ALL.iter().filter(|seg| seg.is_lit(s.segments())).count())
            .sum();
        assert_eq!(html.matches(r#"class="seg on""#).count(), lit);
        assert_eq!(
            html.matches(r#"class="seg on""#).count() + html.matches(r#"class="seg off""#).count(),
            Symbol::COUNT * 8
        );
        assert!(html.contains(">0x8E</text>"));
    }
}
