//! Bitmap text for rasterization.
//!
//! Text is drawn with the Spleen bitmap fonts. The base font is picked by
//! line height and scaled; every lit glyph pixel becomes a small square, and
//! horizontal runs of lit pixels are merged into one rectangle each.
//!
//! | Line height | Base font |
//! |-------------|-----------|
//! | ≤ 14 px | 6×12 |
//! | ≤ 20 px | 8×16 |
//! | larger | 12×24 |
//!
//! Glyphs the fonts do not carry (most Polish diacritics among them) fall
//! back to their base letter; anything else is skipped but still advances.

use spleen_font::{FONT_6X12, FONT_8X16, FONT_12X24, PSF2Font};
use tiny_skia::{Path, PathBuilder, Rect};

use crate::scene::{Align, GLYPH_ASPECT, TextNode, text_width};

/// Base bitmap font for a line height: `(data, cell height)`.
fn base_font(size: f64) -> (&'static [u8], f64) {
    if size <= 14.0 {
        (FONT_6X12, 12.0)
    } else if size <= 20.0 {
        (FONT_8X16, 16.0)
    } else {
        (FONT_12X24, 24.0)
    }
}

/// ASCII stand-in for characters the bitmap fonts lack.
pub fn fallback_char(ch: char) -> Option<char> {
    let base = match ch {
        'ą' => 'a',
        'ć' => 'c',
        'ę' => 'e',
        'ł' => 'l',
        'ń' => 'n',
        'ó' => 'o',
        'ś' => 's',
        'ź' | 'ż' => 'z',
        'Ą' => 'A',
        'Ć' => 'C',
        'Ę' => 'E',
        'Ł' => 'L',
        'Ń' => 'N',
        'Ó' => 'O',
        'Ś' => 'S',
        'Ź' | 'Ż' => 'Z',
        '„' | '”' | '“' => '"',
        '‘' | '’' => '\'',
        '—' | '–' => '-',
        '·' | '•' => '*',
        '\u{a0}' | '\u{202f}' => ' ',
        _ => return None,
    };
    Some(base)
}

/// Lit pixel runs of one glyph as `(column, row, length)` in font cells.
fn glyph_runs(font: &mut PSF2Font, ch: char) -> Vec<(usize, usize, usize)> {
    let mut runs = Vec::new();
    let mut lookup = |c: char| -> bool {
        let utf8 = c.to_string();
        let Some(glyph) = font.glyph_for_utf8(utf8.as_bytes()) else {
            return false;
        };
        for (row_y, row) in glyph.enumerate() {
            let mut start: Option<usize> = None;
            let mut width = 0;
            for (col_x, on) in row.enumerate() {
                width = col_x + 1;
                match (on, start) {
                    (true, None) => start = Some(col_x),
                    (false, Some(s)) => {
                        runs.push((s, row_y, col_x - s));
                        start = None;
                    }
                    _ => {}
                }
            }
            if let Some(s) = start {
                runs.push((s, row_y, width - s));
            }
        }
        true
    };
    if !lookup(ch)
        && let Some(base) = fallback_char(ch)
    {
        lookup(base);
    }
    runs
}

/// Left edge of a line for the node's alignment.
fn line_start(node: &TextNode, line: &str) -> f64 {
    let width = text_width(line, node.size);
    match node.align {
        Align::Left => node.at.x,
        Align::Center => node.at.x - width / 2.0,
        Align::Right => node.at.x - width,
    }
}

/// Filled outline of `node`'s glyphs in native coordinates, or `None` when
/// nothing would be drawn.
pub fn text_path(node: &TextNode) -> Option<Path> {
    if node.size <= 0.0 || !node.size.is_finite() {
        return None;
    }
    let (data, cell_height) = base_font(node.size);
    let mut font = PSF2Font::new(data).ok()?;
    let px = node.size / cell_height;
    let advance = node.size * GLYPH_ASPECT;
    let embolden = if node.bold { (px * 0.6).max(0.5) } else { 0.0 };

    let mut pb = PathBuilder::new();
    for (line_index, line) in node.lines().iter().enumerate() {
        let top = node.at.y + line_index as f64 * node.size;
        let mut x = line_start(node, line);
        for ch in line.chars() {
            if !ch.is_whitespace() {
                for (col, row, len) in glyph_runs(&mut font, ch) {
                    let rect = Rect::from_xywh(
                        (x + col as f64 * px) as f32,
                        (top + row as f64 * px) as f32,
                        (len as f64 * px + embolden) as f32,
                        px as f32,
                    );
                    if let Some(rect) = rect {
                        pb.push_rect(rect);
                    }
                }
            }
            x += advance;
        }
    }
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Point;

    #[test]
    fn test_base_font_by_size() {
        assert_eq!(base_font(12.0).1, 12.0);
        assert_eq!(base_font(16.0).1, 16.0);
        assert_eq!(base_font(48.0).1, 24.0);
    }

    #[test]
    fn test_text_path_stays_in_line_box() {
        let node = TextNode::new("Hello", Point::new(10.0, 20.0), 24.0);
        let bounds = text_path(&node).unwrap().bounds();
        assert!(bounds.left() >= 10.0);
        assert!(bounds.top() >= 20.0);
        assert!(bounds.right() <= 10.0 + 5.0 * 12.0 + 0.01);
        assert!(bounds.bottom() <= 44.0 + 0.01);
    }

    #[test]
    fn test_centered_text_straddles_anchor() {
        let node = TextNode::new("WWWW", Point::new(100.0, 0.0), 16.0).center();
        let bounds = text_path(&node).unwrap().bounds();
        assert!(bounds.left() < 100.0 && bounds.right() > 100.0);
    }

    #[test]
    fn test_blank_text_has_no_path() {
        assert!(text_path(&TextNode::new("   ", Point::new(0.0, 0.0), 16.0)).is_none());
        assert!(text_path(&TextNode::new("x", Point::new(0.0, 0.0), 0.0)).is_none());
    }

    #[test]
    fn test_polish_letters_fall_back() {
        assert_eq!(fallback_char('ł'), Some('l'));
        assert_eq!(fallback_char('Ż'), Some('Z'));
        assert_eq!(fallback_char('x'), None);
        let node = TextNode::new("ł", Point::new(0.0, 0.0), 24.0);
        assert!(text_path(&node).is_some());
    }

    #[test]
    fn test_bold_is_wider() {
        let plain = TextNode::new("I", Point::new(0.0, 0.0), 24.0);
        let bold = plain.clone().bold();
        let w = |n: &TextNode| text_path(n).unwrap().bounds().width();
        assert!(w(&bold) > w(&plain));
    }
}
