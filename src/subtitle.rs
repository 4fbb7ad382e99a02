use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};

use crate::model::SubtitleStyle;
use crate::text::{ResolvedFont, TextMeasurer, wrap_greedy};

/// Replace every Unicode punctuation character with a space, then collapse
/// runs of whitespace to single spaces and trim the ends.
pub fn strip_punctuation(text: &str) -> String {
    let spaced: String = text
        .chars()
        .map(|c| {
            if c.general_category_group() == GeneralCategoryGroup::Punctuation {
                ' '
            } else {
                c
            }
        })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One positioned subtitle line; `x`/`y` locate the top-left of the text
/// within the frame.
#[derive(Clone, Debug)]
pub struct SubtitleLine {
    pub text: String,
    pub width: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug)]
pub struct SubtitleLayout {
    pub lines: Vec<SubtitleLine>,
    /// Text row height, ascent plus descent.
    pub line_height: f64,
    /// Constant vertical step between consecutive lines.
    pub advance: f64,
    pub total_height: f64,
}

/// Wrap and position the active chunk text starting at `start_y`. Lines past
/// the cap are discarded. The per-line advance is constant so rows with and
/// without descenders stay evenly spaced.
pub fn layout_subtitle(
    measurer: &mut dyn TextMeasurer,
    font: &ResolvedFont,
    font_size: f32,
    style: &SubtitleStyle,
    max_lines: usize,
    text: &str,
    image_width: f64,
    start_y: f64,
) -> Option<SubtitleLayout> {
    let text = strip_punctuation(text);
    if text.is_empty() {
        return None;
    }

    let cap = style.max_lines.min(max_lines).max(1);
    let max_width = image_width * style.width_ratio;
    let (wrapped, _discarded) = wrap_greedy(measurer, font, font_size, &text, max_width, cap);
    if wrapped.is_empty() {
        return None;
    }

    let metrics = measurer.line_metrics(font, font_size);
    let line_height = metrics.ascent + metrics.descent;
    let advance = line_height * style.line_spacing;

    let mut lines = Vec::with_capacity(wrapped.len());
    let mut y = start_y;
    for line_text in wrapped {
        let width = measurer.extent(font, font_size, &line_text);
        let x = (image_width - width) / 2.0;
        lines.push(SubtitleLine {
            text: line_text,
            width,
            x,
            y,
        });
        y += advance;
    }

    let total_height = lines.len() as f64 * advance;
    Some(SubtitleLayout {
        lines,
        line_height,
        advance,
        total_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::FixedAdvance;

    #[test]
    fn punctuation_becomes_single_spaces() {
        assert_eq!(strip_punctuation("Hello, world!"), "Hello world");
        assert_eq!(strip_punctuation("a...b"), "a b");
        assert_eq!(strip_punctuation("¿qué? ¡sí!"), "qué sí");
        assert_eq!(strip_punctuation("!!!"), "");
    }

    #[test]
    fn layout_centers_each_line() {
        let mut m = FixedAdvance;
        let style = SubtitleStyle::default();
        // size 10: char width 6. max_width = 1000 * 0.88 = 880.
        let layout = layout_subtitle(
            &mut m,
            &ResolvedFont::SansSerif,
            10.0,
            &style,
            5,
            "Hello, world!",
            1000.0,
            100.0,
        )
        .expect("text present");
        assert_eq!(layout.lines.len(), 1);
        let line = &layout.lines[0];
        assert_eq!(line.text, "Hello world");
        assert!((line.width - 66.0).abs() < 1e-9);
        assert!((line.x - 467.0).abs() < 1e-9);
        assert!((line.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn advance_uses_spacing_multiplier() {
        let mut m = FixedAdvance;
        let style = SubtitleStyle::default();
        let layout = layout_subtitle(
            &mut m,
            &ResolvedFont::SansSerif,
            20.0,
            &style,
            5,
            "one two three four five six seven",
            200.0,
            0.0,
        )
        .expect("text present");
        assert!(layout.lines.len() > 1);
        assert!((layout.line_height - 20.0).abs() < 1e-9);
        assert!((layout.advance - 40.0).abs() < 1e-9);
        assert!((layout.lines[1].y - layout.lines[0].y - 40.0).abs() < 1e-9);
        assert!((layout.total_height - layout.lines.len() as f64 * 40.0).abs() < 1e-9);
    }

    #[test]
    fn layout_cap_beats_style_cap() {
        let mut m = FixedAdvance;
        let style = SubtitleStyle::default();
        let layout = layout_subtitle(
            &mut m,
            &ResolvedFont::SansSerif,
            10.0,
            &style,
            3,
            "aaaa bbbb cccc dddd eeee ffff gggg hhhh",
            60.0,
            0.0,
        )
        .expect("text present");
        assert_eq!(layout.lines.len(), 3);
    }

    #[test]
    fn punctuation_only_chunk_renders_nothing() {
        let mut m = FixedAdvance;
        let style = SubtitleStyle::default();
        assert!(
            layout_subtitle(
                &mut m,
                &ResolvedFont::SansSerif,
                10.0,
                &style,
                5,
                "?!,.",
                1000.0,
                0.0,
            )
            .is_none()
        );
    }
}
