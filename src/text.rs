use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use parley::style::{FontStack, StyleProperty};
use parley::{FontContext, LayoutContext};

/// Premultiplied-agnostic RGBA color carried through text layout as the brush.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct TextBrushRgba8(pub [u8; 4]);

/// A font choice after path resolution. Registration failures degrade to the
/// generic sans-serif family instead of aborting the render.
#[derive(Clone, Debug)]
pub enum ResolvedFont {
    Registered { family: String, bytes: Arc<Vec<u8>> },
    SansSerif,
}

impl ResolvedFont {
    fn stack(&self) -> FontStack<'_> {
        match self {
            ResolvedFont::Registered { family, .. } => FontStack::Source(Cow::Borrowed(family)),
            ResolvedFont::SansSerif => FontStack::Source(Cow::Borrowed("sans-serif")),
        }
    }
}

/// Ascent and descent of a single line at a given size, px.
#[derive(Clone, Copy, Debug)]
pub struct LineMetrics {
    pub ascent: f64,
    pub descent: f64,
}

/// Font-metric queries the fitting and wrapping logic depends on. Kept as a
/// trait so that logic is testable without real font files.
pub trait TextMeasurer {
    /// Advance width of `text` laid out on a single unbroken line.
    fn extent(&mut self, font: &ResolvedFont, size: f32, text: &str) -> f64;

    fn line_metrics(&mut self, font: &ResolvedFont, size: f32) -> LineMetrics;

    /// Ink height of `text` on a single unbroken line: the vertical extent of
    /// the union of glyph bounding boxes, which is tighter than the face's
    /// ascent + descent for most title text.
    fn text_height(&mut self, font: &ResolvedFont, size: f32, text: &str) -> f64;
}

/// Production measurer and shaper backed by parley.
pub struct ParleyShaper {
    font_ctx: FontContext,
    layout_ctx: LayoutContext<TextBrushRgba8>,
}

impl ParleyShaper {
    pub fn new() -> Self {
        Self {
            font_ctx: FontContext::default(),
            layout_ctx: LayoutContext::new(),
        }
    }

    /// Resolve an optional font file path. Unreadable or unparseable files
    /// log a warning and fall back to sans-serif.
    pub fn resolve(&mut self, path: Option<&Path>) -> ResolvedFont {
        let Some(path) = path else {
            return ResolvedFont::SansSerif;
        };
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "font unreadable, using sans-serif");
                return ResolvedFont::SansSerif;
            }
        };
        let bytes = Arc::new(bytes);
        let registered = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.to_vec()), None);
        let Some((family_id, _)) = registered.first() else {
            tracing::warn!(path = %path.display(), "no faces found in font file, using sans-serif");
            return ResolvedFont::SansSerif;
        };
        let Some(family) = self.font_ctx.collection.family_name(*family_id) else {
            tracing::warn!(path = %path.display(), "registered font has no family name, using sans-serif");
            return ResolvedFont::SansSerif;
        };
        ResolvedFont::Registered {
            family: family.to_string(),
            bytes,
        }
    }

    /// Shape one line of text for drawing. No line breaking is applied; the
    /// caller has already wrapped.
    pub fn layout_line(
        &mut self,
        font: &ResolvedFont,
        size: f32,
        color: TextBrushRgba8,
        text: &str,
    ) -> parley::Layout<TextBrushRgba8> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(StyleProperty::FontStack(font.stack()));
        builder.push_default(StyleProperty::FontSize(size));
        builder.push_default(StyleProperty::Brush(color));
        let mut layout = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

impl Default for ParleyShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasurer for ParleyShaper {
    fn extent(&mut self, font: &ResolvedFont, size: f32, text: &str) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        let layout = self.layout_line(font, size, TextBrushRgba8::default(), text);
        layout
            .lines()
            .next()
            .map(|line| line.metrics().advance as f64)
            .unwrap_or(0.0)
    }

    fn line_metrics(&mut self, font: &ResolvedFont, size: f32) -> LineMetrics {
        let layout = self.layout_line(font, size, TextBrushRgba8::default(), "Ag");
        match layout.lines().next() {
            Some(line) => {
                let m = line.metrics();
                LineMetrics {
                    ascent: m.ascent as f64,
                    descent: m.descent as f64,
                }
            }
            // No shapeable face at all; approximate so layout still proceeds.
            None => LineMetrics {
                ascent: size as f64 * 0.8,
                descent: size as f64 * 0.2,
            },
        }
    }

    fn text_height(&mut self, font: &ResolvedFont, size: f32, text: &str) -> f64 {
        use skrifa::MetadataProvider;

        let layout = self.layout_line(font, size, TextBrushRgba8::default(), text);
        let mut top = f64::NEG_INFINITY;
        let mut bottom = f64::INFINITY;
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let font_data = run.run().font();
                let Ok(face) =
                    skrifa::FontRef::from_index(font_data.data.as_ref(), font_data.index)
                else {
                    continue;
                };
                let metrics = face.glyph_metrics(
                    skrifa::instance::Size::new(run.run().font_size()),
                    skrifa::instance::LocationRef::default(),
                );
                for glyph in run.glyphs() {
                    let Some(b) = metrics.bounds(skrifa::GlyphId::new(glyph.id)) else {
                        continue;
                    };
                    top = top.max(b.y_max as f64);
                    bottom = bottom.min(b.y_min as f64);
                }
            }
        }
        if bottom <= top {
            top - bottom
        } else {
            // No ink bounds available; the face metrics are the best guess.
            let m = self.line_metrics(font, size);
            m.ascent + m.descent
        }
    }
}

/// Greedy word wrap. Words are whitespace-separated; a word wider than
/// `max_width` still occupies its own line. Returns the wrapped lines and
/// whether any input was left over once `max_lines` filled up.
pub fn wrap_greedy(
    measurer: &mut dyn TextMeasurer,
    font: &ResolvedFont,
    size: f32,
    text: &str,
    max_width: f64,
    max_lines: usize,
) -> (Vec<String>, bool) {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut words = text.split_whitespace().peekable();

    while let Some(word) = words.peek() {
        let candidate = if current.is_empty() {
            (*word).to_string()
        } else {
            format!("{current} {word}")
        };
        if current.is_empty() || measurer.extent(font, size, &candidate) <= max_width {
            current = candidate;
            words.next();
        } else {
            lines.push(std::mem::take(&mut current));
            if lines.len() == max_lines {
                return (lines, true);
            }
        }
    }
    if !current.is_empty() {
        if lines.len() == max_lines {
            return (lines, true);
        }
        lines.push(current);
    }
    (lines, false)
}

/// Fixed-metrics fake for wrap and fit tests: every char advances
/// `0.6 * size`, ascent is `0.8 * size`, descent `0.2 * size`, and the ink
/// height of any line is `0.75 * size` (tighter than ascent + descent, as
/// with real faces).
#[cfg(test)]
pub struct FixedAdvance;

#[cfg(test)]
impl TextMeasurer for FixedAdvance {
    fn extent(&mut self, _font: &ResolvedFont, size: f32, text: &str) -> f64 {
        text.chars().count() as f64 * size as f64 * 0.6
    }

    fn line_metrics(&mut self, _font: &ResolvedFont, size: f32) -> LineMetrics {
        LineMetrics {
            ascent: size as f64 * 0.8,
            descent: size as f64 * 0.2,
        }
    }

    fn text_height(&mut self, _font: &ResolvedFont, size: f32, _text: &str) -> f64 {
        size as f64 * 0.75
    }
}
