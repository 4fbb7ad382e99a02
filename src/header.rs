use crate::model::HeaderTitleSource;
use crate::text::{ResolvedFont, TextMeasurer, wrap_greedy};

/// Uniform spacing multiplier between header lines.
const HEADER_LINE_SPACING: f64 = 1.45;
/// Hard cap on header lines; overflow is ellipsized, never grows a 4th line.
const HEADER_MAX_LINES: usize = 3;
const MIN_HEADER_FONT_SIZE: f32 = 12.0;
const FONT_SIZE_STEP: f32 = 2.0;

/// Pick the header string for a render. Pure precedence over the three
/// candidate titles; `auto` deliberately never consults the soundbite title.
pub fn resolve_header_text(
    source: HeaderTitleSource,
    podcast_title: Option<&str>,
    episode_title: Option<&str>,
    soundbite_title: Option<&str>,
) -> Option<String> {
    let non_empty = |s: Option<&str>| {
        s.map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    };
    match source {
        HeaderTitleSource::None => None,
        HeaderTitleSource::Podcast => non_empty(podcast_title),
        HeaderTitleSource::Episode => non_empty(episode_title),
        HeaderTitleSource::Soundbite => non_empty(soundbite_title)
            .or_else(|| non_empty(episode_title))
            .or_else(|| non_empty(podcast_title)),
        HeaderTitleSource::Auto => non_empty(episode_title).or_else(|| non_empty(podcast_title)),
    }
}

/// Result of the header size search: the accepted size, the wrapped lines and
/// the vertical extent they occupy.
#[derive(Clone, Debug)]
pub struct HeaderFit {
    pub font_size: f32,
    pub lines: Vec<String>,
    /// Ink height of the tallest line at the accepted size.
    pub base_line_height: f64,
    pub total_height: f64,
}

/// Find the largest font size whose 3-line greedy wrap of `text` fits
/// `max_width x max_height`. The search walks down from `0.26 x header
/// height` (at least 16) in steps of 2 to a floor of 12; if nothing fits,
/// the floor size is accepted and allowed to overflow slightly.
pub fn fit_header_text(
    measurer: &mut dyn TextMeasurer,
    font: &ResolvedFont,
    text: &str,
    max_width: f64,
    max_height: f64,
    header_height: u32,
) -> Option<HeaderFit> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let start = (header_height as f64 * 0.26).round().max(16.0) as f32;
    let mut size = start.max(MIN_HEADER_FONT_SIZE);
    let mut last: Option<HeaderFit> = None;

    loop {
        let (mut lines, overflowed) =
            wrap_greedy(measurer, font, size, text, max_width, HEADER_MAX_LINES);
        if overflowed {
            if let Some(line) = lines.last_mut() {
                *line = ellipsize(measurer, font, size, line, max_width);
            }
        }

        // Block height is driven by the tallest line's ink height, not the
        // face's ascent + descent, so the spacing stays uniform no matter
        // which lines carry ascenders or descenders.
        let line_height = lines
            .iter()
            .map(|line| measurer.text_height(font, size, line))
            .fold(0.0, f64::max);
        let total_height = if lines.is_empty() {
            0.0
        } else {
            line_height + (lines.len() as f64 - 1.0) * line_height * HEADER_LINE_SPACING
        };

        let fit = HeaderFit {
            font_size: size,
            lines,
            base_line_height: line_height,
            total_height,
        };
        if total_height <= max_height {
            return Some(fit);
        }
        last = Some(fit);

        if size <= MIN_HEADER_FONT_SIZE {
            return last;
        }
        size = (size - FONT_SIZE_STEP).max(MIN_HEADER_FONT_SIZE);
    }
}

/// Shorten `line` until it fits `max_width` with a trailing ellipsis. Drops
/// two characters per step; bottoms out at the bare ellipsis.
fn ellipsize(
    measurer: &mut dyn TextMeasurer,
    font: &ResolvedFont,
    size: f32,
    line: &str,
    max_width: f64,
) -> String {
    let mut chars: Vec<char> = line.chars().collect();
    loop {
        let mut candidate: String = chars.iter().collect();
        candidate.truncate(candidate.trim_end().len());
        candidate.push('…');
        if chars.is_empty() || measurer.extent(font, size, &candidate) <= max_width {
            return candidate;
        }
        let keep = chars.len().saturating_sub(2);
        chars.truncate(keep);
    }
}
