use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{AudiogramError, AudiogramResult};

/// Output frame dimensions for one social-media format.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct Format {
    pub width: u32,
    pub height: u32,
}

/// Opaque fill colors for the frame, RGB 0-255 per channel.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ColorSet {
    /// Header, footer and waveform bars.
    pub primary: [u8; 3],
    /// Central band background.
    pub background: [u8; 3],
    /// Header and subtitle text.
    pub text: [u8; 3],
    /// Subtitle box fill (alpha applied by the subtitle style).
    pub transcript_bg: [u8; 3],
}

impl Default for ColorSet {
    fn default() -> Self {
        Self {
            primary: [242, 101, 34],
            background: [235, 213, 197],
            text: [255, 255, 255],
            transcript_bg: [50, 50, 50],
        }
    }
}

/// One timed transcript interval, active over `[start, end)` seconds.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TranscriptChunk {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl TranscriptChunk {
    /// Half-open containment test used to pick the active chunk.
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t < self.end
    }
}

/// Where the header bar text comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderTitleSource {
    /// Episode title, else podcast title, else no header.
    #[default]
    Auto,
    Podcast,
    Episode,
    /// Soundbite title, falling back to episode then podcast title.
    Soundbite,
    None,
}

/// Optional font file overrides; unset entries resolve to the default
/// sans-serif family.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub header: Option<PathBuf>,
    pub transcript: Option<PathBuf>,
}

/// Visual style of the subtitle boxes.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SubtitleStyle {
    /// Padding around each line's text, px.
    pub padding: f64,
    /// Rounded corner radius, px.
    pub corner_radius: f64,
    /// Line advance multiplier applied to (ascent + descent).
    pub line_spacing: f64,
    pub shadow: bool,
    /// Shadow offset (dx, dy), px.
    pub shadow_offset: [f64; 2],
    /// Shadow blur radius, px.
    pub shadow_blur: u32,
    /// Alpha applied to the transcript background color.
    pub bg_alpha: u8,
    /// Style-level line cap; the effective cap is the min with the layout cap.
    pub max_lines: usize,
    /// Fraction of the frame width available to subtitle lines.
    pub width_ratio: f64,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            padding: 18.0,
            corner_radius: 18.0,
            line_spacing: 2.0,
            shadow: true,
            shadow_offset: [0.0, 4.0],
            shadow_blur: 10,
            bg_alpha: 190,
            max_lines: 5,
            width_ratio: 0.88,
        }
    }
}

/// Everything one render needs. Built fresh per invocation; the engine keeps
/// no state across renders.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RenderRequest {
    pub audio_path: PathBuf,
    pub output_path: PathBuf,

    /// Format name; unknown names fall back to the vertical layout.
    #[serde(default = "default_format_name")]
    pub format: String,
    /// Per-format dimension overrides keyed by format name.
    #[serde(default)]
    pub formats: BTreeMap<String, Format>,

    #[serde(default)]
    pub logo_path: Option<PathBuf>,
    #[serde(default)]
    pub podcast_title: Option<String>,
    #[serde(default)]
    pub episode_title: Option<String>,
    #[serde(default)]
    pub soundbite_title: Option<String>,
    /// When set and non-empty, used verbatim as the header text regardless
    /// of `header_title_source`.
    #[serde(default)]
    pub header_title: Option<String>,

    #[serde(default)]
    pub transcript_chunks: Vec<TranscriptChunk>,

    /// Clip duration in seconds.
    pub duration: f64,
    #[serde(default = "default_fps")]
    pub fps: u32,

    #[serde(default)]
    pub colors: ColorSet,
    #[serde(default = "default_true")]
    pub show_subtitles: bool,
    #[serde(default)]
    pub header_title_source: HeaderTitleSource,
    #[serde(default)]
    pub fonts: FontConfig,
    #[serde(default)]
    pub subtitle_style: SubtitleStyle,
}

fn default_format_name() -> String {
    "vertical".to_string()
}

fn default_fps() -> u32 {
    24
}

fn default_true() -> bool {
    true
}

impl RenderRequest {
    /// Canvas size for this request: explicit override first, then the
    /// built-in table (vertical fallback for unknown names).
    pub fn dimensions(&self) -> Format {
        if let Some(f) = self.formats.get(&self.format) {
            return *f;
        }
        crate::layout::builtin_format(&self.format)
    }

    pub fn validate(&self) -> AudiogramResult<()> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(AudiogramError::validation(
                "duration must be finite and > 0 seconds",
            ));
        }
        if self.fps == 0 {
            return Err(AudiogramError::validation("fps must be non-zero"));
        }

        let dims = self.dimensions();
        if dims.width == 0 || dims.height == 0 {
            return Err(AudiogramError::validation(
                "format width/height must be > 0",
            ));
        }

        for (i, chunk) in self.transcript_chunks.iter().enumerate() {
            if !chunk.start.is_finite() || !chunk.end.is_finite() || chunk.start >= chunk.end {
                return Err(AudiogramError::validation(format!(
                    "transcript chunk {i} must have finite start < end"
                )));
            }
        }

        if self.subtitle_style.max_lines == 0 {
            return Err(AudiogramError::validation(
                "subtitle_style.max_lines must be > 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.subtitle_style.width_ratio) {
            return Err(AudiogramError::validation(
                "subtitle_style.width_ratio must be within 0..=1",
            ));
        }

        Ok(())
    }
}
