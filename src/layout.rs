use crate::model::Format;

/// Band ratios and subtitle placement for one format family. Ratios are
/// fractions of the frame height (width for `logo_width_ratio` when set).
#[derive(Clone, Copy, Debug)]
pub struct LayoutConfig {
    pub name: &'static str,
    pub header_ratio: f64,
    pub central_ratio: f64,
    pub footer_ratio: f64,
    /// Logo edge as a fraction of the central band height.
    pub logo_size_ratio: f64,
    /// When set, the logo edge is instead this fraction of the frame width.
    pub logo_width_ratio: Option<f64>,
    /// Subtitle font size as a fraction of the frame height.
    pub subtitle_font_ratio: f64,
    /// Vertical anchor of the subtitle block as a fraction of the frame height.
    pub subtitle_y_ratio: f64,
    /// Layout-level cap on subtitle lines.
    pub max_subtitle_lines: usize,
}

const VERTICAL: LayoutConfig = LayoutConfig {
    name: "vertical",
    header_ratio: 0.17,
    central_ratio: 0.54,
    footer_ratio: 0.27,
    logo_size_ratio: 0.6,
    logo_width_ratio: None,
    subtitle_font_ratio: 0.028,
    subtitle_y_ratio: 0.84,
    max_subtitle_lines: 5,
};

const SQUARE: LayoutConfig = LayoutConfig {
    name: "square",
    header_ratio: 0.12,
    central_ratio: 0.66,
    footer_ratio: 0.20,
    logo_size_ratio: 0.5,
    logo_width_ratio: None,
    subtitle_font_ratio: 0.030,
    subtitle_y_ratio: 0.15,
    max_subtitle_lines: 3,
};

const HORIZONTAL: LayoutConfig = LayoutConfig {
    name: "horizontal",
    header_ratio: 0.15,
    central_ratio: 0.68,
    footer_ratio: 0.15,
    logo_size_ratio: 0.6,
    logo_width_ratio: Some(0.3),
    subtitle_font_ratio: 0.030,
    subtitle_y_ratio: 0.12,
    max_subtitle_lines: 2,
};

/// Layout for a format name. Unknown names use the vertical layout so a
/// custom-dimension format still renders.
pub fn layout_for(format: &str) -> &'static LayoutConfig {
    match format {
        "square" => &SQUARE,
        "horizontal" => &HORIZONTAL,
        _ => &VERTICAL,
    }
}

/// Built-in dimensions for a format name, vertical for unknown names.
pub fn builtin_format(format: &str) -> Format {
    match format {
        "square" => Format {
            width: 1080,
            height: 1080,
        },
        "horizontal" => Format {
            width: 1920,
            height: 1080,
        },
        _ => Format {
            width: 1080,
            height: 1920,
        },
    }
}

/// Pixel geometry of the three stacked bands. The central band absorbs
/// rounding slack so the three bands always tile the full height.
#[derive(Clone, Copy, Debug)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    pub header_height: u32,
    pub central_top: u32,
    pub central_height: u32,
    pub central_bottom: u32,
    pub footer_height: u32,
}

impl FrameGeometry {
    pub fn new(dims: Format, layout: &LayoutConfig) -> Self {
        let header_height = (dims.height as f64 * layout.header_ratio).round() as u32;
        let footer_height = (dims.height as f64 * layout.footer_ratio).round() as u32;
        let central_height = dims.height.saturating_sub(header_height + footer_height);
        let central_top = header_height;
        Self {
            width: dims.width,
            height: dims.height,
            header_height,
            central_top,
            central_height,
            central_bottom: central_top + central_height,
            footer_height,
        }
    }
}
