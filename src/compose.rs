use std::collections::HashMap;
use std::sync::Arc;

use vello_cpu::kurbo::{Affine, Rect, RoundedRect, Shape};
use vello_cpu::{Pixmap, RenderContext};

use crate::amplitude::AmplitudeVector;
use crate::assets::{LogoBitmap, prepare_logo};
use crate::blur::blur_rgba8_premul;
use crate::composite::over_in_place;
use crate::error::{AudiogramError, AudiogramResult};
use crate::header::{HeaderFit, fit_header_text, resolve_header_text};
use crate::layout::{FrameGeometry, LayoutConfig, layout_for};
use crate::model::{ColorSet, RenderRequest, SubtitleStyle, TranscriptChunk};
use crate::subtitle::layout_subtitle;
use crate::text::{ParleyShaper, ResolvedFont, TextBrushRgba8};
use crate::waveform;

/// Horizontal and vertical header padding as fractions of width and header
/// height respectively.
const HEADER_PAD_RATIO: f64 = 0.04;
/// Spacing multiplier between header lines, matching the fitter.
const HEADER_LINE_SPACING: f64 = 1.45;
const SUBTITLE_SHADOW_RGBA: [u8; 4] = [0, 0, 0, 140];

/// One finished frame, premultiplied RGBA8 in row-major order.
#[derive(Clone, Debug)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// Per-render frame factory. Everything that is constant across frames is
/// computed once here; `compose` is then pure per timestamp.
pub struct FrameComposer {
    geometry: FrameGeometry,
    layout: &'static LayoutConfig,
    colors: ColorSet,
    style: SubtitleStyle,
    chunks: Vec<TranscriptChunk>,
    show_subtitles: bool,
    duration: f64,

    amplitudes: AmplitudeVector,
    bar_count: usize,
    sensitivities: Vec<f64>,

    logo: Option<(vello_cpu::Image, u32)>,

    shaper: ParleyShaper,
    header_font: ResolvedFont,
    transcript_font: ResolvedFont,
    header_fit: Option<HeaderFit>,
    subtitle_font_size: f32,
    font_cache: HashMap<u64, vello_cpu::peniko::FontData>,

    width_u16: u16,
    height_u16: u16,
}

impl FrameComposer {
    pub fn new(req: &RenderRequest, amplitudes: AmplitudeVector) -> AudiogramResult<Self> {
        let dims = req.dimensions();
        let layout = layout_for(&req.format);
        let geometry = FrameGeometry::new(dims, layout);
        let width_u16: u16 = geometry
            .width
            .try_into()
            .map_err(|_| AudiogramError::validation("frame width exceeds u16"))?;
        let height_u16: u16 = geometry
            .height
            .try_into()
            .map_err(|_| AudiogramError::validation("frame height exceeds u16"))?;

        let mut shaper = ParleyShaper::new();
        let header_font = shaper.resolve(req.fonts.header.as_deref());
        let transcript_font = shaper.resolve(req.fonts.transcript.as_deref());

        let override_title = req
            .header_title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let header_fit = override_title
            .or_else(|| {
                resolve_header_text(
                    req.header_title_source,
                    req.podcast_title.as_deref(),
                    req.episode_title.as_deref(),
                    req.soundbite_title.as_deref(),
                )
            })
            .and_then(|text| {
                let pad_x = geometry.width as f64 * HEADER_PAD_RATIO;
                let pad_y = geometry.header_height as f64 * HEADER_PAD_RATIO;
                fit_header_text(
                    &mut shaper,
                    &header_font,
                    &text,
                    geometry.width as f64 - 2.0 * pad_x,
                    geometry.header_height as f64 - 2.0 * pad_y,
                    geometry.header_height,
                )
            });

        let logo_edge = logo_edge(&geometry, layout);
        let logo = prepare_logo(req.logo_path.as_deref(), logo_edge)?
            .map(|bitmap| logo_paint(&bitmap).map(|paint| (paint, bitmap.edge)))
            .transpose()?;

        let bar_count = waveform::bar_count(geometry.width);
        let sensitivities = waveform::bar_sensitivities(bar_count);

        let subtitle_font_size =
            (geometry.height as f64 * layout.subtitle_font_ratio).round().max(1.0) as f32;

        Ok(Self {
            geometry,
            layout,
            colors: req.colors,
            style: req.subtitle_style.clone(),
            chunks: req.transcript_chunks.clone(),
            show_subtitles: req.show_subtitles,
            duration: req.duration,
            amplitudes,
            bar_count,
            sensitivities,
            logo,
            shaper,
            header_font,
            transcript_font,
            header_fit,
            subtitle_font_size,
            font_cache: HashMap::new(),
            width_u16,
            height_u16,
        })
    }

    pub fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }

    /// Render the frame for time `t` seconds.
    pub fn compose(&mut self, t: f64) -> AudiogramResult<FrameRgba> {
        let mut base = Pixmap::new(self.width_u16, self.height_u16);
        let mut ctx = RenderContext::new(self.width_u16, self.height_u16);
        self.draw_bands(&mut ctx, t);
        self.draw_header_text(&mut ctx);
        ctx.flush();
        ctx.render_to_pixmap(&mut base);

        if self.show_subtitles {
            self.draw_subtitles(&mut base, t)?;
        }

        Ok(FrameRgba {
            width: self.geometry.width,
            height: self.geometry.height,
            data: base.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn draw_bands(&mut self, ctx: &mut RenderContext, t: f64) {
        let geo = self.geometry;
        let (w, h) = (geo.width as f64, geo.height as f64);
        ctx.set_transform(Affine::IDENTITY);

        ctx.set_paint(rgb_paint(self.colors.background));
        ctx.fill_rect(&Rect::new(0.0, 0.0, w, h));

        ctx.set_paint(rgb_paint(self.colors.primary));
        ctx.fill_rect(&Rect::new(0.0, 0.0, w, geo.header_height as f64));
        ctx.fill_rect(&Rect::new(0.0, geo.central_bottom as f64, w, h));

        if let Some((paint, edge)) = &self.logo {
            let edge = *edge as f64;
            let x0 = (w - edge) / 2.0;
            let y0 = geo.central_top as f64 + (geo.central_height as f64 - edge) / 2.0;
            ctx.set_transform(Affine::translate((x0, y0)));
            ctx.set_paint(paint.clone());
            ctx.fill_rect(&Rect::new(0.0, 0.0, edge, edge));
            ctx.set_transform(Affine::IDENTITY);
        } else {
            self.draw_waveform(ctx, t);
        }
    }

    fn draw_waveform(&mut self, ctx: &mut RenderContext, t: f64) {
        if self.bar_count == 0 || self.amplitudes.is_empty() {
            return;
        }
        let geo = self.geometry;
        let amp = self.amplitudes.sample(t.clamp(0.0, self.duration));
        let center_y = geo.central_top as f64 + geo.central_height as f64 / 2.0;

        ctx.set_transform(Affine::IDENTITY);
        ctx.set_paint(rgb_paint(self.colors.primary));
        for i in 0..self.bar_count {
            let boost = waveform::center_boost(i, self.bar_count);
            let height =
                waveform::bar_height(amp, self.sensitivities[i], boost, geo.central_height);
            let x = waveform::bar_x(i);
            ctx.fill_rect(&Rect::new(
                x,
                center_y - height / 2.0,
                x + waveform::BAR_WIDTH,
                center_y + height / 2.0,
            ));
        }
    }

    fn draw_header_text(&mut self, ctx: &mut RenderContext) {
        let Some(fit) = self.header_fit.clone() else {
            return;
        };
        let geo = self.geometry;
        let x = geo.width as f64 * HEADER_PAD_RATIO;
        let block_bottom =
            geo.header_height as f64 - geo.header_height as f64 * HEADER_PAD_RATIO;
        let block_top = (block_bottom - fit.total_height).max(0.0);
        let advance = fit.base_line_height * HEADER_LINE_SPACING;

        let [r, g, b] = self.colors.text;
        let font = self.header_font.clone();
        for (i, line) in fit.lines.iter().enumerate() {
            let y = block_top + i as f64 * advance;
            self.draw_text_line(
                ctx,
                &font,
                fit.font_size,
                TextBrushRgba8([r, g, b, 255]),
                line,
                x,
                y,
            );
        }
    }

    fn draw_subtitles(&mut self, base: &mut Pixmap, t: f64) -> AudiogramResult<()> {
        let Some(chunk) = self.chunks.iter().find(|c| c.contains(t)).cloned() else {
            return Ok(());
        };
        let geo = self.geometry;
        let Some(mut sub) = layout_subtitle(
            &mut self.shaper,
            &self.transcript_font,
            self.subtitle_font_size,
            &self.style,
            self.layout.max_subtitle_lines,
            &chunk.text,
            geo.width as f64,
            0.0,
        ) else {
            return Ok(());
        };

        // The anchor ratio is a fraction of the central band: >= 0.5 measures
        // down from the top of the band, < 0.5 up from its bottom.
        let ratio = self.layout.subtitle_y_ratio;
        let start_y = if ratio >= 0.5 {
            geo.central_top as f64 + ratio * geo.central_height as f64
        } else {
            geo.central_bottom as f64 - ratio * geo.central_height as f64
        };
        for line in &mut sub.lines {
            line.y += start_y;
        }

        let pad = self.style.padding;
        let boxes: Vec<RoundedRect> = sub
            .lines
            .iter()
            .map(|line| {
                RoundedRect::new(
                    line.x - pad,
                    line.y - pad,
                    line.x + line.width + pad,
                    line.y + sub.line_height + pad,
                    self.style.corner_radius,
                )
            })
            .collect();

        if self.style.shadow {
            let mut shadow = Pixmap::new(self.width_u16, self.height_u16);
            let mut ctx = RenderContext::new(self.width_u16, self.height_u16);
            let [dx, dy] = self.style.shadow_offset;
            ctx.set_transform(Affine::translate((dx, dy)));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                SUBTITLE_SHADOW_RGBA[0],
                SUBTITLE_SHADOW_RGBA[1],
                SUBTITLE_SHADOW_RGBA[2],
                SUBTITLE_SHADOW_RGBA[3],
            ));
            for rr in &boxes {
                ctx.fill_path(&rr.to_path(0.1));
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut shadow);

            let blurred = blur_rgba8_premul(
                shadow.data_as_u8_slice(),
                geo.width,
                geo.height,
                self.style.shadow_blur,
            )?;
            over_in_place(base.data_as_u8_slice_mut(), &blurred)?;
        }

        let mut overlay = Pixmap::new(self.width_u16, self.height_u16);
        let mut ctx = RenderContext::new(self.width_u16, self.height_u16);
        ctx.set_transform(Affine::IDENTITY);
        let [br, bg, bb] = self.colors.transcript_bg;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            br,
            bg,
            bb,
            self.style.bg_alpha,
        ));
        for rr in &boxes {
            ctx.fill_path(&rr.to_path(0.1));
        }

        let [tr, tg, tb] = self.colors.text;
        let font = self.transcript_font.clone();
        let lines = sub.lines.clone();
        for line in &lines {
            self.draw_text_line(
                &mut ctx,
                &font,
                self.subtitle_font_size,
                TextBrushRgba8([tr, tg, tb, 255]),
                &line.text,
                line.x,
                line.y,
            );
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut overlay);
        over_in_place(base.data_as_u8_slice_mut(), overlay.data_as_u8_slice())?;
        Ok(())
    }

    /// Shape and fill one pre-wrapped line with its top-left corner at
    /// `(x, y)`.
    fn draw_text_line(
        &mut self,
        ctx: &mut RenderContext,
        font: &ResolvedFont,
        size: f32,
        color: TextBrushRgba8,
        text: &str,
        x: f64,
        y: f64,
    ) {
        let layout = self.shaper.layout_line(font, size, color, text);
        ctx.set_transform(Affine::translate((x, y)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.0[0], brush.0[1], brush.0[2], brush.0[3],
                ));
                let font_data = self.font_data_for_run(&run);
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font_data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.set_transform(Affine::IDENTITY);
    }

    fn font_data_for_run(
        &mut self,
        run: &parley::layout::GlyphRun<'_, TextBrushRgba8>,
    ) -> vello_cpu::peniko::FontData {
        let font = run.run().font();
        let key = font.data.id();
        if let Some(cached) = self.font_cache.get(&key) {
            return cached.clone();
        }
        let data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font.data.as_ref().to_vec()),
            font.index,
        );
        self.font_cache.insert(key, data.clone());
        data
    }
}

fn logo_edge(geo: &FrameGeometry, layout: &LayoutConfig) -> u32 {
    let by_height = geo.central_height as f64 * layout.logo_size_ratio;
    let edge = match layout.logo_width_ratio {
        Some(wr) => (geo.width as f64 * wr).min(by_height),
        None => geo.width.min(geo.central_height) as f64 * layout.logo_size_ratio,
    };
    edge.round().max(0.0) as u32
}

fn logo_paint(bitmap: &LogoBitmap) -> AudiogramResult<vello_cpu::Image> {
    let edge: u16 = bitmap
        .edge
        .try_into()
        .map_err(|_| AudiogramError::render("logo edge exceeds u16"))?;
    if bitmap.rgba8_premul.len() != bitmap.edge as usize * bitmap.edge as usize * 4 {
        return Err(AudiogramError::render("logo byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(bitmap.edge as usize * bitmap.edge as usize);
    for px in bitmap.rgba8_premul.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        });
    }
    let pixmap = Pixmap::from_parts_with_opacity(pixels, edge, edge, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn rgb_paint([r, g, b]: [u8; 3]) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(r, g, b, 255)
}
