use crate::amplitude::extract_amplitudes;
use crate::compose::{FrameComposer, FrameRgba};
use crate::encode::{EncodeConfig, FfmpegEncoder};
use crate::error::AudiogramResult;
use crate::media::decode_audio_f32_mono;
use crate::model::RenderRequest;

/// Full render: decode the audio, precompute amplitudes, then stream every
/// frame of `[0, duration)` into the encoder alongside the original audio.
#[tracing::instrument(skip(req), fields(out = %req.output_path.display(), format = %req.format))]
pub fn render_audiogram(req: &RenderRequest) -> AudiogramResult<()> {
    req.validate()?;

    let samples = decode_audio_f32_mono(&req.audio_path)?;
    let amplitudes = extract_amplitudes(&samples, req.duration, req.fps);
    let mut composer = FrameComposer::new(req, amplitudes)?;

    let dims = req.dimensions();
    let cfg = EncodeConfig::mp4(&req.output_path, dims.width, dims.height, req.fps)
        .with_audio(&req.audio_path);
    let mut encoder = FfmpegEncoder::new(cfg)?;

    let total_frames = ((req.duration * req.fps as f64).floor() as u64).max(1);
    tracing::info!(total_frames, fps = req.fps, "rendering audiogram");

    for idx in 0..total_frames {
        let t = idx as f64 / req.fps as f64;
        let frame = composer.compose(t)?;
        encoder.encode_frame(&frame)?;
    }
    encoder.finish()?;

    tracing::info!(out = %req.output_path.display(), "audiogram written");
    Ok(())
}

/// Compose one frame without touching the encoder; used for previews.
pub fn compose_single_frame(req: &RenderRequest, t: f64) -> AudiogramResult<FrameRgba> {
    req.validate()?;
    let samples = decode_audio_f32_mono(&req.audio_path)?;
    let amplitudes = extract_amplitudes(&samples, req.duration, req.fps);
    let mut composer = FrameComposer::new(req, amplitudes)?;
    composer.compose(t.clamp(0.0, req.duration))
}
