use std::{
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::{
    compose::FrameRgba,
    error::{AudiogramError, AudiogramResult},
    media::is_ffmpeg_on_path,
};

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub audio_path: Option<PathBuf>,
    pub out_path: PathBuf,
    pub overwrite: bool,
    pub threads: u32,
    pub preset: String,
    pub video_codec: String,
    pub audio_codec: String,
}

impl EncodeConfig {
    pub fn mp4(out_path: impl Into<PathBuf>, width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            fps,
            audio_path: None,
            out_path: out_path.into(),
            overwrite: true,
            threads: 4,
            preset: "veryfast".to_string(),
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
        }
    }

    pub fn with_audio(mut self, audio_path: impl Into<PathBuf>) -> Self {
        self.audio_path = Some(audio_path.into());
        self
    }

    pub fn validate(&self) -> AudiogramResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(AudiogramError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(AudiogramError::validation("encode fps must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // yuv420p output needs even dimensions.
            return Err(AudiogramError::validation(
                "encode width/height must be even for yuv420p mp4 output",
            ));
        }
        Ok(())
    }
}

pub fn ensure_parent_dir(path: &Path) -> AudiogramResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Streams raw RGBA frames to a system `ffmpeg` process over stdin; the
/// audio track is muxed in by ffmpeg from the original file in one pass.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    child: Child,
    stdin: Option<ChildStdin>,
    scratch: Vec<u8>,
}

impl FfmpegEncoder {
    pub fn new(cfg: EncodeConfig) -> AudiogramResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(AudiogramError::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(AudiogramError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        // System ffmpeg binary over a library binding keeps the build free of
        // native FFmpeg dev headers.
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if cfg.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
        ]);

        if let Some(audio) = &cfg.audio_path {
            cmd.arg("-i").arg(audio);
            cmd.args(["-map", "0:v", "-map", "1:a"]);
            cmd.args(["-c:a", &cfg.audio_codec]);
            cmd.arg("-shortest");
        } else {
            cmd.arg("-an");
        }

        cmd.args([
            "-c:v",
            &cfg.video_codec,
            "-pix_fmt",
            "yuv420p",
            "-preset",
            &cfg.preset,
            "-threads",
            &cfg.threads.to_string(),
            "-movflags",
            "+faststart",
        ])
        .arg(&cfg.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            AudiogramError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| AudiogramError::encode("failed to open ffmpeg stdin"))?;

        Ok(Self {
            scratch: vec![0u8; (cfg.width * cfg.height * 4) as usize],
            cfg,
            child,
            stdin: Some(stdin),
        })
    }

    pub fn encode_frame(&mut self, frame: &FrameRgba) -> AudiogramResult<()> {
        if frame.width != self.cfg.width || frame.height != self.cfg.height {
            return Err(AudiogramError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.cfg.width, self.cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(AudiogramError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_to_opaque_rgba8(&mut self.scratch, &frame.data, frame.premultiplied)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(AudiogramError::encode("ffmpeg encoder is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            AudiogramError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    pub fn finish(mut self) -> AudiogramResult<()> {
        drop(self.stdin.take());

        let output = self
            .child
            .wait_with_output()
            .map_err(|e| AudiogramError::encode(format!("failed to wait for ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AudiogramError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Composite the frame over an opaque black backing and force alpha to 255
/// so the rawvideo stream carries no transparency.
fn flatten_to_opaque_rgba8(dst: &mut [u8], src: &[u8], src_is_premul: bool) -> AudiogramResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(AudiogramError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        for c in 0..3 {
            d[c] = if src_is_premul {
                s[c]
            } else {
                mul_div255(u16::from(s[c]), a)
            };
        }
        d[3] = 255;
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_validation_catches_bad_values() {
        assert!(EncodeConfig::mp4("out.mp4", 0, 10, 30).validate().is_err());
        assert!(EncodeConfig::mp4("out.mp4", 11, 10, 30).validate().is_err());
        assert!(EncodeConfig::mp4("out.mp4", 10, 10, 0).validate().is_err());
        assert!(EncodeConfig::mp4("out.mp4", 10, 10, 24).validate().is_ok());
    }

    #[test]
    fn flatten_premul_over_black_keeps_channels() {
        let src = vec![128u8, 0, 0, 128];
        let mut dst = vec![0u8; 4];
        flatten_to_opaque_rgba8(&mut dst, &src, true).unwrap();
        assert_eq!(dst, vec![128u8, 0, 0, 255]);
    }

    #[test]
    fn flatten_straight_scales_by_alpha() {
        let src = vec![255u8, 0, 0, 128];
        let mut dst = vec![0u8; 4];
        flatten_to_opaque_rgba8(&mut dst, &src, false).unwrap();
        assert_eq!(dst, vec![128u8, 0, 0, 255]);
    }

    #[test]
    fn opaque_pixels_pass_through() {
        let src = vec![10u8, 20, 30, 255];
        let mut dst = vec![0u8; 4];
        flatten_to_opaque_rgba8(&mut dst, &src, true).unwrap();
        assert_eq!(dst, src);
    }
}
