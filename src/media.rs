use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{AudiogramError, AudiogramResult};

/// Sample rate all audio is decoded to before amplitude extraction.
pub const DECODE_SAMPLE_RATE: u32 = 44_100;

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Decode the whole file to mono f32 PCM at [`DECODE_SAMPLE_RATE`].
pub fn decode_audio_f32_mono(path: &Path) -> AudiogramResult<Vec<f32>> {
    let out = Command::new("ffmpeg")
        .arg("-v")
        .arg("error")
        .arg("-i")
        .arg(path)
        .arg("-f")
        .arg("f32le")
        .arg("-acodec")
        .arg("pcm_f32le")
        .arg("-ac")
        .arg("1")
        .arg("-ar")
        .arg(DECODE_SAMPLE_RATE.to_string())
        .arg("-")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| AudiogramError::decode(format!("failed to spawn ffmpeg: {e}")))?;

    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        return Err(AudiogramError::decode(format!(
            "ffmpeg audio decode failed for {}: {}",
            path.display(),
            stderr.trim()
        )));
    }

    let bytes = out.stdout;
    let mut samples = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        samples.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    tracing::debug!(
        path = %path.display(),
        samples = samples.len(),
        "decoded audio"
    );
    Ok(samples)
}

/// Container duration in seconds via ffprobe.
pub fn probe_duration(path: &Path) -> AudiogramResult<f64> {
    let out = Command::new("ffprobe")
        .arg("-v")
        .arg("error")
        .arg("-print_format")
        .arg("json")
        .arg("-show_format")
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| AudiogramError::decode(format!("failed to spawn ffprobe: {e}")))?;

    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        return Err(AudiogramError::decode(format!(
            "ffprobe failed for {}: {}",
            path.display(),
            stderr.trim()
        )));
    }

    let v: serde_json::Value = serde_json::from_slice(&out.stdout)
        .map_err(|e| AudiogramError::decode(format!("ffprobe output was not JSON: {e}")))?;
    let dur = v
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|d| d.as_str())
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| {
            AudiogramError::decode(format!("no duration reported for {}", path.display()))
        })?;
    Ok(dur)
}

/// Cut `[start, start + duration)` out of `src` into an mp3 at `dst`.
pub fn extract_audio_segment(
    src: &Path,
    dst: &Path,
    start: f64,
    duration: f64,
) -> AudiogramResult<()> {
    if !start.is_finite() || start < 0.0 || !duration.is_finite() || duration <= 0.0 {
        return Err(AudiogramError::validation(
            "segment start must be >= 0 and duration > 0",
        ));
    }
    let out = Command::new("ffmpeg")
        .arg("-v")
        .arg("error")
        .arg("-y")
        .arg("-ss")
        .arg(format!("{start}"))
        .arg("-t")
        .arg(format!("{duration}"))
        .arg("-i")
        .arg(src)
        .arg("-acodec")
        .arg("libmp3lame")
        .arg(dst)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| AudiogramError::decode(format!("failed to spawn ffmpeg: {e}")))?;

    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        return Err(AudiogramError::decode(format!(
            "ffmpeg segment extraction failed: {}",
            stderr.trim()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_bounds_are_validated() {
        let src = Path::new("in.mp3");
        let dst = Path::new("out.mp3");
        assert!(extract_audio_segment(src, dst, -1.0, 5.0).is_err());
        assert!(extract_audio_segment(src, dst, 0.0, 0.0).is_err());
        assert!(extract_audio_segment(src, dst, f64::NAN, 5.0).is_err());
    }
}
