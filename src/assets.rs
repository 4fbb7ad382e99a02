use std::path::Path;

use anyhow::Context;
use image::imageops::FilterType;

use crate::error::AudiogramResult;

/// A decoded, premultiplied logo bitmap already resized to its on-frame
/// square edge length.
#[derive(Clone, Debug)]
pub struct LogoBitmap {
    pub edge: u32,
    pub rgba8_premul: Vec<u8>,
}

/// Load and prepare the logo. A missing file means "no logo" rather than an
/// error; a file that exists but cannot be decoded is fatal.
pub fn prepare_logo(path: Option<&Path>, edge: u32) -> AudiogramResult<Option<LogoBitmap>> {
    let Some(path) = path else {
        return Ok(None);
    };
    if !path.exists() {
        tracing::warn!(path = %path.display(), "logo file not found, rendering waveform only");
        return Ok(None);
    }
    if edge == 0 {
        return Ok(None);
    }

    let bytes = std::fs::read(path)
        .with_context(|| format!("read logo {}", path.display()))?;
    let dyn_img = image::load_from_memory(&bytes)
        .with_context(|| format!("decode logo {}", path.display()))?;
    let resized = dyn_img.resize_exact(edge, edge, FilterType::Lanczos3);
    let mut rgba8_premul = resized.to_rgba8().into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    tracing::debug!(path = %path.display(), edge, "prepared logo");
    Ok(Some(LogoBitmap { edge, rgba8_premul }))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((u16::from(px[0]) * a + 127) / 255) as u8;
        px[1] = ((u16::from(px[1]) * a + 127) / 255) as u8;
        px[2] = ((u16::from(px[2]) * a + 127) / 255) as u8;
    }
}
