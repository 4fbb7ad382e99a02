use crate::error::{AudiogramError, AudiogramResult};

/// Separable gaussian blur over premultiplied RGBA8. Sigma is derived from
/// the radius so callers only pick a pixel radius.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
) -> AudiogramResult<Vec<u8>> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| AudiogramError::render("blur buffer size overflow"))?;
    if src.len() != expected {
        return Err(AudiogramError::render(
            "blur_rgba8_premul expects src of width*height*4 bytes",
        ));
    }
    if radius == 0 {
        return Ok(src.to_vec());
    }

    let sigma = radius as f64 / 2.0;
    let kernel = gaussian_kernel_q16(radius, sigma);
    let mut tmp = vec![0u8; expected];
    let mut out = vec![0u8; expected];
    directed_pass(src, &mut tmp, width, height, &kernel, Axis::X);
    directed_pass(&tmp, &mut out, width, height, &kernel, Axis::Y);
    Ok(out)
}

/// Kernel weights in Q16 fixed point, renormalized so they sum to exactly
/// 1 << 16 and a constant image blurs to itself.
fn gaussian_kernel_q16(radius: u32, sigma: f64) -> Vec<u32> {
    let r = radius as i64;
    let denom = 2.0 * sigma * sigma;
    let raw: Vec<f64> = (-r..=r).map(|i| (-(i * i) as f64 / denom).exp()).collect();
    let sum: f64 = raw.iter().sum();

    let mut weights: Vec<u32> = raw
        .iter()
        .map(|w| (((w / sum) * 65536.0).round() as i64).clamp(0, 65536) as u32)
        .collect();
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let mid = weights.len() / 2;
    weights[mid] = (i64::from(weights[mid]) + (65536 - acc)).clamp(0, 65536) as u32;
    weights
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

fn directed_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32], axis: Axis) {
    let radius = (k.len() / 2) as i64;
    let (w, h) = (width as i64, height as i64);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let offset = ki as i64 - radius;
                let (sx, sy) = match axis {
                    Axis::X => ((x + offset).clamp(0, w - 1), y),
                    Axis::Y => (x, (y + offset).clamp(0, h - 1)),
                };
                let idx = ((sy * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out + c] = q16_round(acc[c]);
            }
        }
    }
}

fn q16_round(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_zero_is_identity() {
        let src = vec![9u8, 8, 7, 6, 5, 4, 3, 2];
        assert_eq!(blur_rgba8_premul(&src, 2, 1, 0).unwrap(), src);
    }

    #[test]
    fn constant_image_is_unchanged() {
        let px = [40u8, 80, 120, 200];
        let src = px.repeat(12);
        let out = blur_rgba8_premul(&src, 4, 3, 5).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn point_spreads_and_conserves_alpha() {
        let (w, h) = (7u32, 7u32);
        let mut src = vec![0u8; (w * h * 4) as usize];
        let center = ((3 * w + 3) * 4) as usize;
        src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

        let out = blur_rgba8_premul(&src, w, h, 3).unwrap();
        let lit = out.chunks_exact(4).filter(|px| px[3] != 0).count();
        assert!(lit > 1);
        let total: u32 = out.chunks_exact(4).map(|px| u32::from(px[3])).sum();
        assert!((total as i32 - 255).abs() <= 4);
    }

    #[test]
    fn wrong_buffer_length_is_rejected() {
        assert!(blur_rgba8_premul(&[0u8; 10], 2, 2, 1).is_err());
    }
}
