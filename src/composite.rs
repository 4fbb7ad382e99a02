use crate::error::{AudiogramError, AudiogramResult};

pub type PremulRgba8 = [u8; 4];

/// Source-over compositing of one premultiplied pixel onto another.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for c in 0..4 {
        out[c] = src[c].saturating_add(mul_div255(u16::from(dst[c]), inv));
    }
    out
}

/// Composite an overlay buffer onto `dst`, both premultiplied RGBA8 of the
/// same length.
pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> AudiogramResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(AudiogramError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
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
    fn transparent_source_is_a_noop() {
        let dst = [10, 20, 30, 255];
        assert_eq!(over(dst, [90, 90, 90, 0]), dst);
    }

    #[test]
    fn opaque_source_replaces_destination() {
        let src = [200, 10, 10, 255];
        assert_eq!(over([0, 0, 0, 255], src), src);
    }

    #[test]
    fn source_over_transparent_destination_passes_through() {
        let src = [100, 110, 120, 200];
        assert_eq!(over([0, 0, 0, 0], src), src);
    }

    #[test]
    fn half_alpha_blends_toward_source() {
        // Premultiplied gray at half alpha over opaque black.
        let out = over([0, 0, 0, 255], [64, 64, 64, 128]);
        assert_eq!(out[3], 255);
        assert!(out[0] >= 63 && out[0] <= 65);
    }

    #[test]
    fn over_in_place_rejects_mismatched_buffers() {
        let mut dst = vec![0u8; 8];
        assert!(over_in_place(&mut dst, &[0u8; 4]).is_err());
        let mut odd = vec![0u8; 6];
        assert!(over_in_place(&mut odd, &[0u8; 6]).is_err());
    }
}
