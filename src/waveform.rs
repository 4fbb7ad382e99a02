use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fixed seed so every render of the same audio produces identical bars.
pub const WAVEFORM_SEED: u64 = 42;
pub const BAR_WIDTH: f64 = 12.0;
pub const BAR_SPACING: f64 = 3.0;

const BAR_PITCH: f64 = BAR_WIDTH + BAR_SPACING;
const MIN_HEIGHT_RATIO: f64 = 0.03;
const MAX_HEIGHT_RATIO: f64 = 0.70;

/// Largest even bar count whose total span fits `width`.
pub fn bar_count(width: u32) -> usize {
    let n = (width as f64 / BAR_PITCH).floor() as usize;
    n & !1
}

/// Left edge of bar `i`. Bars run from x = 0; any slack from the even-count
/// rounding stays on the right edge.
pub fn bar_x(i: usize) -> f64 {
    i as f64 * BAR_PITCH
}

/// Per-bar sensitivity multipliers in `[0.6, 1.4)`, mirrored around the
/// center so the left and right halves of the waveform match.
pub fn bar_sensitivities(count: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(WAVEFORM_SEED);
    let half: Vec<f64> = (0..count.div_ceil(2))
        .map(|_| rng.random_range(0.6..1.4))
        .collect();
    (0..count)
        .map(|i| half[i.min(count - 1 - i)])
        .collect()
}

/// Boost factor 1.4 at the exact center tapering linearly to 1.0 at the
/// outermost bars.
pub fn center_boost(i: usize, count: usize) -> f64 {
    if count <= 1 {
        return 1.4;
    }
    let half_span = (count as f64 - 1.0) / 2.0;
    let norm = (i as f64 - half_span).abs() / half_span;
    1.0 + (1.0 - norm) * 0.4
}

/// Pixel height of one bar. The boosted amplitude maps linearly into the
/// `[3%, 70%]` band of the central height, so silence sits at the minimum
/// and only a boosted amplitude past 1.0 saturates at the maximum.
pub fn bar_height(amplitude: f32, sensitivity: f64, boost: f64, central_height: u32) -> f64 {
    let min = central_height as f64 * MIN_HEIGHT_RATIO;
    let max = central_height as f64 * MAX_HEIGHT_RATIO;
    let raw = min + amplitude as f64 * sensitivity * boost * (max - min);
    raw.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_count_is_even_and_fits() {
        for width in [1080u32, 1920, 100, 29, 14] {
            let n = bar_count(width);
            assert_eq!(n % 2, 0, "width {width}");
            assert!(n as f64 * BAR_PITCH <= width as f64, "width {width}");
        }
        assert_eq!(bar_count(1080), 72);
        assert_eq!(bar_count(14), 0);
    }

    #[test]
    fn sensitivities_are_deterministic_and_mirrored() {
        let a = bar_sensitivities(72);
        let b = bar_sensitivities(72);
        assert_eq!(a, b);
        for i in 0..72 {
            assert_eq!(a[i], a[71 - i]);
            assert!((0.6..1.4).contains(&a[i]));
        }
    }

    #[test]
    fn boost_peaks_at_center_and_rests_at_edges() {
        let n = 72;
        assert!((center_boost(0, n) - 1.0).abs() < 1e-9);
        assert!((center_boost(n - 1, n) - 1.0).abs() < 1e-9);
        let mid = center_boost(n / 2, n);
        assert!(mid > 1.35 && mid <= 1.4);
    }

    #[test]
    fn heights_map_into_the_clamp_range() {
        let central = 1000u32;
        // min = 30, max = 700.
        assert_eq!(bar_height(0.0, 1.0, 1.0, central), 30.0);
        assert_eq!(bar_height(1.0, 1.4, 1.4, central), 700.0);
        // Mid-level amplitude lands mid-range, not at half the band.
        assert_eq!(bar_height(0.5, 1.0, 1.0, central), 365.0);
        assert_eq!(bar_height(1.0, 1.0, 1.0, central), 700.0);
    }

    #[test]
    fn bars_run_from_the_left_edge() {
        assert_eq!(bar_x(0), 0.0);
        assert_eq!(bar_x(1), BAR_PITCH);
        let width = 1080u32;
        let n = bar_count(width);
        assert!(bar_x(n - 1) + BAR_WIDTH <= width as f64);
    }
}
