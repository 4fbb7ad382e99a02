/// Per-frame audio loudness in `[0, 1]`, one entry per video frame.
#[derive(Clone, Debug)]
pub struct AmplitudeVector {
    values: Vec<f32>,
    duration: f64,
}

impl AmplitudeVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Amplitude at time `t`, mapping `[0, duration)` over the vector and
    /// clamping out-of-range times to the edges.
    pub fn sample(&self, t: f64) -> f32 {
        if self.values.is_empty() || self.duration <= 0.0 {
            return 0.0;
        }
        let idx = ((t / self.duration) * self.values.len() as f64).floor() as i64;
        let idx = idx.clamp(0, self.values.len() as i64 - 1) as usize;
        self.values[idx]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

/// Mean absolute amplitude per frame window, normalized by the clip's peak
/// absolute sample. Silent clips stay all-zero rather than dividing by zero.
pub fn extract_amplitudes(samples: &[f32], duration: f64, fps: u32) -> AmplitudeVector {
    if samples.is_empty() {
        return AmplitudeVector {
            values: Vec::new(),
            duration,
        };
    }

    let total_frames = (duration * fps as f64).floor() as usize;
    let total_frames = total_frames.max(1);
    let samples_per_frame = samples.len() / total_frames;

    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));

    let mut values = Vec::with_capacity(total_frames);
    for frame in 0..total_frames {
        if samples_per_frame == 0 {
            values.push(0.0);
            continue;
        }
        let start = frame * samples_per_frame;
        let end = if frame + 1 == total_frames {
            samples.len()
        } else {
            start + samples_per_frame
        };
        let window = &samples[start..end];
        let mean_abs = window.iter().map(|s| s.abs()).sum::<f32>() / window.len() as f32;
        let v = if peak > 0.0 { mean_abs / peak } else { 0.0 };
        values.push(v.clamp(0.0, 1.0));
    }

    AmplitudeVector { values, duration }
}
