//! Stereo frame type and output-boundary conversions

/// One stereo frame, computed in f64
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f64,
    pub right: f64,
}

impl StereoFrame {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    pub fn mono(value: f64) -> Self {
        Self { left: value, right: value }
    }

    pub fn silence() -> Self {
        Self::default()
    }
}

/// Flatten frames to interleaved f32 samples (L, R, L, R, ...)
pub fn interleave_f32(frames: &[StereoFrame]) -> Vec<f32> {
    let mut out = Vec::with_capacity(frames.len() * 2);
    for frame in frames {
        out.push(frame.left as f32);
        out.push(frame.right as f32);
    }
    out
}

/// Write frames into an interleaved device buffer with `channels` channels.
///
/// Mono devices get the left sample; channels past the second are silenced.
/// Returns the number of frames written, bounded by both buffers.
pub fn write_to_channels(frames: &[StereoFrame], output: &mut [f32], channels: usize) -> usize {
    if channels == 0 {
        return 0;
    }

    let mut written = 0;
    for (frame, slot) in frames.iter().zip(output.chunks_exact_mut(channels)) {
        slot[0] = frame.left as f32;
        if channels > 1 {
            slot[1] = frame.right as f32;
        }
        for extra in slot.iter_mut().skip(2) {
            *extra = 0.0;
        }
        written += 1;
    }
    written
}
