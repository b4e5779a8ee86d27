//! Session state behind the browser exports
//!
//! The page initializes a streamer once and then pulls interleaved f32
//! samples from its audio callback. `init` takes the raw construction path:
//! the page passes trusted numbers, so nothing is validated here and bad
//! values give bad (but bounded) audio instead of an exception.

use crate::audio::buffer::{interleave_f32, StereoFrame};
use crate::audio::signals::{BrownNoiseStreamer, FrameSource, NoiseParams};

/// One browser noise session
#[derive(Debug, Default)]
pub struct HostSession {
    streamer: Option<BrownNoiseStreamer>,
    scratch: Vec<StereoFrame>,
}

impl HostSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the streamer. No validation.
    pub fn init(&mut self, damping: f64, gain: f64, step_size: f64) {
        self.streamer = Some(BrownNoiseStreamer::new(NoiseParams {
            damping,
            gain,
            step_size,
        }));
    }

    pub fn is_initialized(&self) -> bool {
        self.streamer.is_some()
    }

    /// `frame_count * 2` interleaved samples.
    ///
    /// Before `init` the session yields silence of the requested length.
    pub fn next_samples(&mut self, frame_count: usize) -> Vec<f32> {
        let Some(streamer) = self.streamer.as_mut() else {
            log::warn!("nextSamples called before initStreamer, returning silence");
            return vec![0.0; frame_count * 2];
        };

        // Reuse the frame buffer across calls; browsers ask for the same size every time
        self.scratch.resize(frame_count, StereoFrame::silence());
        streamer.fill_buffer(&mut self.scratch);
        interleave_f32(&self.scratch)
    }
}
