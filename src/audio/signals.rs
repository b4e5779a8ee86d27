//! Brown noise generator (damped random walk)

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::buffer::StereoFrame;

/// Rejected construction parameter
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ValidationError {
    #[error("damping must be in (0, 1], got {0}")]
    InvalidDamping(f64),
    #[error("gain must be in [0, 1], got {0}")]
    InvalidGain(f64),
    #[error("step size must be positive, got {0}")]
    InvalidStepSize(f64),
}

/// Filter parameters.
///
/// Building a streamer straight from this struct skips validation; the
/// ranges documented on each field are then the caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    /// Per-sample decay of the walk, (0, 1]
    pub damping: f64,
    /// Output scaling, [0, 1]
    pub gain: f64,
    /// Scale of each random increment, > 0
    pub step_size: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            damping: 0.90,
            gain: 0.5,
            step_size: 0.02,
        }
    }
}

impl NoiseParams {
    /// Check ranges in order: damping, gain, step size. First failure wins.
    pub fn validate(&self) -> Result<(), ValidationError> {
        // Negated comparisons so NaN is rejected too
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(ValidationError::InvalidDamping(self.damping));
        }
        if !(self.gain >= 0.0 && self.gain <= 1.0) {
            return Err(ValidationError::InvalidGain(self.gain));
        }
        if !(self.step_size > 0.0) {
            return Err(ValidationError::InvalidStepSize(self.step_size));
        }
        Ok(())
    }
}

/// Result of one `fill_buffer` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStatus {
    pub frames_written: usize,
    /// False would mean end of stream. Noise never ends.
    pub keep_going: bool,
}

/// A source of stereo frames pulled by an audio driver
pub trait FrameSource {
    /// Fill every slot of `buffer`, in order
    fn fill_buffer(&mut self, buffer: &mut [StereoFrame]) -> StreamStatus;

    /// Error that stopped the stream, if any
    fn last_error(&self) -> Option<&(dyn std::error::Error + 'static)>;
}

/// Brown noise streamer: white noise integrated with decay, then clamped.
///
/// Not synchronized. One driver owns an instance for its whole session.
#[derive(Debug, Clone)]
pub struct BrownNoiseStreamer<R = SmallRng> {
    accumulator: f64,
    params: NoiseParams,
    rng: R,
}

impl BrownNoiseStreamer<SmallRng> {
    /// Validated constructor
    pub fn create(damping: f64, gain: f64, step_size: f64) -> Result<Self, ValidationError> {
        let params = NoiseParams {
            damping,
            gain,
            step_size,
        };
        params.validate()?;
        Ok(Self::new(params))
    }

    /// Unvalidated constructor, seeded from OS entropy
    pub fn new(params: NoiseParams) -> Self {
        Self::with_rng(params, SmallRng::from_entropy())
    }
}

impl<R: Rng> BrownNoiseStreamer<R> {
    /// Unvalidated constructor with a caller-supplied random source
    pub fn with_rng(params: NoiseParams, rng: R) -> Self {
        Self {
            accumulator: 0.0,
            params,
            rng,
        }
    }

    /// Validated constructor with a caller-supplied random source
    pub fn create_with_rng(params: NoiseParams, rng: R) -> Result<Self, ValidationError> {
        params.validate()?;
        Ok(Self::with_rng(params, rng))
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn params(&self) -> NoiseParams {
        self.params
    }

    pub fn damping(&self) -> f64 {
        self.params.damping
    }

    pub fn gain(&self) -> f64 {
        self.params.gain
    }

    pub fn step_size(&self) -> f64 {
        self.params.step_size
    }

    /// Advance the walk by one sample and return the output frame
    #[inline]
    pub fn next_frame(&mut self) -> StereoFrame {
        let white = self.rng.gen_range(-1.0..1.0) * self.params.step_size;
        self.accumulator = (self.accumulator * self.params.damping + white).clamp(-1.0, 1.0);
        StereoFrame::mono(self.accumulator * self.params.gain)
    }
}

impl<R: Rng> FrameSource for BrownNoiseStreamer<R> {
    fn fill_buffer(&mut self, buffer: &mut [StereoFrame]) -> StreamStatus {
        for frame in buffer.iter_mut() {
            *frame = self.next_frame();
        }
        StreamStatus {
            frames_written: buffer.len(),
            keep_going: true,
        }
    }

    fn last_error(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    fn seeded(params: NoiseParams, seed: u64) -> BrownNoiseStreamer<StdRng> {
        BrownNoiseStreamer::with_rng(params, StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_create_valid() {
        let streamer = BrownNoiseStreamer::create(0.9, 0.5, 0.02).unwrap();
        assert_eq!(streamer.accumulator(), 0.0);
        assert_eq!(streamer.damping(), 0.9);
        assert_eq!(streamer.gain(), 0.5);
        assert_eq!(streamer.step_size(), 0.02);
    }

    #[test]
    fn test_create_rejects_bad_damping() {
        for damping in [0.0, -0.5, 1.1, f64::NAN] {
            let err = BrownNoiseStreamer::create(damping, 0.5, 0.02).unwrap_err();
            assert!(matches!(err, ValidationError::InvalidDamping(_)), "{damping}");
        }
        assert_eq!(
            BrownNoiseStreamer::create(1.1, 0.5, 0.02).unwrap_err(),
            ValidationError::InvalidDamping(1.1)
        );
    }

    #[test]
    fn test_create_rejects_bad_gain() {
        for gain in [-0.1, 1.0001, f64::NAN] {
            let err = BrownNoiseStreamer::create(0.9, gain, 0.02).unwrap_err();
            assert!(matches!(err, ValidationError::InvalidGain(_)), "{gain}");
        }
    }

    #[test]
    fn test_create_rejects_bad_step_size() {
        for step in [0.0, -0.01, f64::NAN] {
            let err = BrownNoiseStreamer::create(0.9, 0.5, step).unwrap_err();
            assert!(matches!(err, ValidationError::InvalidStepSize(_)), "{step}");
        }
    }

    #[test]
    fn test_boundaries_accepted() {
        assert!(BrownNoiseStreamer::create(1.0, 0.5, 0.02).is_ok());
        assert!(BrownNoiseStreamer::create(f64::MIN_POSITIVE, 0.5, 0.02).is_ok());
        assert!(BrownNoiseStreamer::create(0.9, 0.0, 0.02).is_ok());
        assert!(BrownNoiseStreamer::create(0.9, 1.0, 0.02).is_ok());
        assert!(BrownNoiseStreamer::create(0.9, 0.5, f64::MIN_POSITIVE).is_ok());
        assert!(BrownNoiseStreamer::create(0.9, 0.5, 5.0).is_ok());
    }

    #[test]
    fn test_validation_order() {
        // Everything wrong: damping is reported first
        assert!(matches!(
            BrownNoiseStreamer::create(0.0, -1.0, -1.0),
            Err(ValidationError::InvalidDamping(_))
        ));
        assert!(matches!(
            BrownNoiseStreamer::create(0.5, -1.0, -1.0),
            Err(ValidationError::InvalidGain(_))
        ));
    }

    #[test]
    fn test_error_message_includes_value() {
        let msg = BrownNoiseStreamer::create(1.5, 0.5, 0.02).unwrap_err().to_string();
        assert!(msg.contains("1.5"), "{msg}");
        let msg = BrownNoiseStreamer::create(0.9, 2.5, 0.02).unwrap_err().to_string();
        assert!(msg.contains("2.5"), "{msg}");
        let msg = BrownNoiseStreamer::create(0.9, 0.5, -0.25).unwrap_err().to_string();
        assert!(msg.contains("-0.25"), "{msg}");
    }

    #[test]
    fn test_raw_construction_skips_validation() {
        let streamer = BrownNoiseStreamer::new(NoiseParams {
            damping: 0.0,
            gain: 2.0,
            step_size: -1.0,
        });
        assert_eq!(streamer.damping(), 0.0);
        assert_eq!(streamer.gain(), 2.0);
    }

    #[test]
    fn test_fill_reports_all_frames() {
        let mut streamer = BrownNoiseStreamer::new(NoiseParams::default());
        let mut buffer = vec![StereoFrame::silence(); 1024];
        let status = streamer.fill_buffer(&mut buffer);
        assert_eq!(status.frames_written, 1024);
        assert!(status.keep_going);
        assert!(streamer.last_error().is_none());
    }

    #[test]
    fn test_empty_buffer_is_noop() {
        let mut streamer = BrownNoiseStreamer::new(NoiseParams::default());
        let status = streamer.fill_buffer(&mut []);
        assert_eq!(
            status,
            StreamStatus {
                frames_written: 0,
                keep_going: true
            }
        );
        assert_eq!(streamer.accumulator(), 0.0);
    }

    #[test]
    fn test_not_all_zero() {
        let mut streamer = BrownNoiseStreamer::create(0.9, 0.5, 0.02).unwrap();
        let mut buffer = vec![StereoFrame::silence(); 1024];
        streamer.fill_buffer(&mut buffer);
        assert!(buffer.iter().any(|f| f.left != 0.0 || f.right != 0.0));
    }

    #[test]
    fn test_output_within_gain_and_mono() {
        let mut streamer = BrownNoiseStreamer::create(0.9, 0.5, 0.02).unwrap();
        let mut buffer = vec![StereoFrame::silence(); 4096];
        for _ in 0..20 {
            streamer.fill_buffer(&mut buffer);
            for frame in &buffer {
                assert!(frame.left.abs() <= 0.5);
                assert_eq!(frame.left, frame.right);
            }
        }
    }

    #[test]
    fn test_clamp_holds_with_large_steps() {
        // No decay and huge increments push the walk into the rails
        let params = NoiseParams {
            damping: 1.0,
            gain: 0.8,
            step_size: 10.0,
        };
        let mut streamer = seeded(params, 7);
        let mut buffer = vec![StereoFrame::silence(); 2048];
        streamer.fill_buffer(&mut buffer);
        assert!(streamer.accumulator().abs() <= 1.0);
        assert!(buffer.iter().all(|f| f.left.abs() <= 0.8));
        assert!(buffer.iter().any(|f| f.left.abs() == 0.8));
    }

    #[test]
    fn test_batching_equivalence() {
        let params = NoiseParams::default();
        let mut whole = seeded(params, 42);
        let mut split = seeded(params, 42);

        let mut expected = vec![StereoFrame::silence(); 1000];
        whole.fill_buffer(&mut expected);

        let mut actual = vec![StereoFrame::silence(); 1000];
        let mut offset = 0;
        for size in [0, 1, 127, 256, 0, 300, 316] {
            let status = split.fill_buffer(&mut actual[offset..offset + size]);
            assert_eq!(status.frames_written, size);
            offset += size;
        }
        assert_eq!(offset, 1000);
        assert_eq!(expected, actual);
        assert_eq!(whole.accumulator(), split.accumulator());
    }

    #[test]
    fn test_zero_gain_is_silent() {
        let mut streamer = BrownNoiseStreamer::create(0.9, 0.0, 0.02).unwrap();
        let mut buffer = vec![StereoFrame::mono(1.0); 256];
        streamer.fill_buffer(&mut buffer);
        assert!(buffer.iter().all(|f| f.left == 0.0 && f.right == 0.0));
    }
}
