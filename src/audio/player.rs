//! Native playback: a cpal output stream pulling frames from a source
//!
//! The source is moved into the device callback, so the audio thread owns it
//! for as long as the stream lives. Dropping the player stops playback.

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};

use super::buffer::{write_to_channels, StereoFrame};
use super::device::{get_output_device, get_supported_config};
use super::signals::FrameSource;
use crate::config::PlayerConfig;

pub struct NoisePlayer {
    // Kept alive for the playback session
    _stream: cpal::Stream,
    stream_config: cpal::StreamConfig,
    device_name: String,
}

impl NoisePlayer {
    /// Open the configured device and start streaming from `source`
    pub fn start<S>(source: S, config: &PlayerConfig) -> Result<Self, String>
    where
        S: FrameSource + Send + 'static,
    {
        let device = get_output_device(config.device.as_deref())?;
        let device_name = device.name().unwrap_or_else(|_| "<unknown>".to_string());
        let (stream_config, sample_format) = get_supported_config(&device, config)?;

        log::info!(
            "Opening '{}' at {} Hz, {} channel(s), {:?}",
            device_name,
            stream_config.sample_rate.0,
            stream_config.channels,
            sample_format
        );

        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32, S>(&device, &stream_config, source, config),
            cpal::SampleFormat::I16 => build_stream::<i16, S>(&device, &stream_config, source, config),
            cpal::SampleFormat::U16 => build_stream::<u16, S>(&device, &stream_config, source, config),
            other => Err(format!("Unsupported sample format '{}'", other)),
        }?;

        stream
            .play()
            .map_err(|e| format!("Failed to start playback: {}", e))?;

        Ok(Self {
            _stream: stream,
            stream_config,
            device_name,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.stream_config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.stream_config.channels
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

fn build_stream<T, S>(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    mut source: S,
    config: &PlayerConfig,
) -> Result<cpal::Stream, String>
where
    T: SizedSample + FromSample<f32>,
    S: FrameSource + Send + 'static,
{
    let channels = stream_config.channels as usize;
    let capacity = config.buffer_size as usize;
    let mut frames = vec![StereoFrame::silence(); capacity];
    let mut scratch = vec![0.0f32; capacity * channels];

    device
        .build_output_stream(
            stream_config,
            move |output: &mut [T], _: &cpal::OutputCallbackInfo| {
                render(&mut source, &mut frames, &mut scratch, output, channels);
            },
            |err| log::error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| format!("Failed to build output stream: {}", e))
}

/// Fill one device buffer from `source`.
///
/// `frames` and `scratch` are reused between callbacks and only grow when the
/// backend asks for more than it did before.
pub(crate) fn render<T, S>(
    source: &mut S,
    frames: &mut Vec<StereoFrame>,
    scratch: &mut Vec<f32>,
    output: &mut [T],
    channels: usize,
) where
    T: Sample + FromSample<f32>,
    S: FrameSource + ?Sized,
{
    if channels == 0 {
        return;
    }

    let frame_count = output.len() / channels;
    if frames.len() < frame_count {
        frames.resize(frame_count, StereoFrame::silence());
    }
    if scratch.len() < output.len() {
        scratch.resize(output.len(), 0.0);
    }

    source.fill_buffer(&mut frames[..frame_count]);
    write_to_channels(&frames[..frame_count], &mut scratch[..output.len()], channels);

    for (out, sample) in output.iter_mut().zip(scratch.iter()) {
        *out = T::from_sample(*sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::signals::{BrownNoiseStreamer, NoiseParams};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn streamer() -> BrownNoiseStreamer<StdRng> {
        BrownNoiseStreamer::with_rng(NoiseParams::default(), StdRng::seed_from_u64(3))
    }

    #[test]
    fn test_render_stereo_f32() {
        let mut source = streamer();
        let mut frames = Vec::new();
        let mut scratch = Vec::new();
        let mut output = vec![0.0f32; 882];

        render(&mut source, &mut frames, &mut scratch, &mut output, 2);

        assert_eq!(frames.len(), 441);
        assert!(output.iter().any(|s| *s != 0.0));
        for pair in output.chunks_exact(2) {
            assert_eq!(pair[0], pair[1]);
            assert!(pair[0].abs() <= 0.5);
        }
    }

    #[test]
    fn test_render_matches_direct_fill() {
        let mut direct = streamer();
        let mut expected = vec![StereoFrame::silence(); 256];
        direct.fill_buffer(&mut expected);

        let mut source = streamer();
        let mut frames = vec![StereoFrame::silence(); 1024];
        let mut scratch = Vec::new();
        let mut output = vec![0.0f32; 512];
        render(&mut source, &mut frames, &mut scratch, &mut output, 2);

        for (frame, pair) in expected.iter().zip(output.chunks_exact(2)) {
            assert_eq!(frame.left as f32, pair[0]);
        }
    }

    #[test]
    fn test_render_i16() {
        let mut source = streamer();
        let mut frames = Vec::new();
        let mut scratch = Vec::new();
        let mut output = vec![0i16; 512];

        render(&mut source, &mut frames, &mut scratch, &mut output, 2);

        // gain 0.5 keeps samples within half of full scale
        assert!(output.iter().all(|s| s.unsigned_abs() <= (i16::MAX as u16) / 2 + 1));
        assert!(output.iter().any(|s| *s != 0));
    }

    #[test]
    fn test_render_mono_device() {
        let mut source = streamer();
        let mut frames = Vec::new();
        let mut scratch = Vec::new();
        let mut output = vec![0.0f32; 300];

        render(&mut source, &mut frames, &mut scratch, &mut output, 1);

        assert_eq!(frames.len(), 300);
        assert!(output.iter().any(|s| *s != 0.0));
    }
}
