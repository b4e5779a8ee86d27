//! Output device lookup and stream configuration

use cpal::traits::{DeviceTrait, HostTrait};
use serde::{Deserialize, Serialize};

use crate::config::PlayerConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub is_default: bool,
}

/// Get list of available output devices
pub fn list_output_devices() -> Result<Vec<AudioDeviceInfo>, String> {
    let host = cpal::default_host();
    let default_device = host.default_output_device();
    let default_name = default_device.as_ref().and_then(|d| d.name().ok());

    let devices = host
        .output_devices()
        .map_err(|e| format!("Failed to enumerate devices: {}", e))?;

    let mut result = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            result.push(AudioDeviceInfo {
                is_default: Some(&name) == default_name.as_ref(),
                name,
            });
        }
    }

    Ok(result)
}

/// Get the default output device
pub fn get_default_output_device() -> Result<cpal::Device, String> {
    let host = cpal::default_host();
    host.default_output_device()
        .ok_or_else(|| "No default output device found".to_string())
}

/// Get output device by name, or default if name is None
pub fn get_output_device(name: Option<&str>) -> Result<cpal::Device, String> {
    let host = cpal::default_host();

    match name {
        Some(device_name) => {
            let devices = host
                .output_devices()
                .map_err(|e| format!("Failed to enumerate devices: {}", e))?;

            for device in devices {
                if let Ok(n) = device.name() {
                    if n == device_name {
                        return Ok(device);
                    }
                }
            }

            let available = list_output_devices()
                .map(|list| {
                    list.into_iter()
                        .map(|d| d.name)
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            Err(format!(
                "Device '{}' not found (available: {})",
                device_name, available
            ))
        }
        None => get_default_output_device(),
    }
}

/// Pick a stream config for the device.
///
/// Uses the requested rate, stereo and a fixed buffer size when one of the
/// device's ranges allows it, otherwise the device default capped at two
/// channels. The returned sample format is the one the stream must be built with.
pub fn get_supported_config(
    device: &cpal::Device,
    preferred: &PlayerConfig,
) -> Result<(cpal::StreamConfig, cpal::SampleFormat), String> {
    let supported_configs = device
        .supported_output_configs()
        .map_err(|e| format!("Failed to get supported configs: {}", e))?;

    for config in supported_configs {
        let min_rate = config.min_sample_rate().0;
        let max_rate = config.max_sample_rate().0;

        if preferred.sample_rate >= min_rate
            && preferred.sample_rate <= max_rate
            && config.channels() == preferred.channels
            && is_playable_format(config.sample_format())
        {
            let buffer_size = match config.buffer_size() {
                cpal::SupportedBufferSize::Range { min, max }
                    if (*min..=*max).contains(&preferred.buffer_size) =>
                {
                    cpal::BufferSize::Fixed(preferred.buffer_size)
                }
                _ => cpal::BufferSize::Default,
            };

            return Ok((
                cpal::StreamConfig {
                    channels: preferred.channels,
                    sample_rate: cpal::SampleRate(preferred.sample_rate),
                    buffer_size,
                },
                config.sample_format(),
            ));
        }
    }

    // Fall back to default config
    let default_config = device
        .default_output_config()
        .map_err(|e| format!("Failed to get default config: {}", e))?;

    log::info!(
        "Requested {} Hz stereo not supported, using device default {} Hz",
        preferred.sample_rate,
        default_config.sample_rate().0
    );

    Ok((
        cpal::StreamConfig {
            channels: default_config.channels().min(2),
            sample_rate: default_config.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        },
        default_config.sample_format(),
    ))
}

/// Sample formats the player can write
pub fn is_playable_format(format: cpal::SampleFormat) -> bool {
    matches!(
        format,
        cpal::SampleFormat::F32 | cpal::SampleFormat::I16 | cpal::SampleFormat::U16
    )
}
