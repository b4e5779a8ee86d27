//! Audio side of brownnoise
//!
//! - Brown noise generation (`signals`)
//! - Stereo frames and output conversions (`buffer`)
//! - Native playback through cpal (`device`, `player`)

pub mod buffer;
pub mod signals;

#[cfg(not(target_arch = "wasm32"))]
pub mod device;
#[cfg(not(target_arch = "wasm32"))]
pub mod player;
