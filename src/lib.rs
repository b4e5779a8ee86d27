//! Brown noise generator
//!
//! The streamer in [`audio::signals`] is driven either by a native cpal output
//! stream (`brownnoise-play`) or, compiled to WebAssembly, by a page's audio
//! callback. The `brownnoise` binary serves that page.

pub mod audio;
pub mod config;
pub mod host;

#[cfg(not(target_arch = "wasm32"))]
pub mod server;
#[cfg(not(target_arch = "wasm32"))]
pub mod shutdown;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use audio::buffer::StereoFrame;
pub use audio::signals::{BrownNoiseStreamer, FrameSource, NoiseParams, StreamStatus, ValidationError};

/// Set up env_logger with `info` as the default level (override with `RUST_LOG`)
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
