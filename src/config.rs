//! Environment configuration for the noise parameters, the native player and
//! the HTTP server
//!
//! Every loader has a `from_lookup` variant taking a key -> value function so
//! tests don't have to touch the process environment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::audio::signals::NoiseParams;

pub const ENV_DAMPING: &str = "BROWN_NOISE_DAMPING";
pub const ENV_GAIN: &str = "BROWN_NOISE_GAIN";
pub const ENV_STEP_SIZE: &str = "BROWN_NOISE_STEP_SIZE";
pub const ENV_DEVICE: &str = "BROWN_NOISE_DEVICE";
pub const ENV_SAMPLE_RATE: &str = "BROWN_NOISE_SAMPLE_RATE";

/// CD-quality default
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse `key` if it is set and non-empty; keep `default` otherwise.
/// A value that doesn't parse is logged and ignored.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("Ignoring unparsable {}={:?}, using default", key, raw);
                default
            }
        },
        _ => default,
    }
}

fn string_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Noise parameters from `BROWN_NOISE_*`. Not validated here.
pub fn noise_params() -> NoiseParams {
    noise_params_from_lookup(env_lookup)
}

pub fn noise_params_from_lookup<F>(lookup: F) -> NoiseParams
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = NoiseParams::default();
    NoiseParams {
        damping: parse_or(&lookup, ENV_DAMPING, defaults.damping),
        gain: parse_or(&lookup, ENV_GAIN, defaults.gain),
        step_size: parse_or(&lookup, ENV_STEP_SIZE, defaults.step_size),
    }
}

/// Native playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Output device name, `None` for the system default
    pub device: Option<String>,
    pub sample_rate: u32,
    pub channels: u16,
    /// Frames per device buffer
    pub buffer_size: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: 2,
            buffer_size: DEFAULT_SAMPLE_RATE / 10,
        }
    }
}

impl PlayerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut sample_rate = parse_or(&lookup, ENV_SAMPLE_RATE, DEFAULT_SAMPLE_RATE);
        if sample_rate == 0 {
            log::warn!("{} must be positive, using {}", ENV_SAMPLE_RATE, DEFAULT_SAMPLE_RATE);
            sample_rate = DEFAULT_SAMPLE_RATE;
        }
        Self {
            device: lookup(ENV_DEVICE).filter(|v| !v.is_empty()),
            sample_rate,
            channels: 2,
            // A tenth of a second
            buffer_size: (sample_rate / 10).max(1),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Holds `index.html`
    pub static_dir: PathBuf,
    /// wasm-bindgen output: `brownnoise_bg.wasm` and `brownnoise.js`
    pub pkg_dir: PathBuf,
    /// Served as `/config.json` for the page to initialize its streamer
    pub noise: NoiseParams,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            static_dir: PathBuf::from("static"),
            pkg_dir: PathBuf::from("pkg"),
            noise: NoiseParams::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // Accept ":8080" as well as "8080"
        let port = match lookup("PORT").filter(|v| !v.is_empty()) {
            Some(raw) => match raw.trim_start_matches(':').parse() {
                Ok(port) => port,
                Err(_) => {
                    log::warn!("Ignoring unparsable PORT={:?}, using {}", raw, defaults.port);
                    defaults.port
                }
            },
            None => defaults.port,
        };

        Self {
            host: string_or(&lookup, "HOST", &defaults.host),
            port,
            static_dir: PathBuf::from(string_or(&lookup, "STATIC_DIR", "static")),
            pkg_dir: PathBuf::from(string_or(&lookup, "PKG_DIR", "pkg")),
            noise: noise_params_from_lookup(&lookup),
        }
    }

    /// `host:port` suitable for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
