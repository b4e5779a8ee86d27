//! Play brown noise on the local output device until interrupted

use brownnoise::audio::player::NoisePlayer;
use brownnoise::config::{self, PlayerConfig};
use brownnoise::BrownNoiseStreamer;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    brownnoise::init_logging();

    let params = config::noise_params();
    let streamer = match BrownNoiseStreamer::create(params.damping, params.gain, params.step_size) {
        Ok(streamer) => streamer,
        Err(e) => {
            log::error!("Invalid noise parameters: {}", e);
            std::process::exit(1);
        }
    };

    let player_config = PlayerConfig::from_env();
    let player = match NoisePlayer::start(streamer, &player_config) {
        Ok(player) => player,
        Err(e) => {
            log::error!("Playback failed: {}", e);
            std::process::exit(1);
        }
    };

    log::info!(
        "Playing brown noise on '{}' ({} Hz, damping {}, gain {}, step {}). Ctrl-C to stop.",
        player.device_name(),
        player.sample_rate(),
        params.damping,
        params.gain,
        params.step_size
    );

    brownnoise::shutdown::wait_for_signal().await;

    drop(player);
    log::info!("Playback stopped");
}
