use brownnoise::config::ServerConfig;
use brownnoise::server::Server;

#[tokio::main]
async fn main() {
    brownnoise::init_logging();

    let config = ServerConfig::from_env();
    log::debug!("Server config: {:?}", config);

    let server = match Server::bind(&config).await {
        Ok(server) => server,
        Err(e) => {
            log::error!("Server failed to start: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run(brownnoise::shutdown::wait_for_signal()).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
