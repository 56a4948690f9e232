use chirpy::configuration::get_configuration;
use chirpy::startup::run;
use chirpy::store::Store;
use chirpy::telemetry::init_telemetry;
use std::net::TcpListener;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let store = Store::open(&configuration.store.path, configuration.store.reset_on_startup)
        .map_err(|e| {
            tracing::error!("Failed to open store at {}: {}", configuration.store.path, e);
            std::io::Error::new(std::io::ErrorKind::Other, "Store error")
        })?;

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, store, configuration)?;
    server.await
}
