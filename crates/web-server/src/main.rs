use dataset::{LoadOptions, load_orders};
use tracing_subscriber::EnvFilter;

// This main function is the entry point when running `cargo run -p web-server`.
// It loads the configured dataset once and serves it until the process is stopped.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = configuration::load_config(None)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    let options = LoadOptions {
        delimiter: config.dataset.delimiter_byte()?,
    };
    let table = load_orders(&config.dataset.path, &options)?;
    let state = web_server::AppState::new(table, config.display.limits());

    web_server::run_server(config.server.socket_addr()?, state).await
}
