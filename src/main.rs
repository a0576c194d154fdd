use anyhow::{Error, Result};
use notification_worker::{
    api::run_api_server,
    clients::health::WorkerStatus,
    config::Config,
    worker::{self, Dispatcher},
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::load()?;

    init_tracing(&config);

    if config.email_apikey.is_empty() {
        warn!("EMAIL_APIKEY not set");
    }

    let status = WorkerStatus::new();

    let server_status = status.clone();
    let server_port = config.server_port;
    tokio::spawn(async move {
        if let Err(e) = run_api_server(server_port, server_status).await {
            error!(error = %e, "Health check server stopped");
        }
    });

    let dispatcher = Dispatcher::from_config(&config);

    info!(queue = %config.queue_name, "Notification worker starting");

    if let Err(e) = worker::run(&config, &dispatcher, &status).await {
        error!(error = %e, "Notification worker terminated");
        return Err(e.into());
    }

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if config.json_logs() {
        builder.json().init();
    } else {
        builder.init();
    }
}
