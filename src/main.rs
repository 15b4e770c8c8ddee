use std::sync::Arc;

use hookbus::broker::Broker;
use hookbus::config::load_config;
use hookbus::notify::NotificationManager;
use hookbus::server::start_server;
use hookbus::utils::logging;

#[tokio::main]
async fn main() {
    logging::init("info");

    let config = load_config().expect("Failed to load configuration");
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let broker = Arc::new(Broker::new());
    let manager = Arc::new(
        NotificationManager::new(&broker, &config.notify)
            .expect("Failed to build notification manager"),
    );
    manager.start();

    if let Err(e) = start_server(&addr, manager).await {
        tracing::error!(error = %e, "registration server terminated");
    }
}
