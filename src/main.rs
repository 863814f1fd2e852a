use std::env;

use dotenvy::dotenv;

use order_desk::console;
use order_desk::models::config::OrderDeskConfig;

#[tokio::main]
async fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let config = match OrderDeskConfig::load("config", &app_env) {
        Ok(config) => config,
        Err(err) => {
            log::error!("Error loading settings: {err}");
            std::process::exit(1);
        }
    };

    log::info!(
        "Starting order desk with page size {}",
        config.page_size.get()
    );

    if let Err(err) = console::run(config).await {
        log::error!("Order desk stopped: {err}");
        std::process::exit(1);
    }
}
