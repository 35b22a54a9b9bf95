use ferrochat::shell::Shell;
use ferrochat::{commands, ChatClient, Config, RedisStore, SystemClock};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize logging (filterable via RUST_LOG; user-facing chat
    // output goes to stdout, not the logger)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::from_env();
    info!("Ferrochat starting, store at {}", config.store_addr);

    let store = match RedisStore::connect(&config.store_addr).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to connect to store at {}: {}", config.store_addr, e);
            std::process::exit(1);
        }
    };

    let mut client = ChatClient::new(store, SystemClock, &config);

    // Seed the canned fun facts once; !fact pops from this set.
    if let Err(e) = commands::seed_facts(client.store_mut()).await {
        error!("Failed to seed fun facts: {}", e);
        std::process::exit(1);
    }

    let mut shell = Shell::new(client);
    if let Err(e) = shell.run().await {
        error!("Shell error: {}", e);
        std::process::exit(1);
    }

    info!("Ferrochat exiting");
}
