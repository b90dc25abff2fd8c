use tracing::{error, info};

use galleryd::{Config, GalleryService, WebServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    // Initialize logging
    if let Err(e) = galleryd::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        galleryd::logging::init_console_only(&config.logging.level);
    }

    info!("galleryd - image gallery host");

    let service = match GalleryService::open(&config.storage) {
        Ok(service) => service,
        Err(e) => {
            error!("Failed to open gallery storage at {}: {}", config.storage.root, e);
            std::process::exit(1);
        }
    };
    info!(
        root = %config.storage.root,
        index = %config.storage.index_path,
        "Gallery storage opened"
    );

    if config.storage.reconcile_on_startup {
        if let Err(e) = service.reconcile().await {
            error!("Startup reconciliation failed: {}", e);
            std::process::exit(1);
        }
    }

    let server = match WebServer::new(&config.web, service) {
        Ok(server) => server,
        Err(e) => {
            error!("Invalid web server address: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
