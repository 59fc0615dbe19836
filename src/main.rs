use std::sync::Arc;

use metricsd::config::{load_config, print_schema};
use metricsd::startup::run;
use metricsd::utils::logger::init_logging;

#[tokio::main]
async fn main() {
    if std::env::args().any(|arg| arg == "--schema") {
        print_schema();
        return;
    }

    let config = load_config();

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(Arc::new(config)).await {
        tracing::error!("Server exited with error: {}", e);
        std::process::exit(1);
    }
}
