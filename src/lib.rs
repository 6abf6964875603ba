pub mod attachment; // File upload boundary
pub mod clock;
pub mod commands;
pub mod config;
pub mod console; // Terminal presentation host
pub mod export; // Summary PDF export
pub mod labels;
pub mod summary; // Summary document renderer
pub mod wizard; // Wizard state controller

use std::io;

use tracing_subscriber::EnvFilter;

pub fn run() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env();
    let mut controller = wizard::WizardController::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if let Err(e) = console::run_console(stdin.lock(), &mut stdout, &mut controller, &config) {
        tracing::error!(error = %e, "Console session aborted");
        std::process::exit(1);
    }
}
