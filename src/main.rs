// tenday-export v0.1
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tenday_export::AppConfig;

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tenday_export=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_json);

    if !config.startup_delay.is_zero() {
        tracing::info!(
            "Waiting {}ms before starting",
            config.startup_delay.as_millis()
        );
        std::thread::sleep(config.startup_delay);
    }

    tracing::info!("Starting process");
    match tenday_export::run(&config) {
        Ok(_) => {
            tracing::info!(
                "Success creating Excel files at {}",
                config.output_dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
