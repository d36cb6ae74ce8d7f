//! avd-provision - Android emulator provisioning build step
//!
//! Reads the step inputs from the environment, provisions the AVD and exits
//! with code 1 on any failure.

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use avd_provision::core::{StepConfig, StepError, SystemRunner, VERSION};
use avd_provision::toolchain::EnvmanExporter;
use avd_provision::{ProvisionCommand, APP_NAME};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();
    info!("{} v{} starting...", APP_NAME, VERSION);

    if let Err(err) = run().await {
        match err.downcast_ref::<StepError>() {
            Some(step_error) => error!("{}", step_error.user_message()),
            None => error!("{:#}", err),
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = StepConfig::from_env()?;
    config.log_summary();

    let runner = SystemRunner::new().with_timeout(config.command_timeout);
    let exporter = EnvmanExporter::new(&runner);

    let outcome = ProvisionCommand::new(config).execute(&runner, &exporter).await?;
    info!(
        "Done: AVD {} ready ({} component(s) installed)",
        outcome.avd_name,
        outcome.installed.len()
    );

    Ok(())
}

/// Initialize logging; `RUST_LOG` overrides the default `info` level
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}
