use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wake_gate::config::GateConfig;
use wake_gate::routes::RouteTable;
use wake_gate::runtime::{CliRuntime, Runtime};
use wake_gate::state::GateState;
use wake_gate::{listener, reaper};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wake_gate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting wake-gate v{}", env!("CARGO_PKG_VERSION"));

    let config = GateConfig::load();
    if let Err(err) = config.validate() {
        error!(error = %err, "invalid configuration");
        return ExitCode::FAILURE;
    }

    // spec.md §4.10 / §6.5: a missing container runtime binary at
    // startup is fatal, before the gate starts listening.
    if which::which(&config.runtime_bin).is_err() {
        eprintln!(
            "wake-gate: container runtime binary '{}' not found on PATH",
            config.runtime_bin
        );
        return ExitCode::FAILURE;
    }

    let (routes, source_tag) = RouteTable::load();
    info!(source = source_tag.as_str(), "loaded route table");

    let runtime: Arc<dyn Runtime> = Arc::new(CliRuntime::new(config.runtime_bin.clone()));
    let state = Arc::new(GateState::new(config, routes, runtime));

    tokio::spawn(reaper::run(state.clone()));

    if let Err(err) = listener::run(state).await {
        error!(error = %err, "listener exited with error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
