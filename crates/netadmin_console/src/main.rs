mod config;
mod console;

use common::auth::SessionGuard;
use common::domain::InventoryApi;
use common::http::{HttpClientConfig, HttpInventoryClient};
use common::telemetry::{Telemetry, TelemetryConfig};
use crate::config::ServiceConfig;
use crate::console::{NetadminConsole, NetadminConsoleConfig};
use inventory_sync::{SessionService, SignInInput};
use netadmin_runner::Runner;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let telemetry = match Telemetry::init(&TelemetryConfig {
        service_name: config.otel_service_name.clone(),
        log_level: config.log_level.clone(),
        otlp_endpoint: config.otel_enabled.then(|| config.otel_endpoint.clone()),
    }) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            eprintln!("Failed to initialize telemetry: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        api_base_url = %config.api_base_url,
        otlp = telemetry.exports_otlp(),
        "starting netadmin console"
    );

    let guard = SessionGuard::new();
    let client = match HttpInventoryClient::new(
        &HttpClientConfig {
            base_url: config.api_base_url.clone(),
            timeout: config.request_timeout(),
        },
        guard.clone(),
    ) {
        Ok(client) => client,
        Err(e) => {
            error!("failed to build inventory client: {}", e);
            telemetry.shutdown();
            std::process::exit(1);
        }
    };
    let api: Arc<dyn InventoryApi> = Arc::new(client);

    let sessions = Arc::new(SessionService::new(Arc::clone(&api), guard));
    let session_scope = match sessions
        .sign_in(SignInInput {
            email: config.operator_email.clone(),
            password: config.operator_password.clone(),
        })
        .await
    {
        Ok(scope) => scope,
        Err(e) => {
            error!(error = %e, "{}", e.user_message());
            telemetry.shutdown();
            std::process::exit(1);
        }
    };

    let console = NetadminConsole::new(
        api,
        session_scope,
        NetadminConsoleConfig {
            history_poll_interval: config.history_poll_interval(),
            scan_history_limit: config.scan_history_limit,
            recent_activity_count: config.recent_activity_count,
        },
    );
    console.activate().await;

    let mut runner = Runner::new();
    for (name, process) in console.into_runner_processes() {
        runner = runner.with_named_process(name, process);
    }

    runner = runner
        .with_closer({
            let sessions = Arc::clone(&sessions);
            move || async move {
                info!("running cleanup tasks");
                sessions.sign_out().await;
                telemetry.shutdown();
                Ok(())
            }
        })
        .with_closer_timeout(config.closer_timeout());

    if let Err(e) = runner.run().await {
        eprintln!("netadmin console stopped: {:#}", e);
        std::process::exit(1);
    }
}
