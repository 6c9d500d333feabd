use std::process::ExitCode;

use portfolio_mailer::configuration::get_configuration;
use portfolio_mailer::startup::Application;
use portfolio_mailer::telemetry::get_subscriber;
use portfolio_mailer::telemetry::init_subscriber;

/// Initialise telemetry, load config, and start the server.
///
/// Missing mail credentials are fatal: the process exits before binding.
#[tokio::main]
async fn main() -> ExitCode {
    let subscriber = get_subscriber("portfolio-mailer", "info", std::io::stdout);
    init_subscriber(subscriber);

    let cfg = match get_configuration() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "refusing to start; set EMAIL_USER and EMAIL_PASSWORD"
            );
            return ExitCode::FAILURE;
        }
    };

    let app = match Application::build(cfg).await {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error.cause_chain = ?e, error.message = %e, "failed to build server");
            return ExitCode::FAILURE;
        }
    };

    match app.run_until_stopped().await {
        Ok(()) => {
            tracing::info!("server exited gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error.cause_chain = ?e, error.message = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}
