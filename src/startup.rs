use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::http::header;
use actix_web::http::Method;
use actix_web::http::StatusCode;
use actix_web::middleware::DefaultHeaders;
use actix_web::middleware::ErrorHandlers;
use actix_web::web;
use actix_web::App;
use actix_web::HttpServer;
use tracing_actix_web::TracingLogger;

use crate::configuration::Settings;
use crate::domain::SiteOwner;
use crate::email_client::verify_transport;
use crate::email_client::MailTransport;
use crate::email_client::SmtpEmailClient;
use crate::routes::contact_preflight;
use crate::routes::health_check;
use crate::routes::submit_contact;
use crate::utils::internal_error_body;
use crate::utils::json_error_handler;
use crate::utils::not_found;

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    /// Left private; use `get_port` to access
    port: u16,
    server: Server,
}

impl Application {
    /// Build the SMTP transport from `cfg.email` and the server around it.
    pub async fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        let email_client = SmtpEmailClient::new(&cfg.email)?;
        if cfg.email.verify_on_startup {
            // never blocks startup; the outcome only shows up in the logs
            tokio::spawn(verify_transport(email_client.clone()));
        }
        Self::build_with_transport(cfg, Arc::new(email_client))
    }

    /// Same as `build`, with any `MailTransport` (e.g. a fake in tests).
    pub fn build_with_transport(
        cfg: Settings,
        transport: Arc<dyn MailTransport>,
    ) -> Result<Self, anyhow::Error> {
        let owner = cfg.email.site_owner()?;

        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(addr)?;
        // port 0 means the OS picked one
        let port = listener.local_addr()?.port();

        tracing::info!(
            mailbox = %owner.address.as_ref(),
            port,
            "contact relay listening"
        );

        let server = run(
            listener,
            transport,
            owner,
            cfg.application.allowed_origin,
        )?;
        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 { self.port }

    /// Because this consumes `self`, this should be the final function call (or
    /// passed to `tokio::spawn`)
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

/// The server is not responsible for binding to an address, it only listens to
/// an already bound address.
///
/// Declares all API endpoints.
pub fn run(
    listener: TcpListener,
    transport: Arc<dyn MailTransport>,
    owner: SiteOwner,
    allowed_origin: String,
) -> Result<Server, anyhow::Error> {
    // `Data` is an `Arc` internally; every worker shares the same transport
    // (and thus the same SMTP connection pool)
    let transport: web::Data<dyn MailTransport> = web::Data::from(transport);
    let owner = web::Data::new(owner);

    // actix spins up one worker per core, each running this closure, so
    // everything captured must be cloneable
    let server = HttpServer::new(move || {
        App::new()
            .wrap(ErrorHandlers::new().handler(StatusCode::INTERNAL_SERVER_ERROR, internal_error_body))
            .wrap(
                DefaultHeaders::new()
                    .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, allowed_origin.clone())),
            )
            .wrap(TracingLogger::default())
            .route("/api/health", web::get().to(health_check))
            .route("/api/contact", web::post().to(submit_contact))
            .route("/api/contact", web::method(Method::OPTIONS).to(contact_preflight))
            .default_service(web::to(not_found))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(transport.clone())
            .app_data(owner.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
