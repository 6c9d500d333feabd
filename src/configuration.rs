use std::env;
use std::env::current_dir;
use std::fmt::Display;
use std::time::Duration;

use config::Config;
use config::ConfigError;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::OwnerAddress;
use crate::domain::SiteOwner;

/// Global configuration, loaded from `configuration/*.yaml` and the
/// environment. See `get_configuration`.
#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub email: EmailSettings,
    pub contact_form: ContactFormSettings,
}

/// Server configuration
#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    /// Should be localhost on dev machine, 0.0.0.0 on prod
    pub host: String,

    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,

    /// Sent as `Access-Control-Allow-Origin`; the portfolio frontend is served
    /// from a different origin than the relay
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

fn default_allowed_origin() -> String { "*".to_string() }

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Implicit TLS (usually port 465)
    Tls,
    /// Plaintext connection upgraded with STARTTLS (usually port 587)
    Starttls,
    /// No encryption and no authentication. Only for local mail catchers.
    Plain,
}

/// Outbound mailbox. The mailbox is both the sender of every message and the
/// recipient of contact notifications.
#[derive(Deserialize, Clone, Debug)]
pub struct EmailSettings {
    pub smtp_host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub smtp_port: u16,
    pub security: SmtpSecurity,

    /// `EMAIL_USER`
    #[serde(default)]
    pub username: Option<String>,
    /// `EMAIL_PASSWORD`
    #[serde(default)]
    pub password: Option<Secret<String>>,

    /// Used as the sender's display name and to sign confirmation messages
    pub owner_name: String,

    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,

    /// Test the SMTP connection once after startup and log the outcome
    #[serde(default)]
    pub verify_on_startup: bool,
}

impl EmailSettings {
    /// Credentials are trimmed, since they tend to be pasted into `.env` files
    /// with trailing whitespace.
    pub fn credentials(&self) -> Result<(String, Secret<String>), ConfigurationError> {
        let username = self
            .username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(ConfigurationError::MissingUsername)?;
        let password = self
            .password
            .as_ref()
            .map(|p| p.expose_secret().trim())
            .filter(|p| !p.is_empty())
            .ok_or(ConfigurationError::MissingPassword)?;
        Ok((username.to_string(), Secret::new(password.to_string())))
    }

    pub fn site_owner(&self) -> Result<SiteOwner, ConfigurationError> {
        let (username, _) = self.credentials()?;
        let address = OwnerAddress::parse(username).map_err(ConfigurationError::InvalidMailbox)?;
        Ok(SiteOwner {
            address,
            name: self.owner_name.clone(),
        })
    }

    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_milliseconds) }
}

/// Settings for the contact form client
#[derive(Deserialize, Clone, Debug)]
pub struct ContactFormSettings {
    /// Where the relay is reachable, without the `/api/contact` path
    pub base_url: String,

    /// How long a success or failure notice stays on screen
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub display_milliseconds: u64,
}

impl ContactFormSettings {
    pub fn display_duration(&self) -> Duration { Duration::from_millis(self.display_milliseconds) }
}

/// Any of these aborts startup; the server never binds its listener.
#[derive(thiserror::Error, Debug)]
pub enum ConfigurationError {
    #[error("could not determine working directory")]
    WorkingDirectory(#[source] std::io::Error),
    #[error("invalid APP_ENVIRONMENT: {0}")]
    Environment(String),
    #[error("could not load configuration")]
    Load(#[from] ConfigError),
    #[error("missing EMAIL_USER (email.username)")]
    MissingUsername,
    #[error("missing EMAIL_PASSWORD (email.password)")]
    MissingPassword,
    #[error("EMAIL_USER is not a valid mailbox: {0}")]
    InvalidMailbox(String),
}

impl Settings {
    /// Checks that the outbound mailbox is usable. Called once by
    /// `get_configuration`.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.email.site_owner()?;
        Ok(())
    }
}

pub enum Environment {
    Local,
    Production,
}

impl Display for Environment {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Environment::Local => "local",
                Environment::Production => "production",
            }
        )
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            e => Err(format!("Invalid: {e}")),
        }
    }
}

fn parse_settings(cfg: Config) -> Result<Settings, ConfigurationError> {
    let settings = cfg.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}

/// Load yaml configuration files at `<project_root>/configuration`, then
/// overlay the environment:
///
/// - `APP_APPLICATION__PORT=5001` -> `Settings.application.port`
/// - `EMAIL_USER`, `EMAIL_PASSWORD` -> `Settings.email.{username,password}`
/// - `PORT` -> `Settings.application.port`
///
/// Missing mail credentials are an error here, so the caller can refuse to
/// start.
pub fn get_configuration() -> Result<Settings, ConfigurationError> {
    let cfg_dir = current_dir()
        .map_err(ConfigurationError::WorkingDirectory)?
        .join("configuration");

    let env: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".to_string())
        .try_into()
        .map_err(ConfigurationError::Environment)?;

    let cfg = Config::builder()
        .add_source(config::File::from(cfg_dir.join("base.yaml")))
        .add_source(config::File::from(cfg_dir.join(format!("{env}.yaml"))))
        .add_source(
            // env vars are -always- strings; numeric fields go through serde-aux
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("email.username", env::var("EMAIL_USER").ok())?
        .set_override_option("email.password", env::var("EMAIL_PASSWORD").ok())?
        .set_override_option("application.port", env::var("PORT").ok())?
        .build()?;

    parse_settings(cfg)
}
