pub mod configuration;
pub mod contact_form;
pub mod contract;
pub mod domain;
pub mod email_client;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod utils;
