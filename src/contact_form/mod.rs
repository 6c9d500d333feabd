//! The visitor-facing side of the contact form: builds the request from the
//! form's fields, sends it to the relay, and tracks what the page should show.
mod client;
mod state;

pub use client::*;
pub use state::*;
