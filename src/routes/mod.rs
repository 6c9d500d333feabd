mod contact;
mod health_check;
mod preflight;

pub use contact::*;
pub use health_check::*;
pub use preflight::*;
