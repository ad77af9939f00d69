//! Web API module: router construction and request handlers.

pub mod error;
mod lectures;
mod optimize;
pub mod routes;
mod status;

pub use optimize::OptimizeRequest;
pub use routes::*;
