pub mod config;
pub mod errors;
pub mod lifecycle;
pub mod logging;
pub mod messages;
pub mod routes;
pub mod services;
pub mod setup;
pub mod utils;
