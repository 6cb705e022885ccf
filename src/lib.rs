pub mod config;
pub mod logging;
pub mod models;
pub mod processor;
pub mod server;
pub mod sheets;
