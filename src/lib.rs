pub mod artifact;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod inference;
pub mod relay;
pub mod server;
