pub mod cli;
pub mod config;
pub mod eth;
pub mod models;
pub mod pending;
pub mod poll_stats;
pub mod poller;
