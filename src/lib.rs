pub mod analysis;
pub mod cli;
pub mod config;
pub mod indicators;
pub mod market;
pub mod monitor;
pub mod notify;
