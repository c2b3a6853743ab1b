pub mod charts;
pub mod client;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod forms;
pub mod join;
pub mod models;
pub mod tables;
pub mod terminal;
pub mod ui;

pub use client::{Resource, ResourceClient};
pub use config::Config;
pub use dashboard::Dashboard;
pub use errors::ClientError;
pub use join::JoinIndex;
