pub mod cli;
pub mod client;
pub mod config;

pub use cli::{run, Cli};
