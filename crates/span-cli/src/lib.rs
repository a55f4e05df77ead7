//! span-cli: binario `spanflow` y su lógica de comandos.
pub mod commands;
pub mod config;
pub mod errors;
pub mod logging;

pub use commands::{run, Cli, Command, Report};
pub use config::CliConfig;
pub use errors::CliError;
