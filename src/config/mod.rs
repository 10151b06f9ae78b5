pub mod cli;
pub mod profile;
pub mod run_config;

pub use cli::CliArgs;
pub use run_config::RunConfig;
