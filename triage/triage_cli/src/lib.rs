//! Library side of the `triage` binary: configuration, logging setup and
//! the pipeline commands, kept out of `main.rs` so they can be tested
//! without spawning a process.

pub mod commands;
pub mod config;

pub use commands::{CliError, PredictReport, TrainReport};
pub use config::{config_template, ArtifactPaths, ConfigError, PipelineConfig};

/// Maps `-v` occurrences to a default log filter; `RUST_LOG` still wins.
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

pub fn init_logging(verbose: u8) {
    let env = env_logger::Env::default().default_filter_or(log_filter(verbose));
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
