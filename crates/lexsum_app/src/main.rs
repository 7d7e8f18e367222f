mod cli;
mod commands;
mod config;
mod render;

use clap::Parser;
use lexsum_logging::{lexsum_info, LevelFilter, LogDestination};

use crate::cli::{Cli, Command};
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?
        .with_overrides(cli.api_url.clone(), cli.data_dir.clone())?;

    let level = match (cli.verbose, config.log_to_file) {
        (true, _) => LevelFilter::Debug,
        (false, true) => LevelFilter::Info,
        (false, false) => LevelFilter::Warn,
    };
    let destination = match (config.log_to_file, cli.verbose) {
        (true, true) => LogDestination::Both,
        (true, false) => LogDestination::File,
        (false, _) => LogDestination::Terminal,
    };
    lexsum_logging::initialize(destination, level, &config.log_file());
    lexsum_info!("lexsum starting against {}", config.api_base_url);

    match cli.command {
        Command::Summarize { file, output } => {
            commands::summarize(&config, &file, output.as_deref()).await
        }
        Command::Recent { documents } => commands::recent(&config, documents),
        Command::Tab { request_id, tab } => commands::tab(&config, &request_id, tab).await,
        Command::Chat {
            request_id,
            message,
        } => commands::chat(&config, &request_id, &message).await,
    }
}
