use clap::Parser;
use semantic_support_cache::cli::{self, Cli, Command};
use semantic_support_cache::config::AppConfig;
use semantic_support_cache::infrastructure::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    let cli = Cli::parse();

    match cli.command {
        Command::CreateIndex => cli::admin::create_index(&config).await,
        Command::DropIndex(args) => cli::admin::drop_index(&config, args).await,
        Command::ResetCache => cli::admin::reset_cache(&config).await,
        Command::Health => cli::admin::health(&config).await,
        Command::Query(args) => cli::query::run(&config, args).await,
    }
}
