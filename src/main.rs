mod cli;
mod navigation;
mod playback;
mod provider;
mod state;

use clap::Parser;
use cli::{commands, Cli, Commands};
use state::flags::{REPEAT_KEY, SHUFFLE_KEY};
use state::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (ignores if missing)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_filter = if cli.verbose { "playnav=debug" } else { "playnav=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load_or_default(&cli.data_dir)?;
    let library_path = cli.library.clone().unwrap_or_else(|| config.library_path());

    match cli.command {
        Commands::Init => {
            commands::init::run(&config, &library_path)?;
        }
        Commands::Play { id } => {
            commands::play::run(id, &config, &library_path).await?;
        }
        Commands::Open { kind, id } => {
            commands::play::open(&kind, id, &config, &library_path).await?;
        }
        Commands::Next { ids, current } => {
            commands::nav::run_step(commands::nav::Direction::Next, &ids, &current, &config)?;
        }
        Commands::Prev { ids, current } => {
            commands::nav::run_step(commands::nav::Direction::Prev, &ids, &current, &config)?;
        }
        Commands::Shuffle => {
            commands::nav::toggle(SHUFFLE_KEY, &config)?;
        }
        Commands::Repeat => {
            commands::nav::toggle(REPEAT_KEY, &config)?;
        }
        Commands::Status => {
            commands::nav::status(&config)?;
        }
        Commands::Find { term } => {
            commands::library::find(&term, &library_path)?;
        }
        Commands::Suggest { query, server_url } => {
            commands::library::suggest(&query, server_url.as_deref(), &config).await?;
        }
    }

    Ok(())
}
