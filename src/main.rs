//! Binary entrypoint for the Recipe Ranger CLI.
//!
//! Commands:
//! - `start [--user <id>] [--channel <id>]` - serve the console front-end
//! - `init` - create a starter `config.toml` and the catalog directory
//! - `status` - print catalog counts as JSON
//!
//! See the library crate docs for module-level details: `reciperanger::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use reciperanger::bot::RecipeBot;
use reciperanger::config::Config;

#[derive(Parser)]
#[command(name = "reciperanger")]
#[command(about = "A shared crafting catalog and cost calculator bot")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot on the console
    Start {
        /// Identity for lines without a `user@channel>` prefix
        #[arg(short, long)]
        user: Option<String>,

        /// Channel for lines without a `user@channel>` prefix
        #[arg(long)]
        channel: Option<String>,
    },
    /// Initialize a new configuration and catalog
    Init,
    /// Show catalog counts
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start { user, channel } => {
            let mut config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            info!("Starting Recipe Ranger v{}", env!("CARGO_PKG_VERSION"));
            if let Some(user) = user {
                config.console.user = user;
            }
            if let Some(channel) = channel {
                config.console.channel = channel;
            }
            let mut bot = RecipeBot::open(config)?;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            bot.run_console(stdin, tokio::io::stdout()).await?;
        }
        Commands::Init => {
            init_logging(&None, cli.verbose);
            info!("Initializing new Recipe Ranger configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);

            let cfg = Config::default();
            let mut bot = RecipeBot::open(cfg)?;
            info!(
                "Catalog ready at {}",
                bot.config().storage.catalog_path().display()
            );
            bot.shutdown()?;
        }
        Commands::Status => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            let path = config.storage.catalog_path();
            let bot = RecipeBot::open(config)?;
            let payload = serde_json::json!({
                "name": bot.config().bot.name,
                "catalog": path.display().to_string(),
                "items": bot.store().count_items(),
                "ingredient_costs": bot.store().count_ingredient_costs(),
                "command_prefix": bot.config().bot.command_prefix,
                "session_timeout_minutes": bot.config().bot.session_timeout,
            });
            println!("{}", payload);
        }
    }

    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    let configured = config
        .as_ref()
        .and_then(|cfg| cfg.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    // CLI verbosity can only raise the configured level
    let base_level = match verbosity {
        0 => configured,
        1 => configured.max(log::LevelFilter::Debug),
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Mirror to the console only when a human is watching
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
