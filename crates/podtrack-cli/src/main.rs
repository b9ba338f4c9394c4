use clap::{ArgAction, Parser, Subcommand};
use commands::context::AppContext;
use commands::{catalog, clear, config, history, interactive, session};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "podtrack")]
#[command(about = "podtrack - Discover podcasts and keep track of what you've listened to")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show trending podcasts
    #[command(long_about = "Fetch the trending podcast listing. Without a configured API key, or when the catalog is unreachable, bundled sample podcasts are shown instead.")]
    Trending {
        /// Only show podcasts whose title, description, or category contains this text
        #[arg(long)]
        filter: Option<String>,
    },
    /// Search the podcast catalog
    Search {
        /// Search terms
        query: String,

        /// Number of result pages to load
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=10))]
        pages: u32,
    },
    /// Browse and search interactively
    #[command(long_about = "Start a line-based browser. Typed text is searched once you pause for the configured debounce window; ':more' loads further pages and ':log <id>' records a listen.")]
    Interactive,
    /// Start a local session so listens can be recorded
    Login {
        /// Email or name to identify the session (prompts if omitted)
        #[arg(long)]
        email: Option<String>,
    },
    /// End the current session (listen history is kept)
    Logout,
    /// Show the current session and listen totals
    Whoami,
    /// Record that you listened to a podcast
    Log {
        /// Podcast id, as shown in the ID column
        podcast_id: String,

        /// Rating from 1 to 5
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: Option<u8>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show your recent listens
    History {
        /// Number of recent listens to show (defaults to history.recent_limit)
        #[arg(long)]
        recent: Option<usize>,
    },
    /// Manage configuration and the catalog API key
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
    /// Clear local data
    #[command(long_about = "Remove locally stored data that is safe to drop. Use --session to remove the saved session; the listen log is append-only and is kept.")]
    Clear {
        /// Remove the saved session
        #[arg(long, action = ArgAction::SetTrue)]
        session: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Store the Listen Notes API key in the credentials file
    SetKey {
        /// API key (prompts if omitted)
        #[arg(long)]
        key: Option<String>,
    },
    /// Write a default config file
    Init {
        /// Overwrite an existing config file without asking
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let ctx = AppContext::load()?;

    // The interactive browser owns the terminal, so its logs go to a file
    let log_file = matches!(cli.command, Commands::Interactive).then(|| ctx.paths.log_file());
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Trending { filter } => catalog::run_trending(&ctx, filter, &output).await,
        Commands::Search { query, pages } => catalog::run_search(&ctx, query, pages, &output).await,
        Commands::Interactive => interactive::run_interactive(&ctx, &output).await,
        Commands::Login { email } => session::run_login(&ctx, email, &output).await,
        Commands::Logout => session::run_logout(&ctx, &output).await,
        Commands::Whoami => session::run_whoami(&ctx, &output).await,
        Commands::Log { podcast_id, rating, notes } => {
            history::run_log(&ctx, podcast_id, rating, notes, &output).await
        }
        Commands::History { recent } => history::run_history(&ctx, recent, &output).await,
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show { full: false });
            config::run_config(ctx, cmd, &output).await
        }
        Commands::Clear { session } => clear::run_clear(&ctx, session, &output).await,
    }
}
