use clap::{Parser, Subcommand};
use dialoguer::Select;
use plex_search::{
    CatalogRegistry, CatalogResolver, ChannelId, CommandContext, ComponentEvent,
    ConfigError, ConsoleSurface, EventOutcome, GuildId, MessageId, OutgoingMessage, PlexSearch,
    PlexSearchError, PluginConfig, Requester, SearchOutcome, ServerRecord, TableError, UserId,
};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "plex-search")]
#[command(about = "Search a guild's Plex server from the terminal", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the persisted tables
    #[arg(long, global = true, env = "PLEX_SEARCH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Maximum number of results requested per search
    #[arg(long, global = true, env = "PLEX_SEARCH_LIMIT")]
    search_limit: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store the Plex server of a guild
    Register {
        #[arg(long)]
        guild: String,

        /// Base URL of the server, e.g. http://plex.local:32400
        #[arg(long)]
        url: String,

        #[arg(long, env = "PLEX_TOKEN", hide_env_values = true)]
        token: String,

        /// Store the record without connecting to the server first
        #[arg(long)]
        no_check: bool,
    },

    /// Remove the Plex server of a guild
    Forget {
        #[arg(long)]
        guild: String,
    },

    /// Run a content search as a guild member
    Search {
        #[arg(long)]
        guild: String,

        /// User the search is run as
        #[arg(long, env = "USER", default_value = "console")]
        user: String,

        /// Print rendered messages as JSON
        #[arg(long)]
        json: bool,

        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Plugin(#[from] PlexSearchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

fn main() {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise derive the level from the verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "plex_search=debug".to_string()
        } else {
            "plex_search=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = match cli.data_dir {
        Some(dir) => PluginConfig::with_data_dir(dir),
        None => PluginConfig::from_project_dirs()?,
    };
    if let Some(limit) = cli.search_limit {
        config.search_limit = limit;
    }

    match cli.command {
        Commands::Register {
            guild,
            url,
            token,
            no_check,
        } => register(&config, GuildId::from(guild), url, token, no_check),
        Commands::Forget { guild } => forget(&config, &GuildId::from(guild)),
        Commands::Search {
            guild,
            user,
            json,
            query,
        } => search(&config, GuildId::from(guild), user, json, &query.join(" ")),
    }
}

fn register(
    config: &PluginConfig,
    guild: GuildId,
    server_url: String,
    token: String,
    no_check: bool,
) -> Result<(), CliError> {
    let registry = CatalogRegistry::open(config)?;

    // Write the record, dropping any handle cached for the old one
    let previous = registry.store_server(&guild, &ServerRecord { server_url, token })?;

    if !no_check {
        if let Err(e) = registry.resolve(&guild) {
            // Keep the table as it was when the new server cannot be reached
            match &previous {
                Some(record) => {
                    registry.store_server(&guild, record)?;
                }
                None => {
                    registry.remove_server(&guild)?;
                }
            }
            return Err(PlexSearchError::from(e).into());
        }
    }

    println!("Registered Plex server for guild {}", guild);
    Ok(())
}

fn forget(config: &PluginConfig, guild: &GuildId) -> Result<(), CliError> {
    let registry = CatalogRegistry::open(config)?;

    if registry.remove_server(guild)? {
        println!("Removed Plex server of guild {}", guild);
    } else {
        println!("No Plex server registered for guild {}", guild);
    }
    Ok(())
}

fn search(
    config: &PluginConfig,
    guild: GuildId,
    user: String,
    json: bool,
    query: &str,
) -> Result<(), CliError> {
    let surface = Arc::new(ConsoleSurface::new(json));
    let registry = CatalogRegistry::open(config)?;
    let plugin = PlexSearch::new(Arc::clone(&surface), registry);

    let author = Requester {
        id: UserId::from(user.clone()),
        name: user,
        avatar_url: None,
    };
    let ctx = CommandContext {
        guild: guild.clone(),
        channel: ChannelId::from("console"),
        message: MessageId::from(ulid::Ulid::new().to_string()),
        author: author.clone(),
    };

    if plugin.search(&ctx, query)? == SearchOutcome::NoResults {
        return Ok(());
    }

    // Offer every active selector until the conversation ends
    while let Some((message, outgoing)) = surface.latest_interactive() {
        let Some(event) = prompt(&guild, &author, message, &outgoing)? else {
            break;
        };

        if plugin.on_component(&event)? == EventOutcome::Ignored {
            break;
        }
    }

    Ok(())
}

/// Asks the user to pick an option of the message's selector
///
/// Returns the component event the choice corresponds to, or `None` if the
/// message has no selector.
fn prompt(
    guild: &GuildId,
    author: &Requester,
    message: MessageId,
    outgoing: &OutgoingMessage,
) -> Result<Option<ComponentEvent>, CliError> {
    let Some(menu) = outgoing.select_menu() else {
        return Ok(None);
    };
    let cancel = outgoing.buttons().next();

    let mut labels: Vec<String> = menu.options.iter().map(|o| o.label.clone()).collect();
    if let Some(button) = cancel {
        labels.push(button.label.clone());
    }

    let choice = Select::new()
        .with_prompt("Select an entry")
        .items(&labels)
        .default(0)
        .interact()?;

    let (custom_id, values) = match menu.options.get(choice) {
        Some(option) => (menu.custom_id.clone(), vec![option.value.clone()]),
        None => match cancel {
            Some(button) => (button.custom_id.clone(), Vec::new()),
            None => return Ok(None),
        },
    };

    Ok(Some(ComponentEvent {
        guild: guild.clone(),
        message,
        custom_id,
        values,
        author: author.clone(),
    }))
}

