//! Story playground CLI binary.
//!
//! # Commands
//!
//! - `models` - List/search/inspect model profiles
//! - `prompt` - Preview the prompt for a set of parameters
//! - `generate` - Fill the parameter form and submit it to the story service
//! - `serve` - Start the story generation service

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use playground::{
    config::Config,
    form::ParameterForm,
    models::ModelRegistry,
    server::StoryServer,
    story::{build_prompt, StoryLength},
    transport::HttpTransport,
    VERSION,
};

#[derive(Parser)]
#[command(name = "playground")]
#[command(version = VERSION)]
#[command(about = "Story playground - validated story generation parameters", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/story-playground/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List and search model profiles
    Models {
        #[command(subcommand)]
        action: Option<ModelsAction>,
    },

    /// Print the prompt the service would build
    Prompt {
        /// Story theme (random if omitted)
        #[arg(long)]
        theme: Option<String>,

        /// Story genre (random if omitted)
        #[arg(long)]
        genre: Option<String>,

        /// Number of main characters (1-10)
        #[arg(long, default_value = "1")]
        characters: u8,

        /// Story length: short, medium, long
        #[arg(short, long, default_value = "medium")]
        length: StoryLength,
    },

    /// Generate a story through the story service
    Generate {
        /// Model profile id (default: registry default)
        #[arg(short, long)]
        model: Option<String>,

        /// Story theme
        #[arg(long)]
        theme: Option<String>,

        /// Story genre
        #[arg(long)]
        genre: Option<String>,

        /// Number of main characters (1-10)
        #[arg(long)]
        characters: Option<u8>,

        /// Story length: short, medium, long
        #[arg(short, long)]
        length: Option<StoryLength>,

        /// Sampling temperature (must fit the profile)
        #[arg(short, long)]
        temperature: Option<f64>,

        /// Maximum output tokens (must fit the profile)
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Service host including scheme (overrides config)
        #[arg(long)]
        api_host: Option<String>,

        /// Service port (overrides config)
        #[arg(long)]
        api_port: Option<u16>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Start the story generation service
    Serve {
        /// Listen port
        #[arg(short, long)]
        port: Option<u16>,

        /// Listen host
        #[arg(long)]
        host: Option<String>,

        /// Messages-compatible upstream URL
        #[arg(short, long)]
        upstream: Option<String>,

        /// API key for upstream (or use env ANTHROPIC_API_KEY)
        #[arg(short = 'k', long)]
        api_key: Option<String>,

        /// Model name to send upstream instead of the profile id
        #[arg(long)]
        upstream_model: Option<String>,

        /// Disable CORS
        #[arg(long)]
        no_cors: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Subcommand)]
enum ModelsAction {
    /// List all profiles
    List,

    /// Search profiles by id or name
    Search {
        /// Search query
        query: String,
    },

    /// Show one profile
    Info {
        /// Model profile id
        model: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Models { action } => cmd_models(&config, action),

        Commands::Prompt {
            theme,
            genre,
            characters,
            length,
        } => cmd_prompt(&config, theme, genre, characters, length),

        Commands::Generate {
            model,
            theme,
            genre,
            characters,
            length,
            temperature,
            max_tokens,
            api_host,
            api_port,
            json,
            verbose,
        } => {
            init_logging(verbose);
            let mut config = config;
            if let Some(host) = api_host {
                config.client.api_host = host;
            }
            if let Some(port) = api_port {
                config.client.api_port = port;
            }
            let params = FormArgs {
                model,
                theme,
                genre,
                characters,
                length,
                temperature,
                max_tokens,
            };
            cmd_generate(&config, params, json)
        },

        Commands::Serve {
            port,
            host,
            upstream,
            api_key,
            upstream_model,
            no_cors,
            verbose,
        } => {
            init_logging(verbose);
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(upstream) = upstream {
                config.server.upstream_url = upstream;
            }
            if api_key.is_some() {
                config.server.api_key = api_key;
            }
            if upstream_model.is_some() {
                config.server.upstream_model = upstream_model;
            }
            if no_cors {
                config.server.cors_enabled = false;
            }
            cmd_serve(config)
        },
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?.merge(Config::from_env()),
        None => Config::load()?,
    };
    Ok(config)
}

fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_models(config: &Config, action: Option<ModelsAction>) -> anyhow::Result<()> {
    let registry = config.models.build_registry()?;

    match action {
        None | Some(ModelsAction::List) => {
            println!("Available Models ({}):", registry.len());
            println!();
            print_header();
            for (i, profile) in registry.iter().enumerate() {
                print_row(profile, i == 0);
            }
        },

        Some(ModelsAction::Search { query }) => {
            println!("Search results for '{query}':");
            println!();
            print_header();
            let default_id = &registry.default_profile().model_id;
            for profile in registry.search(&query) {
                print_row(profile, &profile.model_id == default_id);
            }
        },

        Some(ModelsAction::Info { model }) => match registry.lookup(&model) {
            Ok(profile) => {
                let t = &profile.temperature_range;
                let m = &profile.max_token_range;
                println!("Model: {}", profile.model_name);
                println!("ID: {}", profile.model_id);
                println!(
                    "Default: {}",
                    profile.model_id == registry.default_profile().model_id
                );
                println!();
                println!("Temperature: {} - {} (default {})", t.min, t.max, t.default);
                println!("Max Tokens:  {} - {} (default {})", m.min, m.max, m.default);
            },
            Err(e) => {
                eprintln!("{e}");
                eprintln!("Try 'playground models search {model}' to find similar models");
                std::process::exit(1);
            },
        },
    }

    Ok(())
}

fn print_header() {
    println!(
        "{:<46} {:<22} {:>13} {:>14}",
        "ID", "Name", "Temperature", "Max Tokens"
    );
    println!("{}", "-".repeat(98));
}

fn print_row(profile: &playground::ModelProfile, is_default: bool) {
    let t = &profile.temperature_range;
    let m = &profile.max_token_range;
    println!(
        "{:<46} {:<22} {:>13} {:>14}{}",
        profile.model_id,
        profile.model_name,
        format!("{}-{}", t.min, t.max),
        format!("{}-{}", m.min, m.max),
        if is_default { "  (default)" } else { "" }
    );
}

fn cmd_prompt(
    config: &Config,
    theme: Option<String>,
    genre: Option<String>,
    characters: u8,
    length: StoryLength,
) -> anyhow::Result<()> {
    let registry = Arc::new(config.models.build_registry()?);
    let mut form = ParameterForm::new(registry);
    if !form.set_characters(characters) {
        anyhow::bail!("characters must be between 1 and 10, got {characters}");
    }
    if let Some(theme) = theme {
        form.set_theme(theme);
    }
    if let Some(genre) = genre {
        form.set_genre(genre);
    }
    form.set_length(length);

    println!("{}", build_prompt(&form.snapshot(), &mut rand::thread_rng()));
    Ok(())
}

/// Form values requested on the command line
struct FormArgs {
    model: Option<String>,
    theme: Option<String>,
    genre: Option<String>,
    characters: Option<u8>,
    length: Option<StoryLength>,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
}

fn fill_form(registry: Arc<ModelRegistry>, args: FormArgs) -> anyhow::Result<ParameterForm> {
    let mut form = match &args.model {
        Some(model) => ParameterForm::with_profile(registry, model)?,
        None => ParameterForm::new(registry),
    };

    if let Some(theme) = args.theme {
        form.set_theme(theme);
    }
    if let Some(genre) = args.genre {
        form.set_genre(genre);
    }
    if let Some(length) = args.length {
        form.set_length(length);
    }
    if let Some(characters) = args.characters {
        if !form.set_characters(characters) {
            eprintln!(
                "Warning: characters {characters} not in [1, 10]; keeping {}",
                form.state().characters
            );
        }
    }
    if let Some(temperature) = args.temperature {
        if !form.set_temperature(temperature) {
            let range = form.profile().temperature_range;
            eprintln!(
                "Warning: temperature {temperature} not in [{}, {}]; keeping {}",
                range.min,
                range.max,
                form.state().temperature
            );
        }
    }
    if let Some(max_tokens) = args.max_tokens {
        if !form.set_max_tokens(max_tokens) {
            let range = form.profile().max_token_range;
            eprintln!(
                "Warning: max tokens {max_tokens} not in [{}, {}]; keeping {}",
                range.min,
                range.max,
                form.state().max_tokens
            );
        }
    }

    Ok(form)
}

fn cmd_generate(config: &Config, args: FormArgs, json_output: bool) -> anyhow::Result<()> {
    let registry = Arc::new(config.models.build_registry()?);
    let mut form = fill_form(registry, args)?;
    let transport = HttpTransport::new(&config.client)?;

    tracing::info!(
        model = %form.profile().model_id,
        endpoint = transport.endpoint(),
        "Generating story"
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(form.submit_with(&transport))?;

    if let Some(story) = form.last_story() {
        if json_output {
            println!("{}", serde_json::to_string_pretty(story)?);
        } else {
            println!("{}", story.title);
            println!();
            println!("{}", story.story);
        }
        return Ok(());
    }

    eprintln!(
        "{}",
        form.last_error().unwrap_or(playground::USER_FACING_ERROR)
    );
    std::process::exit(1);
}

fn cmd_serve(config: Config) -> anyhow::Result<()> {
    let registry = Arc::new(config.models.build_registry()?);
    let server = StoryServer::from_config(config.server, registry)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.run())?;
    Ok(())
}
