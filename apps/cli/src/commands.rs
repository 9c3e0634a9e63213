//! CLI command definitions, routing, and tracing setup.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use blogsmith_core::{BlogPipeline, ProgressReporter, Stage};
use blogsmith_shared::{
    AppConfig, BlogsmithError, PipelineState, init_config, load_config, load_config_from,
    read_api_key,
};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

/// Width of the `=` rule printed around the finished post.
const SEPARATOR_WIDTH: usize = 60;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Blogsmith — research a topic and write a blog post about it.
#[derive(Parser)]
#[command(
    name = "blogsmith",
    version,
    about = "Research a topic on Wikipedia and the web, then write a blog post about it.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Blog topic. Prompted for on stdin when omitted.
    pub topic: Option<String>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.blogsmith/blogsmith.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so stdout carries
/// only the post.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "blogsmith=warn",
        1 => "blogsmith=info",
        2 => "blogsmith=debug",
        _ => "blogsmith=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None => cmd_write(cli.topic, cli.config.as_deref()).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(cli.config.as_deref()).await,
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_write(topic: Option<String>, config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;

    let topic = match topic {
        Some(t) => t,
        None => prompt_topic()?,
    };
    validate_topic(&topic)?;

    let api_key = read_api_key(&config.llm);
    if api_key.is_none() {
        warn!(
            env = %config.llm.api_key_env,
            "API key not set; the model service will reject the request"
        );
    }

    let pipeline = BlogPipeline::from_config(&config, api_key)?;

    info!(%topic, model = %config.llm.model, "generating blog");
    println!("\nStarting Blog Generation System...");

    let reporter = CliProgress::new();
    let result = pipeline.generate_blog(&topic, &reporter).await;
    reporter.finish();
    let blog = result?;

    let separator = "=".repeat(SEPARATOR_WIDTH);
    println!("\nBlog generation complete!\n");
    println!("{separator}");
    println!("{blog}");
    println!("{separator}");

    Ok(())
}

/// Reject a topic with nothing but whitespace.
fn validate_topic(topic: &str) -> blogsmith_shared::Result<()> {
    if topic.trim().is_empty() {
        return Err(BlogsmithError::validation("blog topic must not be empty"));
    }
    Ok(())
}

/// Ask for the topic on stdout and read one line from stdin.
fn prompt_topic() -> Result<String> {
    print!("Enter a blog topic: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    let read = std::io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Err(eyre!("no topic given (stdin closed)"));
    }

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner on stderr.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    /// Clear the spinner whether or not the run succeeded.
    fn finish(&self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliProgress {
    fn stage_started(&self, stage: Stage, state: &PipelineState) {
        self.spinner.set_message(stage.progress_message(state));
    }

    fn done(&self, _state: &PipelineState) {
        self.spinner.finish_and_clear();
    }
}
