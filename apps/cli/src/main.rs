//! Blogsmith CLI — turn a topic into a researched blog post.
//!
//! Researches the topic on Wikipedia and DuckDuckGo, then has a language
//! model outline and write the post.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    // A missing .env is fine; the environment may already hold the key.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
