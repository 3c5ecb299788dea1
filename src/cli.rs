use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Never call the remote translation service
    #[arg(long)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the site for one or more languages
    Build {
        /// Languages to build (comma-separated), defaults to the configured list
        #[arg(short, long)]
        languages: Option<String>,

        /// Output directory for rendered pages
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Translate a single string
    Translate {
        /// Text to translate
        #[arg(short, long)]
        text: String,

        /// Target language
        #[arg(short, long)]
        lang: String,
    },

    /// List recipes matching filters and a title search
    Search {
        /// Case-insensitive title search
        #[arg(short, long, default_value = "")]
        query: String,

        /// Dish type filter, may be repeated
        #[arg(short, long)]
        dish: Vec<String>,

        /// Dietary filter, may be repeated; recipes must carry all of them
        #[arg(long)]
        dietary: Vec<String>,

        /// Language to show titles in, defaults to the saved preference
        #[arg(short, long)]
        lang: Option<String>,
    },

    /// Change the saved language and re-render the index page
    Switch {
        /// Language to switch to
        #[arg(short, long)]
        lang: String,

        /// Output directory for the re-rendered page
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List supported languages and which have a content document
    Languages,

    /// Manage persisted translation caches
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// List persisted translation caches
    List,

    /// Remove every persisted translation cache
    Clear,
}
