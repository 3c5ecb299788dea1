//! Cookbook - Multilingual Recipe Site
//!
//! Entry point for the cookbook tool, which renders a recipe journal into
//! translated static pages using built-in dictionaries and a
//! LibreTranslate compatible service.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use cookbook::app::{display_path, Cookbook};
use cookbook::cli::{Args, CacheAction, Commands};
use cookbook::config::Config;
use cookbook::filter::FilterState;
use cookbook::lang;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    let output_dir = config.site.output_dir.clone();
    let default_languages = config.site.languages.clone();
    let cookbook = Cookbook::from_config(config, args.offline)?;

    match args.command {
        Commands::Build { languages, output } => {
            let languages = match languages {
                Some(list) => lang::parse_language_list(&list)?,
                None => default_languages,
            };
            let output = output.unwrap_or(output_dir);
            info!("Building {} languages into {}", languages.len(), output.display());

            let report = cookbook.build_site(&languages, &output).await?;
            println!("\n{:<10} {:<8} {:<12} {:<40}", "Language", "Recipes", "Translated", "Index");
            println!("{}", "-".repeat(72));
            for build in &report.languages {
                let translated = if build.pretranslated {
                    "document".to_string()
                } else {
                    build.translated_elements.to_string()
                };
                println!("{:<10} {:<8} {:<12} {:<40}",
                    build.language, build.recipes, translated, display_path(&build.index));
            }
        }
        Commands::Translate { text, lang } => {
            let translated = cookbook.translate_text(&text, &lang).await?;
            println!("{}", translated);
        }
        Commands::Search { query, dish, dietary, lang } => {
            let language = match lang {
                Some(code) => code,
                None => cookbook.current_language(),
            };

            let mut state = FilterState::default();
            for tag in &dish {
                state.select_dish(tag);
            }
            for tag in &dietary {
                state.toggle_dietary(tag);
            }
            state.set_search(&query);

            let results = cookbook.search(&language, &state).await?;
            if results.is_empty() {
                println!("No recipes match.");
            } else {
                println!("\n{:<24} {:<40} {:<30}", "Id", "Title", "Tags");
                println!("{}", "-".repeat(94));
                for recipe in results {
                    let tags = recipe.tags.iter().cloned().collect::<Vec<_>>().join(", ");
                    println!("{:<24} {:<40} {:<30}", recipe.id, recipe.title, tags);
                }
            }
        }
        Commands::Switch { lang, output } => {
            let output = output.unwrap_or(output_dir);
            let index = cookbook.switch_language(&lang, &output).await?;
            println!("Language set to {}, page written to {}",
                cookbook.current_language(), display_path(&index));
        }
        Commands::Languages => {
            println!("\n{:<6} {:<14} {:<10}", "Code", "Name", "Document");
            println!("{}", "-".repeat(32));
            for language in cookbook.languages() {
                let status = if language.has_document { "yes" } else { "-" };
                println!("{:<6} {:<14} {:<10}", language.code, language.name, status);
            }
        }
        Commands::Cache { action } => match action {
            CacheAction::List => {
                let entries = cookbook.list_cache()?;
                if entries.is_empty() {
                    println!("No cached translations found.");
                } else {
                    println!("\n{:<10} {:<10}", "Language", "Entries");
                    println!("{}", "-".repeat(20));
                    for entry in entries {
                        println!("{:<10} {:<10}", entry.language, entry.entries);
                    }
                }
            }
            CacheAction::Clear => {
                let removed = cookbook.clear_cache()?;
                println!("Cleared {} cached translation sets", removed);
            }
        },
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".cookbook").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "cookbook.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("cookbook.log").display());

    Ok(())
}
