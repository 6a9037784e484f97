// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nearcare_core::{reply, BotConfig, Category, Dispatcher, SessionStore};
use regex::Regex;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// User id for one-off queries from the command line.
const CLI_USER: &str = "cli";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the bot configuration file
    #[arg(short, long, env = "NEARCARE_CONFIG")]
    config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every category and the size of its catalog
    Catalogs,
    /// Find the facilities closest to a coordinate
    Nearest {
        /// Category identifier or chat keyword (e.g. CLINIC or 診所)
        #[arg(long)]
        category: Category,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Number of results (defaults to the configured limit)
        #[arg(short, value_parser = clap::value_parser!(u64).range(1..))]
        k: Option<u64>,
    },
    /// Replay chat events from stdin, one per line: `<user> <text>` or `<user> @<lat>,<lon>`
    Chat {
        /// Forget category selections older than this many seconds
        #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u64).range(1..))]
        session_ttl: u64,
    },
}

enum ChatEvent<'a> {
    Text { user: &'a str, text: &'a str },
    Location { user: &'a str, lat: f64, lon: f64 },
}

fn parse_event(line: &str) -> Option<ChatEvent<'_>> {
    static LOCATION_RE: OnceLock<Regex> = OnceLock::new();
    let location_re = LOCATION_RE.get_or_init(|| {
        Regex::new(r"^(\S+)\s+@\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*$").unwrap()
    });
    if let Some(caps) = location_re.captures(line) {
        let user = caps.get(1)?.as_str();
        let lat = caps[2].parse().ok()?;
        let lon = caps[3].parse().ok()?;
        return Some(ChatEvent::Location { user, lat, lon });
    }

    let (user, text) = line.split_once(char::is_whitespace)?;
    Some(ChatEvent::Text {
        user,
        text: text.trim(),
    })
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = ConfigBuilder::new().set_target_level(LevelFilter::Off).build();
    TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto)
        .context("Failed to initialize logging")
}

fn ttl_duration(seconds: u64) -> Result<chrono::Duration> {
    i64::try_from(seconds)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .with_context(|| format!("Session TTL of {} seconds is out of range", seconds))
}

fn build_dispatcher(config_path: &Path) -> Result<(BotConfig, Dispatcher)> {
    let config = BotConfig::load(config_path)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let catalogs = config
        .build_catalogs(base_dir)
        .with_context(|| format!("Failed to load catalogs from {:?}", config_path))?;
    let dispatcher = Dispatcher::from_config(&config, catalogs, Arc::new(SessionStore::new()));
    Ok((config, dispatcher))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config_path = cli.config.unwrap_or_else(nearcare_core::default_config_path);
    let (config, dispatcher) = build_dispatcher(&config_path)?;

    match cli.command {
        Commands::Catalogs => {
            println!("Catalogs from {:?}", config_path);
            for category in Category::ALL {
                match dispatcher.catalogs().get(category) {
                    Some(catalog) => {
                        let defaulted = catalog.defaulted_count();
                        if defaulted > 0 {
                            println!(
                                "{:<18} {}\t{} records ({} with default coordinates)",
                                category.id(),
                                category.keyword(),
                                catalog.len(),
                                defaulted
                            );
                        } else {
                            println!(
                                "{:<18} {}\t{} records",
                                category.id(),
                                category.keyword(),
                                catalog.len()
                            );
                        }
                    }
                    None => println!(
                        "{:<18} {}\tnot available",
                        category.id(),
                        category.keyword()
                    ),
                }
            }
        }
        Commands::Nearest { category, lat, lon, k } => {
            let limit = k
                .and_then(|k| usize::try_from(k).ok())
                .unwrap_or(config.result_limit);
            let dispatcher = dispatcher.with_result_limit(limit);
            dispatcher.sessions().set_category(CLI_USER, category);
            let outcome = dispatcher.handle_location(CLI_USER, lat, lon);
            println!("{}", reply::location(&outcome));
        }
        Commands::Chat { session_ttl } => {
            let ttl = ttl_duration(session_ttl)?;
            let stdin = io::stdin();
            let mut stdout = io::stdout().lock();

            for line in stdin.lock().lines() {
                let line = line.context("Failed to read from stdin")?;
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }

                dispatcher.sessions().prune_older_than(ttl);

                let (user, text) = match parse_event(line) {
                    Some(ChatEvent::Text { user, text }) => {
                        let outcome = dispatcher.handle_category_text(user, text);
                        (user, reply::selection(&outcome, &config.trigger_keyword))
                    }
                    Some(ChatEvent::Location { user, lat, lon }) => {
                        let outcome = dispatcher.handle_location(user, lat, lon);
                        (user, reply::location(&outcome))
                    }
                    None => {
                        log::warn!("Ignoring malformed chat line: '{}'", line);
                        continue;
                    }
                };
                writeln!(stdout, "[{}] {}", user, text)?;
            }
        }
    }

    Ok(())
}
