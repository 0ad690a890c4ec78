use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Confirm, Text};
use weather_core::{
    Config, PageModel, WeatherRecord, WeatherService, WeatherStore, clients_from_config,
};

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "City weather lookup with history")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web form.
    Serve {
        /// Listen address, e.g. "127.0.0.1:5000".
        #[arg(long)]
        bind: Option<String>,

        /// SQLite database file.
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// Look up one city, store it and print the result.
    Lookup {
        /// City name.
        city: String,
    },

    /// Show the most recent lookups.
    History,

    /// Delete all stored lookups.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Interactively write the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config_path = match &self.config {
            Some(path) => path.clone(),
            None => Config::config_file_path()?,
        };
        let mut config = Config::load_from(&config_path)?;

        match self.command {
            Command::Serve { bind, database } => {
                if let Some(bind) = bind {
                    config.server.bind = bind;
                }
                if let Some(database) = database {
                    config.storage.database = Some(database);
                }

                let addr: SocketAddr = config
                    .server
                    .bind
                    .parse()
                    .with_context(|| format!("Invalid bind address '{}'", config.server.bind))?;

                let service = build_service(&config)?;
                server::serve(service, addr).await?;
            }
            Command::Lookup { city } => {
                let service = build_service(&config)?;
                let page = service.handle(Some(&city)).await?;
                print_page(&page);
            }
            Command::History => {
                let service = build_service(&config)?;
                print_history(&service.history()?);
            }
            Command::Clear { yes } => {
                let confirmed = yes
                    || Confirm::new("Delete all stored lookups?")
                        .with_default(false)
                        .prompt()
                        .context("Failed to read confirmation")?;

                if confirmed {
                    let service = build_service(&config)?;
                    let removed = service.clear_history()?;
                    println!("Removed {removed} lookups.");
                } else {
                    println!("Nothing deleted.");
                }
            }
            Command::Configure => {
                configure(&mut config)?;
                config.save_to(&config_path)?;
                println!("Saved configuration to {}", config_path.display());
            }
        }

        Ok(())
    }
}

fn build_service(config: &Config) -> anyhow::Result<WeatherService> {
    let db_path = config.database_path()?;
    let store = WeatherStore::open(&db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
    tracing::info!("Using database {}", db_path.display());

    let (geocoder, forecast) = clients_from_config(&config.services)?;
    Ok(WeatherService::new(geocoder, forecast, Arc::new(store)))
}

fn configure(config: &mut Config) -> anyhow::Result<()> {
    config.server.bind = Text::new("Listen address:")
        .with_default(&config.server.bind)
        .prompt()
        .context("Failed to read listen address")?;

    let current_db = config.database_path()?.display().to_string();
    let database = Text::new("Database file:")
        .with_default(&current_db)
        .prompt()
        .context("Failed to read database path")?;
    config.storage.database = Some(PathBuf::from(database.trim()));

    config.services.timezone = Text::new("Timezone for reported times:")
        .with_default(&config.services.timezone)
        .prompt()
        .context("Failed to read timezone")?;

    Ok(())
}

fn print_page(page: &PageModel) {
    if let Some(error) = &page.error {
        println!("{error}");
    }

    if let Some(w) = &page.weather {
        println!("{}, {}", w.city, w.country);
        println!("  Temperature: {} °C", w.temperature);
        println!("  Wind speed:  {} km/h", w.windspeed);
        println!("  Condition:   {} ({})", w.description, w.condition);
        println!("  Time:        {}", w.time);
    }

    println!();
    print_history(&page.history);
}

fn print_history(history: &[WeatherRecord]) {
    if history.is_empty() {
        println!("No searches yet.");
        return;
    }

    println!("Recent searches:");
    for row in history {
        println!(
            "  {:<20} {:>6.1} °C  {:<8} {}",
            row.city, row.temperature, row.description, row.time
        );
    }
}
