use std::fmt;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Select, Text};
use zipcast_core::{
    Config, FileStore, HistoryStore, HttpWeatherClient, KeyValueStore, MemoryStore,
    SearchController, Units, client::client_from_config,
};

use crate::{
    chart::TerminalChart,
    view::{ConsoleView, history_line},
};

type Controller = SearchController<
    HttpWeatherClient,
    Store,
    TerminalChart<std::io::Stdout>,
    ConsoleView<std::io::Stdout>,
>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "zipcast", version, about = "Weather lookup by zip code")]
pub struct Cli {
    /// Backend base URL; overrides the configured one.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Keep search history in memory for this run only.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the backend URL and default units.
    Configure,

    /// Show current weather and forecast for a zip code.
    Show {
        zip: String,

        /// "metric" or "imperial"; defaults to the configured units.
        #[arg(long, value_parser = parse_units)]
        units: Option<Units>,
    },

    /// List remembered searches.
    History,

    /// Repeat a remembered search by its number in `zipcast history`.
    Replay { number: usize },

    /// Menu-driven search session.
    Interactive,
}

fn parse_units(s: &str) -> Result<Units, String> {
    Units::try_from(s).map_err(|e| e.to_string())
}

/// History backing chosen by `--ephemeral`.
#[derive(Debug)]
pub enum Store {
    File(FileStore),
    Memory(MemoryStore),
}

impl Store {
    fn open(ephemeral: bool) -> anyhow::Result<Self> {
        if ephemeral {
            return Ok(Store::Memory(MemoryStore::new()));
        }
        Ok(Store::File(FileStore::new(Config::store_file_path()?)))
    }
}

impl KeyValueStore for Store {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            Store::File(s) => s.get(key),
            Store::Memory(s) => s.get(key),
        }
    }

    fn set(&mut self, key: &str, value: String) -> anyhow::Result<()> {
        match self {
            Store::File(s) => s.set(key, value),
            Store::Memory(s) => s.set(key, value),
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let Cli {
            base_url,
            ephemeral,
            command,
        } = self;

        let mut config = Config::load()?;
        if let Some(url) = base_url {
            config.set_base_url(url);
        }

        match command {
            Command::Configure => configure(config)?,
            Command::History => {
                let history = HistoryStore::new(Store::open(ephemeral)?).load();
                println!("{}", history_line(&history));
            }
            Command::Show { zip, units } => {
                let mut controller = controller(&config, ephemeral)?;
                controller.form_mut().zip = zip;
                controller.form_mut().units = match units {
                    Some(units) => units,
                    None => config.default_units()?,
                };
                controller.submit().await;
            }
            Command::Replay { number } => {
                let mut controller = controller(&config, ephemeral)?;
                let index = number
                    .checked_sub(1)
                    .filter(|i| controller.history().load().get(*i).is_some())
                    .ok_or_else(|| anyhow!("No history entry #{number}. See `zipcast history`."))?;
                controller.select_history(index).await;
            }
            Command::Interactive => interactive(&config, ephemeral).await?,
        }

        Ok(())
    }
}

fn controller(config: &Config, ephemeral: bool) -> anyhow::Result<Controller> {
    let client = client_from_config(config)?;
    let mut controller = SearchController::new(
        client,
        Store::open(ephemeral)?,
        TerminalChart::stdout(),
        ConsoleView::stdout(),
    );
    controller.form_mut().units = config.default_units()?;
    Ok(controller)
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let url = Text::new("Backend base URL:")
        .with_default(config.base_url())
        .prompt()?;
    HttpWeatherClient::new(&url)?;
    config.set_base_url(url);

    let current = config.default_units()?;
    let start = Units::all().iter().position(|u| *u == current).unwrap_or(0);
    let units = Select::new("Default units:", Units::all().to_vec())
        .with_starting_cursor(start)
        .prompt()?;
    config.set_default_units(units);

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

enum MenuItem {
    NewSearch,
    Replay(usize, String),
    Quit,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuItem::NewSearch => f.write_str("New search"),
            MenuItem::Replay(_, label) => write!(f, "Repeat {label}"),
            MenuItem::Quit => f.write_str("Quit"),
        }
    }
}

async fn interactive(config: &Config, ephemeral: bool) -> anyhow::Result<()> {
    let mut controller = controller(config, ephemeral)?;
    controller.init();

    loop {
        let mut items = vec![MenuItem::NewSearch];
        items.extend(
            controller
                .history()
                .load()
                .iter()
                .enumerate()
                .map(|(i, entry)| MenuItem::Replay(i, entry.label())),
        );
        items.push(MenuItem::Quit);

        let choice = match Select::new("What next?", items).prompt() {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Menu prompt failed"),
        };

        match choice {
            MenuItem::NewSearch => {
                let form = controller.form().clone();
                let Some((zip, units)) = prompt_search(&form.zip, form.units)? else {
                    continue;
                };
                controller.form_mut().zip = zip;
                controller.form_mut().units = units;
                controller.submit().await;
            }
            MenuItem::Replay(index, _) => controller.select_history(index).await,
            MenuItem::Quit => break,
        }
    }

    Ok(())
}

/// `None` when the user backs out with Esc.
fn prompt_search(zip: &str, units: Units) -> anyhow::Result<Option<(String, Units)>> {
    let zip = match Text::new("Zip code:").with_initial_value(zip).prompt() {
        Ok(zip) => zip,
        Err(InquireError::OperationCanceled) => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    let start = Units::all().iter().position(|u| *u == units).unwrap_or(0);
    let units = match Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(start)
        .prompt()
    {
        Ok(units) => units,
        Err(InquireError::OperationCanceled) => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    Ok(Some((zip, units)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_show_with_units() {
        let cli = Cli::try_parse_from(["zipcast", "show", "12180", "--units", "metric"]).unwrap();
        match cli.command {
            Command::Show { zip, units } => {
                assert_eq!(zip, "12180");
                assert_eq!(units, Some(Units::Metric));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_units() {
        let err =
            Cli::try_parse_from(["zipcast", "show", "12180", "--units", "kelvin"]).unwrap_err();
        assert!(err.to_string().contains("Unknown units"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "zipcast",
            "replay",
            "2",
            "--ephemeral",
            "--base-url",
            "http://127.0.0.1:5000",
        ])
        .unwrap();
        assert!(cli.ephemeral);
        assert_eq!(cli.base_url.as_deref(), Some("http://127.0.0.1:5000"));
        assert!(matches!(cli.command, Command::Replay { number: 2 }));
    }

    #[test]
    fn ephemeral_store_starts_empty() {
        let store = Store::open(true).unwrap();
        assert_eq!(store.get("history"), None);
    }
}
