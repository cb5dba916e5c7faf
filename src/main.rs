use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use vehicle_companion::keymap::{self, Input};
use vehicle_companion::{Companion, Config, ControllerHandle, InMemoryStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            Config::load(&path).with_context(|| format!("loading config from {path}"))?
        }
        None => Config::default(),
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!();
    println!(">>>> Vehicle Controller Companion <<<<");
    println!();
    println!("{}", keymap::KEY_HELP);
    println!();

    let store = Arc::new(InMemoryStore::new());
    let companion = Companion::start(store, config).await;
    if !companion.has_live_feed() {
        warn!("Running without a live feed; external changes will not be mirrored");
    }

    let handle = companion.handle();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = match keymap::parse(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(err) => {
                error!("{err}");
                continue;
            }
        };
        if input == Input::Quit {
            break;
        }
        dispatch(&handle, input).await?;
    }

    drop(handle);
    companion.shutdown().await;
    info!("Vehicle controller stopped");
    Ok(())
}

async fn dispatch(handle: &ControllerHandle, input: Input) -> Result<()> {
    let command = match input {
        Input::Command(command) => command,
        Input::ShowState => {
            println!("{}", serde_json::to_string_pretty(&handle.snapshot().await?)?);
            return Ok(());
        }
        Input::ShowHistory => {
            for change in handle.gear_history().await?.changes() {
                println!(
                    "{} {} -> {} ({:?})",
                    change.timestamp.to_rfc3339(),
                    change.from,
                    change.to,
                    change.cause
                );
            }
            return Ok(());
        }
        Input::Help => {
            println!("{}", keymap::KEY_HELP);
            return Ok(());
        }
        Input::Unknown(key) => {
            println!("Unknown key '{key}', type 'help' for the key map");
            return Ok(());
        }
        Input::Quit => return Ok(()),
    };

    let outcome = handle.execute(command).await?;
    println!("{outcome}");
    Ok(())
}
