use pmoconfig::{Config, get_config};
use pmotracker::{FormController, TrackerSettings, render_frame};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Example phone numbers for quick testing
const EXAMPLE_NUMBERS: &[(&str, &str)] = &[
    ("+14155552671", "US"),
    ("+919876543210", "India"),
    ("+442071234567", "UK"),
    ("+61412345678", "Australia"),
];

const HELP: &str = "Commands: type <number> | submit | examples | health | quit";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Type(String),
    Submit,
    Examples,
    Health,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    let (word, rest) = match line.trim_start().split_once(' ') {
        Some((word, rest)) => (word, rest),
        None => (line.trim(), ""),
    };
    match word {
        "type" => Command::Type(rest.to_string()),
        "submit" => Command::Submit,
        "examples" => Command::Examples,
        "health" => Command::Health,
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    if !config.get_log_enable_console()? {
        return Ok(());
    }
    let level = config.get_log_min_level()?.to_lowercase();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Optional first argument: configuration directory
    let config = match std::env::args().nth(1) {
        Some(dir) => Arc::new(Config::load_config(&dir)?),
        None => get_config(),
    };
    init_logging(&config)?;

    let settings = TrackerSettings::from_config(&config)?;
    let client = settings.build_client()?;
    info!(api_base = %client.api_base(), "📱 Phone tracker starting");

    let form = FormController::spawn(Arc::new(client.clone()), settings.validate);

    let mut frames = form.frames();
    let printer = tokio::spawn(async move {
        while frames.changed().await.is_ok() {
            let text = render_frame(&frames.borrow_and_update());
            println!("{}", text);
        }
    });

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Command::Type(value) => form.input(value).await?,
            Command::Submit => form.submit().await?,
            Command::Examples => {
                for (number, country) in EXAMPLE_NUMBERS {
                    println!("  {}  ({})", number, country);
                }
            }
            Command::Health => match client.health().await {
                Ok(health) => println!(
                    "Backend {} (geocoding api configured: {})",
                    health.status, health.api_configured
                ),
                Err(e) => warn!("Health check failed: {}", e),
            },
            Command::Quit => break,
            Command::Unknown(word) if word.is_empty() => {}
            Command::Unknown(word) => println!("Unknown command '{}'. {}", word, HELP),
        }
    }

    form.shutdown().await?;
    printer.await?;
    info!("Bye");
    Ok(())
}
