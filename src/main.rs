use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use uplift::api::ApiServer;
use uplift::{
    ApplianceCatalog, Config, HttpRelayClient, RelayServer, ScriptRunner, Translator,
    TranslatorOptions,
};

/// Uplift - smart-home directive bridge for infrared appliances
#[derive(Parser)]
#[command(name = "uplift", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the directive translator HTTP service
    Translate {
        /// Port to listen on
        #[arg(long, env = "UPLIFT_TRANSLATOR_PORT")]
        port: Option<u16>,
    },
    /// Run the relay server that drives the control scripts
    Relay {
        /// Port to listen on
        #[arg(long, env = "UPLIFT_RELAY_PORT")]
        port: Option<u16>,
        /// Directory holding the control scripts
        #[arg(long, env = "UPLIFT_SCRIPTS_DIR")]
        scripts_dir: Option<PathBuf>,
    },
    /// Handle a single directive from a file (or stdin) and print the response
    Handle {
        /// Path to a directive JSON file; reads stdin when omitted
        file: Option<PathBuf>,
    },
    /// Print the discovery endpoint list
    Appliances,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,uplift=info",
        1 => "info,uplift=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Translate { port } => translate(port).await,
        Command::Relay { port, scripts_dir } => relay(port, scripts_dir).await,
        Command::Handle { file } => handle(file).await,
        Command::Appliances => appliances(),
    }
}

/// Build a translator wired to the configured relay
fn build_translator(config: Config) -> Translator {
    let secret = Arc::new(config.secret);
    let client = HttpRelayClient::new(config.translator.relay_url, secret);
    Translator::new(
        Arc::new(ApplianceCatalog::builtin()),
        Arc::new(client),
        TranslatorOptions {
            strict_relay: config.translator.strict_relay,
        },
    )
}

/// Run the translator service
async fn translate(port: Option<u16>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let port = port.unwrap_or(config.translator.port);

    tracing::info!(
        port,
        relay_url = %config.translator.relay_url,
        strict_relay = config.translator.strict_relay,
        "starting directive translator"
    );

    let translator = Arc::new(build_translator(config));
    ApiServer::new(translator, port).run().await?;

    Ok(())
}

/// Run the relay server
async fn relay(port: Option<u16>, scripts_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let port = port.unwrap_or(config.relay.port);
    let runner = ScriptRunner::new(scripts_dir.unwrap_or(config.relay.scripts_dir))
        .with_timeout(config.relay.action_timeout);

    if !runner.scripts_dir().is_dir() {
        tracing::warn!(path = %runner.scripts_dir().display(), "scripts directory does not exist");
    }

    tracing::info!(
        port,
        scripts_dir = %runner.scripts_dir().display(),
        action_timeout = ?config.relay.action_timeout,
        "starting relay server"
    );

    RelayServer::new(Arc::new(config.secret), Arc::new(runner), port)
        .run()
        .await?;

    Ok(())
}

/// Handle one directive and print the response envelope
async fn handle(file: Option<PathBuf>) -> anyhow::Result<()> {
    let body = match file {
        Some(path) => std::fs::read_to_string(&path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let raw: serde_json::Value = serde_json::from_str(&body)?;

    let translator = build_translator(Config::load()?);
    let response = translator.handle(&raw).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Print the discovery endpoint list
fn appliances() -> anyhow::Result<()> {
    let catalog = ApplianceCatalog::builtin();
    println!("{}", serde_json::to_string_pretty(catalog.as_slice())?);
    Ok(())
}
