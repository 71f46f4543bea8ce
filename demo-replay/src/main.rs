use std::path::PathBuf;

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oauth2_observer::{AssessorSettings, ChannelNotifier, OAuthClientAssessor, spawn_assessor};

mod assembler;
mod errors;
mod records;

use crate::{assembler::ExchangeAssembler, errors::ReplayError};

#[derive(Parser, Debug)]
#[command(about = "Replay recorded browser traffic through the OAuth client assessor", version)]
struct Args {
    #[arg(short, long, help = "Path to the recorded webRequest events (JSON lines)")]
    input: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "demo_replay=info,oauth2_observer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let contents = tokio::fs::read_to_string(&args.input)
        .await
        .map_err(ReplayError::from)?;
    let records = records::parse_lines(&contents)?;
    tracing::info!(input = %args.input.display(), records = records.len(), "Replaying recording");

    let (notifier, mut messages) = ChannelNotifier::new();
    let handle = spawn_assessor(OAuthClientAssessor::new(AssessorSettings::default()), notifier);
    let mut assembler = ExchangeAssembler::new();

    for record in records {
        match assembler.apply(record) {
            Ok(Some(event)) => {
                tracing::debug!(exchange = %event.exchange().id, "Delivering event");
                handle.send(event).map_err(ReplayError::from)?;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Skipping record"),
        }
    }

    let assessor = handle.shutdown().await.map_err(ReplayError::from)?;
    tracing::info!(
        tracked_flows = assessor.detector().len(),
        unfinished_exchanges = assembler.pending(),
        "Replay finished"
    );

    // The notifier went away with the service task, so this ends once drained.
    let mut delivered = 0;
    while let Some(message) = messages.recv().await {
        println!("{}\n{}\n", message.title, message.body);
        delivered += 1;
    }

    if delivered == 0 {
        println!("No vulnerabilities detected");
    }

    Ok(())
}
