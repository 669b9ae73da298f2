//! Automation driver: publish one finalized event to a set of relays and
//! enforce a minimum-success quorum.

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use fanout_publisher::{FanoutPublisher, Message, WsTransport};
use relay_input::normalize;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(
    name = "publisher-cli",
    about = "Publish a finalized Nostr event to a set of relays"
)]
struct Args {
    /// Relay list: a JSON array of URLs or a comma-separated list
    #[arg(long)]
    relays: String,

    /// Whole-batch deadline in milliseconds
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,

    /// Minimum number of relays that must accept the event
    #[arg(long, default_value_t = 1)]
    min_successful: usize,

    /// Path to the finalized event JSON, or `-` for stdin
    #[arg(long, default_value = "-")]
    event: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let relays = normalize(&args.relays);
    if relays.is_empty() {
        bail!("no relay addresses found in {:?}", args.relays);
    }

    let raw = if args.event == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading event from stdin")?;
        buf
    } else {
        std::fs::read_to_string(&args.event)
            .with_context(|| format!("reading event file {}", args.event))?
    };
    let message = Message::new(serde_json::from_str(&raw).context("event is not valid JSON")?);

    info!(
        "Publishing to {} relays with a {}ms budget",
        relays.len(),
        args.timeout_ms
    );

    let publisher = FanoutPublisher::new(Arc::new(WsTransport::new()));
    let report = publisher
        .publish_report(&message, &relays, Duration::from_millis(args.timeout_ms))
        .await;

    for outcome in report.outcomes() {
        match &outcome.error {
            None => info!("{}: accepted", outcome.relay),
            Some(reason) => warn!("{}: {}", outcome.relay, reason),
        }
    }
    info!(
        "{}/{} relays accepted the event",
        report.success_count(),
        report.total_relays()
    );

    report.require(args.min_successful)?;
    Ok(())
}
