mod cli;
mod report;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use mediactl_player::{
    DataSource, EventStream, FrameSize, PlayerController, PlayerEvent, PlayerRegistry,
    SimulatedBridge, SimulatedMedia,
};
use tokio::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, SourceArg};
use report::{Outcome, ValueReport, describe_event};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let source = build_source(&cli);
    let media = SimulatedMedia::new(
        Duration::from_millis(cli.duration_ms),
        FrameSize::new(cli.width, cli.height),
    );
    let bridge = Arc::new(
        SimulatedBridge::new(PlayerRegistry::global().event_sink())
            .with_auto_events(true)
            .with_call_log_limit(0)
            .with_media(source.uri(), media),
    );
    let controller = PlayerController::new(source, bridge).context("create player")?;
    let mut events = controller.events();

    controller.set_looping(cli.looping).await?;
    controller
        .initialize()
        .await
        .context("initialize player")?;

    let outcome = if controller.value().is_initialized {
        configure(&controller, &cli).await?;
        controller.play().await.context("start playback")?;
        watch_events(&mut events, cli.looping, Duration::from_millis(cli.run_ms)).await
    } else {
        // The failed open still produced an `Initialized` event.
        drain_events(&mut events);
        Outcome::Failed
    };

    let value = controller.snapshot().await?;
    controller.dispose().await.context("dispose player")?;

    if cli.json {
        let report = ValueReport::new(outcome, &value);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{:?}: position {} ms of {} ms",
            outcome,
            value.position.as_millis(),
            value.duration.as_millis()
        );
    }

    if outcome == Outcome::Failed {
        bail!(
            "playback failed: {}",
            value
                .error_description
                .as_deref()
                .unwrap_or("unknown error")
        );
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_source(cli: &Cli) -> DataSource {
    match cli.kind {
        SourceArg::Network => DataSource::network(cli.uri.clone()).with_headers(cli.headers.clone()),
        SourceArg::File => {
            if !cli.headers.is_empty() {
                warn!("headers are ignored for file sources");
            }
            DataSource::file(&cli.uri)
        },
    }
}

async fn configure(controller: &PlayerController, cli: &Cli) -> Result<()> {
    if let Some(volume) = cli.volume {
        controller.set_volume(volume).await.context("set volume")?;
    }
    if let Some(speed) = cli.speed {
        controller
            .set_playback_speed(speed)
            .await
            .context("set playback speed")?;
    }
    if let Some(start_ms) = cli.start_ms {
        controller
            .seek_to(Duration::from_millis(start_ms))
            .await
            .context("seek to start position")?;
    }
    Ok(())
}

async fn watch_events(events: &mut EventStream, looping: bool, run_for: Duration) -> Outcome {
    let deadline = Instant::now() + run_for;
    loop {
        match tokio::time::timeout_at(deadline, events.next()).await {
            Ok(Some(Ok(event))) => {
                println!("{}", describe_event(&event));
                if event == PlayerEvent::Completed && !looping {
                    return Outcome::Completed;
                }
            },
            Ok(Some(Err(error))) => {
                println!("error: {error}");
                return Outcome::Failed;
            },
            Ok(None) => return Outcome::Closed,
            Err(_) => {
                info!(run_ms = run_for.as_millis() as u64, "run time elapsed");
                return Outcome::TimedOut;
            },
        }
    }
}

fn drain_events(events: &mut EventStream) {
    while let Some(item) = events.try_next() {
        match item {
            Ok(event) => println!("{}", describe_event(&event)),
            Err(error) => println!("error: {error}"),
        }
    }
}
