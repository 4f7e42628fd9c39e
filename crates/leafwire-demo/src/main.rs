//! leafwire demo binary.
//!
//! Builds a layer group holding a heatmap and a polyline, mutates them,
//! feeds one simulated renderer edit back in, and prints every outbound
//! comm message as a JSON line on stdout. Logs go to stderr.
//!
//! ```bash
//! leafwire-demo
//! leafwire-demo --config widgets.ron --points 5
//! RUST_LOG=leafwire_state=trace leafwire-demo
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use leafwire_comm::{ChannelTransport, CommMessage, Dispatcher};
use leafwire_state::{Envelope, Widget};
use leafwire_widgets::{Heatmap, WidgetConfig, WidgetFactory};
use serde_json::json;
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "leafwire-demo")]
#[command(about = "Mirror map widgets over a channel and print the comm traffic")]
struct Args {
    /// RON widget config (module names, versions, comm target)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Heatmap points to generate
    #[arg(long, default_value_t = 3)]
    points: usize,

    /// Print the effective config as RON and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => WidgetConfig::load(path)
            .with_context(|| format!("loading widget config from {}", path.display()))?,
        None => WidgetConfig::default(),
    };

    if args.print_config {
        println!("{}", config.to_ron_string()?);
        return Ok(());
    }

    // Widgets are !Send
    let local = tokio::task::LocalSet::new();
    local.run_until(run(config, args.points)).await
}

async fn run(config: WidgetConfig, points: usize) -> Result<()> {
    let (transport, out_rx) = ChannelTransport::channel(config.comm_target.clone());
    let writer = tokio::task::spawn_local(print_messages(out_rx));

    let factory = WidgetFactory::new(transport.clone(), config);
    let mut dispatcher = Dispatcher::default();

    let mut group = factory.layer_group();
    group.name.set("overlays".into());

    let heatmap = factory.create_shared::<Heatmap>(dispatcher.registry_mut());
    heatmap.borrow_mut().hold_sync(|h| {
        for i in 0..points {
            let step = i as f64 * 0.01;
            h.add_point([45.5 + step, -73.6 + step, 1.0 - step]);
        }
        h.radius.set(30.0);
    });
    let heat_id = group.add_shared_layer(&heatmap);

    let line_id = group.add_layer(factory.create_with(|line: &mut leafwire_widgets::Polyline| {
        line.locations.set(vec![[45.5, -73.6], [45.52, -73.58]]);
        line.color.set("#ff7800".into());
    }));
    tracing::info!(group = %group.id(), heatmap = %heat_id, polyline = %line_id, "widgets published");

    // One edit from the renderer side; it must not be echoed back.
    let (in_tx, in_rx) = mpsc::unbounded_channel();
    let edit = Envelope::from_json(json!({"blur": 10.0, "zoom_animation": true}), Vec::new())?;
    in_tx.send(CommMessage::update(heat_id, edit))?;
    drop(in_tx);
    let applied = tokio::task::spawn_local(async move { dispatcher.run(in_rx).await }).await?;
    tracing::info!(applied, blur = *heatmap.borrow().blur.get(), "renderer edit applied");

    group.remove_layer_id(line_id);
    group.clear_layers();

    drop(group);
    drop(heatmap);
    drop(factory);
    drop(transport);

    let printed = writer.await?;
    tracing::info!(printed, "all comms closed");
    Ok(())
}

/// Print each outbound message as one JSON line until every comm is gone.
async fn print_messages(mut rx: mpsc::UnboundedReceiver<CommMessage>) -> usize {
    let mut printed = 0;
    while let Some(message) = rx.recv().await {
        match message.to_json_string() {
            Ok(text) if message.buffers.is_empty() => println!("{text}"),
            Ok(text) => println!("{text} (+{} buffers)", message.buffers.len()),
            Err(err) => {
                tracing::warn!(comm = %message.comm_id, error = %err, "unprintable message");
                continue;
            }
        }
        printed += 1;
    }
    printed
}
