/// pixnn Studio
///
/// Browser front-end for the live trainer: the page shows the network's
/// output over the unit square, clicks add labelled points, and a background
/// worker keeps training while you draw.
///
/// Run with:
///   RUST_LOG=info cargo run --bin studio --release -- --layers 32,16
/// Then open http://127.0.0.1:7878

mod handlers;
mod render;
mod routes;
mod state;
mod util;

use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use tiny_http::Server;

use pixnn::network::DEFAULT_LAYER_LIST;
use pixnn::{parse_layer_list, Dataset, NetworkSpec, NnError, Result, TrainConfig, TrainingController};

use state::StudioState;

#[derive(Debug, Parser)]
#[command(name = "studio", about = "Paint points and watch a network learn them")]
struct Args {
    #[arg(long, default_value = "127.0.0.1:7878")]
    addr: String,

    /// Hidden layer widths, separated by ',', ':' or ';'.
    #[arg(long, default_value = DEFAULT_LAYER_LIST)]
    layers: String,

    /// JSON network spec; overrides --layers.
    #[arg(long)]
    spec: Option<String>,

    /// JSON training config.
    #[arg(long)]
    config: Option<String>,

    /// Side of the rendered field in pixels.
    #[arg(long, default_value_t = 128)]
    resolution: usize,

    #[arg(long)]
    batch: Option<usize>,
}

fn main() {
    env_logger::init();
    if let Err(e) = run(Args::parse()) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let spec = match &args.spec {
        Some(path) => NetworkSpec::load_json(path)?,
        None => NetworkSpec::plane(&parse_layer_list(&args.layers)?),
    };
    spec.ensure_plane()?;
    let mut config = match &args.config {
        Some(path) => TrainConfig::load_json(path)?,
        None => TrainConfig::default(),
    };
    if let Some(batch) = args.batch {
        config.batch_size = batch;
    }

    let network = spec.build()?;
    let trainer = TrainingController::spawn(network, Dataset::new(), spec.activation, config)?;
    let shared_state = Arc::new(StudioState::new(trainer, spec.activation, args.resolution.max(1)));

    let server = Server::http(&args.addr)
        .map_err(|e| NnError::Io(std::io::Error::other(e.to_string())))?;
    info!("studio listening on http://{}", args.addr);

    // One thread per request so a slow frame render does not stall clicks.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
    Ok(())
}
