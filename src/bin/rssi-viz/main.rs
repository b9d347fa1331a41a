//! Reads every receiver and animates the readings until the view is closed.

use clap::Parser;
use rssi_viz::{
    args::VizArgs,
    discovery::{discover_ports, open_all},
    gui::{run_frame_loop, FrameLoopConfig},
    port_reader::{CancelToken, PortReader},
    reading_store::ReadingStore,
    simulator::SimulatedPort,
};

use log::{info, warn};
use std::{
    error::Error,
    fs::File,
    io::Read,
    process::ExitCode,
    sync::Arc,
    time::Duration,
};

/// Fake devices each simulated receiver reports on.
const SIMULATED_DEVICES: usize = 5;

// Example:
// cargo run --bin rssi-viz -- --log-file viz.log
// cargo run --bin rssi-viz -- /dev/cu.usbserial-0001 /dev/cu.usbserial-0002
// cargo run --bin rssi-viz -- --simulate 3

fn init_logging(args: &VizArgs) -> std::io::Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(path) = &args.log_file {
        builder.target(env_logger::Target::Pipe(Box::new(File::create(path)?)));
    }
    builder.init();
    Ok(())
}

/// One boxed source per receiver, in receiver index order.
fn open_sources(args: &VizArgs) -> Result<Vec<Box<dyn Read + Send>>, Box<dyn Error>> {
    let timeout = Duration::from_millis(args.timeout_ms);

    if let Some(count) = args.simulate {
        let ids = SimulatedPort::device_ids(rand::random(), SIMULATED_DEVICES);
        return Ok((0..count)
            .map(|i| {
                // stagger the rates so receivers do not update in lockstep
                let interval = Duration::from_millis(20 * (i as u64 + 1));
                let port = SimulatedPort::new(rand::random(), &ids, interval, timeout);
                Box::new(port) as Box<dyn Read + Send>
            })
            .collect());
    }

    let paths = if args.ports.is_empty() {
        discover_ports(&args.filter)?
    } else {
        args.ports.clone()
    };
    info!("Receivers: {:?}", paths);

    Ok(open_all(&paths, args.baud, timeout)?
        .into_iter()
        .map(|port| Box::new(port) as Box<dyn Read + Send>)
        .collect())
}

fn run(args: VizArgs, sources: Vec<Box<dyn Read + Send>>) -> Result<(), Box<dyn Error>> {
    let store = Arc::new(ReadingStore::new());
    let cancel = CancelToken::new();
    let receiver_count = sources.len();

    for (index, source) in sources.into_iter().enumerate() {
        // readers are never joined, closing the view only asks them to stop
        let spawned = PortReader::new(index, source, Arc::clone(&store), cancel.clone()).spawn();
        if let Err(e) = spawned {
            cancel.cancel();
            return Err(e.into());
        }
    }

    let res = run_frame_loop(
        &store,
        receiver_count,
        FrameLoopConfig {
            fps: args.fps,
            report_every: args.report_every,
        },
    );
    cancel.cancel();
    Ok(res?)
}

fn main() -> ExitCode {
    let args = VizArgs::parse();
    if let Err(e) = init_logging(&args) {
        eprintln!("Failed to open log file: {e}");
        return ExitCode::FAILURE;
    }

    let sources = match open_sources(&args) {
        Ok(sources) => sources,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if sources.is_empty() {
        eprintln!("No USB serial connections detected.");
        return ExitCode::FAILURE;
    }

    match run(args, sources) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            warn!("Exiting after error: {e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
