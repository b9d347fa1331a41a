//! Commandline argument parser using clap for rssi-viz

use clap::Parser;
use std::path::PathBuf;

/// Animates how close nearby devices are to each serial receiver
#[derive(Debug, Parser, Clone)]
#[clap(version, about)]
pub struct VizArgs {
    /// Serial ports to read from, one per receiver. When none are given the
    /// ports are discovered
    pub ports: Vec<PathBuf>,

    /// Only discovered ports whose name contains this are used
    #[arg(short, long, default_value = "usbserial")]
    pub filter: String,

    /// Baud rate of every receiver
    #[arg(short, long, default_value_t = 460800)]
    pub baud: u32,

    /// Serial read timeout, in milliseconds. Readers notice they should stop
    /// at least this often
    #[arg(short, long = "timeout-ms", default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: u64,

    /// Target frames per second
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: u32,

    /// Log the measured frame rate every this many frames
    #[arg(long = "report-every", default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
    pub report_every: u64,

    /// Use this many simulated receivers instead of serial ports
    #[arg(long, value_name = "RECEIVERS")]
    pub simulate: Option<usize>,

    /// Write logs here instead of stderr, which the visualization covers
    #[arg(short, long = "log-file")]
    pub log_file: Option<PathBuf>,
}
