use clap::Parser;
use serialport::SerialPort;
use tracing::info;

use attitude_scope::app::ScopeApp;
use attitude_scope::config::Config;
use attitude_scope::telemetry::TelemetryLink;

/// Live 3D attitude view of a `roll,pitch,height` serial telemetry stream.
#[derive(Debug, clap::Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Serial device to read from, e.g. /dev/ttyUSB0. Overrides the config
    /// file.
    device: Option<String>,

    /// Baud rate of the serial line.
    #[clap(long)]
    baud: Option<u32>,

    /// Display multiplier for the reported height.
    #[clap(long)]
    height_scale: Option<f32>,

    /// TOML config file carrying the same settings.
    #[clap(long)]
    config: Option<std::path::PathBuf>,
}

fn main() {
    // Log to stderr (run with `RUST_LOG=debug` for config details).
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let (link, height_scale) = match open_link(&args) {
        Ok(up) => up,
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    };

    let native_options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(900.0, 900.0)),
        multisampling: 8,
        ..Default::default()
    };
    eframe::run_native(
        "attitude-scope",
        native_options,
        Box::new(move |_cc| Box::new(ScopeApp::new(link, height_scale))),
    );
}

/// Fatal startup path: any error here is printed once and the process exits
/// non-zero, with no retry.
fn open_link(args: &Args) -> anyhow::Result<(TelemetryLink<Box<dyn SerialPort>>, f32)> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(device) = &args.device {
        config.device = Some(device.clone());
    }
    if let Some(baud) = args.baud {
        config.baud = baud;
    }
    if let Some(scale) = args.height_scale {
        config.height_scale = scale;
    }
    tracing::debug!(?config, "resolved configuration");

    let device = config
        .device
        .ok_or_else(|| anyhow::anyhow!("no serial device given (argument or config file)"))?;

    let link = TelemetryLink::open(&device, config.baud)?;
    info!(device = %device, baud = config.baud, "telemetry link up");
    Ok((link, config.height_scale))
}
