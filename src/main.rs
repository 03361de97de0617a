use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use snapcam::slider::{SliderStyle, TextCanvas};
use snapcam::{
    EventBus, EventFilter, EventReceiver, FsImageStore, KeyboardInputHandler, LaunchParams,
    PositionSlider, Rect, ScreenEvent, ScreenHandle, ScreenResult, SimulatedCameraBuilder,
    SnapcamConfig, SnapcamEvent,
};

/// Pixels covered by one terminal cell when drawing the zoom slider
const SLIDER_CELL_SIZE: i32 = 16;

#[derive(Parser, Debug)]
#[command(name = "snapcam")]
#[command(about = "Camera capture screen with zoom slider, review and save")]
#[command(version)]
#[command(long_about = "Opens a camera preview, lets you zoom with a slider or the \
zoom buttons, captures a still on demand and asks you to accept or retake it. \
An accepted capture is written to the output path. The result is printed as JSON \
and reflected in the exit code (0 accepted, 1 canceled, 2 failed).")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "snapcam.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Where an accepted capture is written
    #[arg(short, long, value_name = "PATH", help = "Output path for the accepted image")]
    output: Option<String>,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without opening the camera")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Behave as if no camera were present
    #[arg(long, help = "Simulate an unavailable camera")]
    no_camera: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config();
        return Ok(());
    }

    init_logging(&args)?;

    info!("Starting snapcam v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let config = match SnapcamConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if args.validate_config {
        match config.validate() {
            Ok(()) => {
                info!("Configuration validation successful");
                println!("✓ Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                error!("Configuration validation failed: {}", e);
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(ScreenResult::Failed.exit_code());
            }
        }
    }
    config.validate()?;

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| config.screen.output_path.clone());

    let mut camera = SimulatedCameraBuilder::new().config(config.camera.clone());
    if args.no_camera {
        camera = camera.unavailable();
    }
    let provider = camera.build().map_err(|e| {
        error!("Failed to set up camera: {}", e);
        e
    })?;

    let event_bus = if args.debug {
        EventBus::with_debug_logging(config.system.event_bus_capacity)
    } else {
        EventBus::new(config.system.event_bus_capacity)
    };
    let notices = EventReceiver::new(
        event_bus.subscribe(),
        EventFilter::All,
        "terminal".to_string(),
    );
    tokio::spawn(report_notices(notices, config.clone()));

    let handle = ScreenHandle::spawn(
        &config,
        LaunchParams::new(&output_path),
        &provider,
        Arc::new(FsImageStore::new().with_parent_dirs()),
        event_bus,
    );

    let keyboard = match handle.mailbox() {
        Some(mailbox) => {
            let ctrl_c_mailbox = mailbox.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupt received, canceling capture");
                    let _ = ctrl_c_mailbox.post(ScreenEvent::Cancel);
                }
            });

            let keyboard = KeyboardInputHandler::new(mailbox);
            keyboard.start().await?;
            Some(keyboard)
        }
        None => None,
    };

    let result = handle.wait().await;

    if let Some(keyboard) = keyboard {
        keyboard.stop().await?;
    }

    info!("Capture screen finished: {}", result);
    let report = serde_json::json!({
        "result": result,
        "output_path": output_path,
    });
    println!("{}", serde_json::to_string(&report)?);

    std::process::exit(result.exit_code());
}

/// Log screen notices and draw the zoom slider whenever it moves
async fn report_notices(mut notices: EventReceiver, config: SnapcamConfig) {
    let bounds = Rect::from_size(config.slider.bounds.0, config.slider.bounds.1);
    let mut slider = PositionSlider::new(config.slider.orientation, bounds)
        .with_style(SliderStyle::from_config(&config.slider));

    loop {
        match notices.recv().await {
            Ok(SnapcamEvent::SliderMoved { position }) => {
                slider.set_position(position);
                let mut canvas = TextCanvas::for_bounds(bounds, SLIDER_CELL_SIZE);
                slider.render(&mut canvas);
                // Raw mode needs explicit carriage returns
                eprint!("{}\r\n", canvas.lines().join("\r\n"));
            }
            Ok(SnapcamEvent::ScreenClosed { result }) => {
                debug!("Screen closed with {}", result);
                break;
            }
            Ok(notice) => eprint!("{}\r\n", notice.description()),
            Err(e) => {
                warn!("Stopped reporting screen notices: {}", e);
                break;
            }
        }
    }
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("snapcam={}", log_level)));

    // Logs share the terminal with the result JSON on stdout
    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    Ok(())
}

/// Print default configuration in TOML format
fn print_default_config() {
    println!("# Snapcam Configuration File");
    println!("# This is the default configuration with all available options");
    println!("# Any value can be overridden from the environment, e.g. SNAPCAM_CAMERA__MAX_ZOOM=10");
    println!();

    let default_config = r#"[camera]
# Camera device index (e.g., 0 for the back camera)
index = 0
# Capture resolution (width, height)
resolution = [640, 480]
# Still image served by the simulated camera (optional); a placeholder JPEG is used otherwise
# still_image = "./still.jpg"
# Simulated autofocus duration in milliseconds
autofocus_delay_ms = 150
# Simulated shutter duration in milliseconds
capture_delay_ms = 100
# Highest zoom level the camera reports (0 disables zoom)
max_zoom = 30

[slider]
# Axis the zoom slider runs along: "Vertical" or "Horizontal"
orientation = "Vertical"
# Slider widget bounds in pixels (width, height)
bounds = [48, 320]
# Indicator size in pixels (width, height)
indicator_size = [48, 48]
# Track thickness in pixels (0 uses the built-in default)
track_thickness = 10

[screen]
# Where an accepted capture is written when --output is not given
output_path = "./capture.jpg"
# Display rotation (optional): "Rotate90", "Rotate180", "Rotate270"
# rotation = "Rotate90"

[system]
# Event bus capacity
event_bus_capacity = 64
"#;

    println!("{}", default_config);
}
