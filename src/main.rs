//! SX Capture CLI
//!
//! Captures frames from the mock camera into JPEG previews and FITS
//! archives, and inspects existing archives.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use sx_capture::{
    archive::{read_container, CardValue},
    capture::{CameraDriver, FileConfig, MockCamera},
    orchestrator::{CaptureRequest, CaptureRunner, RunError},
    pipeline::FramePipeline,
};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "sx-capture", version, about = "CCD frame capture and FITS archival")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one capture sequence.
    Capture(RunArgs),
    /// Repeat the capture sequence on a fixed period until interrupted.
    Watch {
        /// Seconds between the starts of consecutive runs.
        #[arg(long)]
        every: f64,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Print the header and pixel range of an archive file.
    Inspect {
        /// Path to a .fits file.
        file: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Exposure time in seconds.
    #[arg(short, long)]
    exposure: Option<f64>,
    /// Frames per run.
    #[arg(short = 'n', long)]
    count: Option<u32>,
    /// Seconds between frames.
    #[arg(short, long)]
    interval: Option<f64>,
    /// Output directory.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// JPEG quality (1-100).
    #[arg(short, long)]
    quality: Option<u8>,
    /// Disable the contrast stretch for previews.
    #[arg(long)]
    no_stretch: bool,
    /// Print Prometheus metrics when finished.
    #[arg(long)]
    print_metrics: bool,
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    info!("SX Capture v{}", sx_capture::VERSION);

    let result = match cli.command {
        Command::Inspect { file } => inspect(&file),
        Command::Capture(args) => {
            load_config(cli.config, &args).and_then(|c| run(c, &args, None))
        }
        Command::Watch { every, run: args } => match Duration::try_from_secs_f64(every) {
            Ok(period) if !period.is_zero() => {
                load_config(cli.config, &args).and_then(|c| run(c, &args, Some(period)))
            }
            _ => Err(format!("--every {every} is not a usable number of seconds").into()),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn load_config(path: Option<PathBuf>, args: &RunArgs) -> CliResult<FileConfig> {
    let mut config = match path {
        Some(path) => FileConfig::from_file(&path)?,
        None => FileConfig::default(),
    };

    if let Some(exposure) = args.exposure {
        config.capture.exposure_seconds = exposure;
    }
    if let Some(count) = args.count {
        config.capture.count = count;
    }
    if let Some(interval) = args.interval {
        config.capture.interval_seconds = interval;
    }
    if let Some(ref output) = args.output {
        config.output.directory = output.clone();
    }
    if let Some(quality) = args.quality {
        config.output.jpeg_quality = quality;
    }
    if args.no_stretch {
        config.output.stretch = false;
    }

    config.capture.validate()?;
    config.output.validate()?;
    Ok(config)
}

fn run(config: FileConfig, args: &RunArgs, every: Option<Duration>) -> CliResult<()> {
    let mut camera = MockCamera::new();
    if let Err(e) = camera.open(&config.capture) {
        return Err(format!(
            "failed to open camera: {} ({})",
            e,
            camera.last_error().unwrap_or("no details")
        )
        .into());
    }
    if let Ok(info) = camera.info() {
        info!(
            model = %info.model,
            firmware = %info.firmware_version,
            "Camera connected"
        );
    }

    let request = CaptureRequest::try_from(&config.capture)?;
    let pipeline = FramePipeline::new(config.output, config.archive);
    let runner = CaptureRunner::new(camera, pipeline)?;

    let cancel = runner.cancel_flag();
    ctrlc::set_handler(move || {
        warn!("Interrupt received; stopping after the current frame");
        cancel.store(true, Ordering::SeqCst);
    })?;

    let outcome = loop {
        let started = Instant::now();
        match runner.execute(&request) {
            Ok(summary) => {
                for record in &summary.records {
                    println!(
                        "{}\t{}\t{}\t{}",
                        record.epoch, record.readable, record.jpeg, record.fits
                    );
                }
            }
            Err(RunError::Cancelled { completed }) => {
                info!(completed, "Run cancelled");
                break Ok(());
            }
            Err(RunError::AlreadyRunning) => warn!("Previous run still active; skipping"),
            Err(e) => break Err(e.into()),
        }

        let Some(period) = every else { break Ok(()) };
        while started.elapsed() < period && !runner.is_cancelled() {
            std::thread::sleep(Duration::from_millis(100).min(period));
        }
        if runner.is_cancelled() {
            break Ok(());
        }
    };

    if args.print_metrics {
        print!("{}", runner.metrics().encode()?);
    }

    let mut camera = runner.into_camera();
    camera.close();
    outcome
}

fn inspect(file: &Path) -> CliResult<()> {
    let bytes = std::fs::read(file)?;
    let parsed = read_container(&bytes)?;

    for card in &parsed.cards {
        match card.value() {
            Some(CardValue::Text(text)) => {
                println!("{:<8} = '{}'", card.keyword(), text.trim_end())
            }
            Some(CardValue::Logical(b)) => {
                println!("{:<8} = {}", card.keyword(), if *b { "T" } else { "F" })
            }
            Some(CardValue::Integer(i)) => println!("{:<8} = {}", card.keyword(), i),
            Some(CardValue::Real(r)) => println!("{:<8} = {}", card.keyword(), r),
            None => println!("{}", card.keyword()),
        }
    }

    let (min, max) = parsed
        .pixels
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &p| (lo.min(p), hi.max(p)));
    println!(
        "{}x{} pixels, header {} bytes, range {} .. {}",
        parsed.width, parsed.height, parsed.header_len, min, max
    );
    Ok(())
}
