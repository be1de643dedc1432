//! surfacescan CLI — offline runs of the surface detectors.

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use surfacescan::{
    render_overlay, Acceleration, DetectConfig, DetectorInput, DetectorKind, DetectorOutput,
    MenuCatalog, MotionReport, MotionSample, OrientationSample, SurfaceDetector,
    VisionDetection,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "surfacescan")]
#[command(about = "Run AR surface detectors on recorded frames and sensor logs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one vision detection pass on an image.
    ScanImage(ScanImageArgs),

    /// Replay a recorded motion/orientation log through the motion detector.
    ReplayMotion(ReplayMotionArgs),

    /// Print the default detector configuration.
    ConfigInfo {
        /// Detector variant to select in the printed config.
        #[arg(long, value_enum, default_value_t = KindArg::Motion)]
        kind: KindArg,
    },

    /// Print the menu catalog.
    MenuInfo {
        /// Menu JSON (`surfacescan.menu.v1`); the embedded menu when omitted.
        #[arg(long)]
        menu: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Motion,
    Vision,
    Native,
}

impl From<KindArg> for DetectorKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Motion => DetectorKind::MotionHeuristic,
            KindArg::Vision => DetectorKind::VisionHeuristic,
            KindArg::Native => DetectorKind::NativePlatform,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct ScanImageArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Detector configuration JSON; defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to write the detection result (JSON). Printed to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Path to write the frame with points and cluster bounds drawn on it (PNG).
    #[arg(long)]
    overlay: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct ReplayMotionArgs {
    /// Event log: JSON array of `motion`, `orientation` and `tick` events.
    #[arg(long)]
    input: PathBuf,

    /// Detector configuration JSON; defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to write the replay report (JSON). Printed to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

/// One recorded sensor or timer event.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ReplayEvent {
    Motion {
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
        #[serde(default)]
        z: Option<f64>,
        timestamp_ms: u64,
    },
    Orientation {
        #[serde(default)]
        alpha: Option<f64>,
        #[serde(default)]
        beta: Option<f64>,
        #[serde(default)]
        gamma: Option<f64>,
        timestamp_ms: u64,
    },
    Tick {
        now_ms: u64,
    },
}

impl ReplayEvent {
    fn timestamp_ms(&self) -> u64 {
        match self {
            Self::Motion { timestamp_ms, .. } | Self::Orientation { timestamp_ms, .. } => {
                *timestamp_ms
            }
            Self::Tick { now_ms } => *now_ms,
        }
    }
}

#[derive(Debug, Serialize)]
struct ScanReport {
    image: String,
    surface_detected: bool,
    detection: VisionDetection,
}

#[derive(Debug, Serialize)]
struct Transition {
    event_index: usize,
    timestamp_ms: u64,
    surface_detected: bool,
    confidence: f32,
}

#[derive(Debug, Serialize)]
struct ReplayReport {
    n_events: usize,
    transitions: Vec<Transition>,
    output: DetectorOutput,
    motion: Option<MotionReport>,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ScanImage(args) => run_scan_image(&args),
        Commands::ReplayMotion(args) => run_replay_motion(&args),
        Commands::ConfigInfo { kind } => run_config_info(kind.into()),
        Commands::MenuInfo { menu } => run_menu_info(menu.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<DetectConfig> {
    match path {
        Some(path) => {
            tracing::info!("Loading config: {}", path.display());
            DetectConfig::from_json_file(path).map_err(|e| -> CliError {
                format!("Failed to load config {}: {}", path.display(), e).into()
            })
        }
        None => Ok(DetectConfig::default()),
    }
}

fn write_or_print(out: Option<&Path>, json: &str) -> CliResult<()> {
    match out {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!("Results written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_scan_image(args: &ScanImageArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    tracing::info!("Loading image: {}", args.image.display());

    let img = image::open(&args.image).map_err(|e| -> CliError {
        format!("Failed to open image {}: {}", args.image.display(), e).into()
    })?;
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    tracing::info!("Image size: {}x{}", w, h);

    let detection = VisionDetection::detect(&rgba, &config.vision, 0);
    let surface_detected = detection.confidence > config.vision.enable_threshold;
    let n_boundaries = detection
        .boundary_clusters(config.vision.cluster_min_members)
        .count();
    tracing::info!(
        "Found {} surface points in {} clusters ({} boundaries), confidence={:.3}, placement {}",
        detection.points.len(),
        detection.clusters.len(),
        n_boundaries,
        detection.confidence,
        if surface_detected { "enabled" } else { "disabled" }
    );

    if let Some(overlay_path) = &args.overlay {
        let overlay = render_overlay(&rgba, &detection, config.vision.cluster_min_members);
        overlay.save(overlay_path)?;
        tracing::info!("Overlay written to {}", overlay_path.display());
    }

    let report = ScanReport {
        image: args.image.display().to_string(),
        surface_detected,
        detection,
    };
    let json = serde_json::to_string_pretty(&report)?;
    write_or_print(args.out.as_deref(), &json)
}

fn run_replay_motion(args: &ReplayMotionArgs) -> CliResult<()> {
    let mut config = load_config(args.config.as_deref())?;
    if config.kind != DetectorKind::MotionHeuristic {
        tracing::warn!(
            "config selects {:?}; replaying with the motion heuristic",
            config.kind
        );
        config.kind = DetectorKind::MotionHeuristic;
    }

    let data = std::fs::read_to_string(&args.input).map_err(|e| -> CliError {
        format!("Failed to read event log {}: {}", args.input.display(), e).into()
    })?;
    let events: Vec<ReplayEvent> = serde_json::from_str(&data)?;
    tracing::info!("Replaying {} events", events.len());

    let mut detector = SurfaceDetector::new(&config);
    let mut detected = false;
    let mut transitions = Vec::new();
    for (i, event) in events.iter().enumerate() {
        let input = match *event {
            ReplayEvent::Motion {
                x,
                y,
                z,
                timestamp_ms,
            } => DetectorInput::Motion(MotionSample {
                acceleration: Acceleration { x, y, z },
                timestamp_ms,
            }),
            ReplayEvent::Orientation {
                alpha,
                beta,
                gamma,
                timestamp_ms,
            } => DetectorInput::Orientation(OrientationSample {
                alpha,
                beta,
                gamma,
                timestamp_ms,
            }),
            ReplayEvent::Tick { now_ms } => DetectorInput::Tick { now_ms },
        };
        let out = detector.ingest(input);
        if out.surface_detected != detected {
            detected = out.surface_detected;
            tracing::info!(
                "t={}ms: surface {}",
                event.timestamp_ms(),
                if detected { "detected" } else { "lost" }
            );
            transitions.push(Transition {
                event_index: i,
                timestamp_ms: event.timestamp_ms(),
                surface_detected: detected,
                confidence: out.confidence,
            });
        }
    }

    let motion = match &detector {
        SurfaceDetector::MotionHeuristic(det) => Some(det.report()),
        _ => None,
    };
    let report = ReplayReport {
        n_events: events.len(),
        transitions,
        output: detector.output(),
        motion,
    };
    let json = serde_json::to_string_pretty(&report)?;
    write_or_print(args.out.as_deref(), &json)
}

fn run_config_info(kind: DetectorKind) -> CliResult<()> {
    let config = DetectConfig::for_kind(kind);
    println!("{}", config.to_json_pretty()?);
    Ok(())
}

fn run_menu_info(path: Option<&Path>) -> CliResult<()> {
    let menu = match path {
        Some(path) => MenuCatalog::from_json_file(path).map_err(|e| -> CliError {
            format!("Failed to load menu {}: {}", path.display(), e).into()
        })?,
        None => MenuCatalog::default(),
    };

    println!("surfacescan menu '{}'", menu.name);
    println!("  Items:      {}", menu.len());
    println!("  Categories: {}", menu.categories().join(", "));
    for item in menu.items() {
        println!(
            "  {:<20} {:<24} {:>4}.{:02}  scale={:.2}",
            item.id,
            item.name,
            item.price_cents / 100,
            item.price_cents % 100,
            item.scale
        );
    }
    Ok(())
}
