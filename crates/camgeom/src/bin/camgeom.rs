//! camgeom CLI: inspect a camera description and move points between its
//! coordinate systems.

use camgeom::core::{Box2D, Box2I};
use camgeom::{Camera, CameraConfig, CameraSys, DetectorType, Point2, SysRef};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "camgeom")]
#[command(about = "Transform points between camera coordinate systems")]
#[command(version)]
struct Cli {
    /// Raise the log level (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON through `tracing`.
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a camera: detectors, boxes and coordinate systems.
    Describe {
        /// Camera description (JSON).
        config: PathBuf,
    },

    /// Transform one point and print the result as JSON.
    Transform {
        #[command(flatten)]
        point: PointArgs,

        /// Destination system, e.g. `Pupil`, `Pixels:A` or `Pixels:*`.
        #[arg(long)]
        to: SysRef,
    },

    /// Print the names of the detectors containing a point as JSON.
    Find {
        #[command(flatten)]
        point: PointArgs,
    },
}

#[derive(Debug, Clone, Args)]
struct PointArgs {
    /// Camera description (JSON).
    config: PathBuf,

    #[arg(long, allow_hyphen_values = true)]
    x: f64,

    #[arg(long, allow_hyphen_values = true)]
    y: f64,

    /// System the point is given in, e.g. `FocalPlane` or `Pixels:A`.
    #[arg(long, default_value = "FocalPlane")]
    from: CameraSys,
}

#[derive(Serialize)]
struct CameraSummary<'a> {
    name: &'a str,
    native_sys: String,
    systems: Vec<String>,
    fp_bbox: Box2D,
    detectors: Vec<DetectorSummary<'a>>,
}

#[derive(Serialize)]
struct DetectorSummary<'a> {
    name: &'a str,
    id: i32,
    #[serde(rename = "type")]
    kind: DetectorType,
    bbox: Box2I,
    fp_center: Point2<f64>,
    systems: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    #[cfg(feature = "tracing")]
    {
        let _ = tracing_log::LogTracer::init();
        camgeom::core::init_tracing(cli.log_json);
        if cli.verbose > 0 {
            log::debug!("-v is ignored with tracing enabled; filter with RUST_LOG");
        }
    }
    #[cfg(not(feature = "tracing"))]
    {
        let level = match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        // A logger can only be installed once; a failure leaves logging off.
        let _ = camgeom::init_with_level(level);
    }
}

fn load_camera(path: &Path) -> CliResult<Camera> {
    let config = CameraConfig::load_json(path)?;
    let camera = config.build_camera()?;
    log::info!(
        "loaded camera {} with {} detectors from {}",
        camera.name(),
        camera.len(),
        path.display()
    );
    Ok(camera)
}

fn run(command: Commands) -> CliResult<()> {
    match command {
        Commands::Describe { config } => {
            let camera = load_camera(&config)?;
            print_json(&describe(&camera)?)
        }
        Commands::Transform { point, to } => {
            let camera = load_camera(&point.config)?;
            let p = camera.make_camera_point(Point2::new(point.x, point.y), point.from)?;
            let out = camera.transform(&p, to)?;
            print_json(&out)
        }
        Commands::Find { point } => {
            let camera = load_camera(&point.config)?;
            let p = camera.make_camera_point(Point2::new(point.x, point.y), point.from)?;
            let names: Vec<&str> = camera
                .find_detectors(&p)?
                .into_iter()
                .map(|d| d.name())
                .collect();
            print_json(&names)
        }
    }
}

fn describe(camera: &Camera) -> CliResult<CameraSummary<'_>> {
    let native = camera.native_sys().clone();
    let detectors = camera
        .iter()
        .map(|det| {
            Ok(DetectorSummary {
                name: det.name(),
                id: det.id(),
                kind: det.kind(),
                bbox: det.bbox(),
                fp_center: det.center(native.clone())?,
                systems: det
                    .transform_map()
                    .systems()
                    .map(ToString::to_string)
                    .collect(),
            })
        })
        .collect::<CliResult<Vec<_>>>()?;
    Ok(CameraSummary {
        name: camera.name(),
        native_sys: native.to_string(),
        systems: camera
            .transform_map()
            .systems()
            .map(ToString::to_string)
            .collect(),
        fp_bbox: camera.fp_bbox()?,
        detectors,
    })
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
