use std::{
    fs,
    io::IsTerminal,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand, ValueEnum};
use rand::{rngs::SmallRng, SeedableRng};
use string_loom::{
    run,
    verboser::{Message, Verboser},
    Approximation, Distribution, Driver, InnerRing, PegTable, RandomWinding, RgbaBuffer,
    RunConfig, Shape, StartPeg, Status,
};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

mod preprocess;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// JSON run configuration. Flags below override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output path without extension; `.png`, `.svg` and `.txt` files are written next to it.
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Number of pegs on the outer ring.
    #[arg(short, long, global = true)]
    pegs: Option<usize>,

    #[arg(long, global = true)]
    shape: Option<ShapeArg>,

    #[arg(long, global = true)]
    distribution: Option<DistributionArg>,

    /// Adds an inner ring this percentage of the outer one.
    #[arg(long, global = true, value_parser = clap::value_parser!(u8).range(0..=100))]
    inner_size: Option<u8>,

    #[arg(long, global = true)]
    inner_shape: Option<ShapeArg>,

    #[arg(long, global = true)]
    inner_distribution: Option<DistributionArg>,

    /// Allow chords between two inner pegs.
    #[arg(long, global = true)]
    connect_inner: bool,

    /// Side of the square canvas in pixels.
    #[arg(short, long, global = true)]
    size: Option<usize>,

    /// Number of chords to wind.
    #[arg(long, global = true)]
    steps: Option<usize>,

    /// 1 is the slowest, 100 the fastest.
    #[arg(long, global = true)]
    speed: Option<u8>,

    /// Seed for a repeatable run.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Stroke width of the chords in the svg output.
    #[arg(long, global = true, default_value_t = 0.5)]
    thickness: f32,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decorative winding between random pegs.
    Random,
    /// Greedy approximation of an image.
    Approximate {
        /// Image to approximate.
        input: PathBuf,

        /// Start from a random peg instead of the first one.
        #[arg(long)]
        random_start: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ShapeArg {
    Circle,
    Square,
    Triangle,
    Harmonic,
}

impl From<ShapeArg> for Shape {
    fn from(value: ShapeArg) -> Self {
        match value {
            ShapeArg::Circle => Shape::Circle,
            ShapeArg::Square => Shape::Square,
            ShapeArg::Triangle => Shape::Triangle,
            ShapeArg::Harmonic => Shape::Harmonic,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DistributionArg {
    Uniform,
    Random,
    Fibonacci,
    Overtones,
}

impl From<DistributionArg> for Distribution {
    fn from(value: DistributionArg) -> Self {
        match value {
            DistributionArg::Uniform => Distribution::Uniform,
            DistributionArg::Random => Distribution::Random,
            DistributionArg::Fibonacci => Distribution::Fibonacci,
            DistributionArg::Overtones => Distribution::Overtones,
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Run(#[from] string_loom::Error),
    #[error("canvas size {0} is too large")]
    CanvasSize(usize),
}

/// Logs progress every tenth of the run.
#[derive(Default)]
struct LogVerboser {
    next: f64,
}

impl Verboser for LogVerboser {
    fn verbose(&mut self, message: Message) {
        match message {
            Message::CreatingPegs(count) => info!(count, "pegs placed"),
            Message::Progress(pct) if pct >= self.next => {
                info!("{pct:.0}%");
                self.next = (pct / 10.0).floor() * 10.0 + 10.0;
            }
            Message::Progress(_) => {}
            Message::Finished(status) => info!(%status, "done"),
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    match try_main(Args::parse()) {
        Ok(Status::Completed) => ExitCode::SUCCESS,
        Ok(Status::Canceled) => ExitCode::from(2),
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);
    Registry::default().with(filter).with(fmt_layer).init();
}

fn try_main(args: Args) -> Result<Status, CliError> {
    let mut config = run_config(&args)?;
    if config.speed == 0 {
        warn!("speed 0 would pause the run forever, using 1");
        config.speed = 1;
    }
    let mut rng = match args.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let mut verboser = LogVerboser::default();
    let table: PegTable = config.peg_table(&mut rng, &mut verboser);
    let mut canvas = RgbaBuffer::black(config.grid());
    let control = config.control();

    let (status, stem) = match &args.command {
        Command::Random => {
            let mut driver = RandomWinding::new(&table, rng);
            let status = run(&mut driver, &mut canvas, config.steps, &control, &mut verboser)?;
            let stem = output_stem(&args, None);
            save(&stem, &canvas, &driver, &table, &config, args.thickness)?;
            (status, stem)
        }
        Command::Approximate { input, .. } => {
            let size = u32::try_from(config.canvas_size)
                .map_err(|_| CliError::CanvasSize(config.canvas_size))?;
            let target = preprocess::load_target(input, size)?;
            let mut driver = Approximation::new(&table, &target, rng, config.start);
            let status = run(&mut driver, &mut canvas, config.steps, &control, &mut verboser)?;
            let stem = output_stem(&args, Some(input.as_path()));
            save(&stem, &canvas, &driver, &table, &config, args.thickness)?;
            (status, stem)
        }
    };
    info!(output = %stem.display(), "files written");
    Ok(status)
}

/// Config file first, then every flag that was given.
fn run_config(args: &Args) -> Result<RunConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|source| CliError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&raw).map_err(|source| CliError::Config {
                path: path.clone(),
                source,
            })?
        }
        None => RunConfig::default(),
    };

    if let Some(pegs) = args.pegs {
        config.table.pegs = pegs;
    }
    if let Some(shape) = args.shape {
        config.table.shape = shape.into();
    }
    if let Some(distribution) = args.distribution {
        config.table.distribution = distribution.into();
    }
    let wants_inner = args.inner_size.is_some()
        || args.inner_shape.is_some()
        || args.inner_distribution.is_some()
        || args.connect_inner;
    if wants_inner {
        let inner = config.table.inner.get_or_insert_with(InnerRing::default);
        if let Some(size) = args.inner_size {
            inner.size = size;
        }
        if let Some(shape) = args.inner_shape {
            inner.shape = shape.into();
        }
        if let Some(distribution) = args.inner_distribution {
            inner.distribution = distribution.into();
        }
        inner.connect_inner |= args.connect_inner;
    }
    if let Some(size) = args.size {
        config.canvas_size = size;
    }
    if let Some(steps) = args.steps {
        config.steps = steps;
    }
    if let Some(speed) = args.speed {
        config.speed = speed;
    }
    if let Command::Approximate {
        random_start: true, ..
    } = args.command
    {
        config.start = StartPeg::Random;
    }
    Ok(config)
}

fn output_stem(args: &Args, input: Option<&Path>) -> PathBuf {
    match (&args.output, input) {
        (Some(output), _) => output.clone(),
        (None, Some(input)) => {
            let name = input
                .file_stem()
                .map(|stem| format!("{}_string", stem.to_string_lossy()))
                .unwrap_or_else(|| String::from("string_loom"));
            input.with_file_name(name)
        }
        (None, None) => PathBuf::from("string_loom"),
    }
}

fn save<D: Driver<Scalar = f64>>(
    stem: &Path,
    canvas: &RgbaBuffer,
    driver: &D,
    table: &PegTable,
    config: &RunConfig,
    thickness: f32,
) -> Result<(), CliError> {
    if let Some(parent) = stem.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| CliError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    canvas.to_image().save(stem.with_extension("png"))?;

    let svg_path = stem.with_extension("svg");
    let document = driver
        .winding()
        .build_svg(table, config.canvas_size, thickness);
    svg::save(&svg_path, &document).map_err(|source| CliError::Io {
        path: svg_path.clone(),
        source,
    })?;

    let txt_path = stem.with_extension("txt");
    fs::write(&txt_path, driver.winding().build_instructions()).map_err(|source| {
        CliError::Io {
            path: txt_path.clone(),
            source,
        }
    })?;
    Ok(())
}
