use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use likeplot::config::DEFAULT_CONFIG_FILE;
use likeplot::{runtime, ChartKind, Config, Dataset, InputFormat, OutputFormat};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "likeplot")]
#[command(about = "Render like-count charts from social-media post data", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Input file (CSV or JSON); reads stdin when omitted
    #[arg(short, long, global = true, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Input format; guessed from the input file extension when omitted
    #[arg(long, global = true, value_enum)]
    input_format: Option<InputFormat>,

    /// Output file; writes stdout when omitted
    #[arg(short, long, global = true, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Image format, overrides the config file
    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for likeplot.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Canvas width in pixels, overrides the config file
    #[arg(long, global = true, value_name = "PX")]
    width: Option<u32>,

    /// Canvas height in pixels, overrides the config file
    #[arg(long, global = true, value_name = "PX")]
    height: Option<u32>,

    /// Enable verbose logging output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Box plot of likes per platform
    Boxplot,
    /// Grouped bars of average likes per platform and post type
    Bar,
    /// Trend line of average likes per day
    Line,
    /// Print the aggregates as JSON
    Summary {
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Write a default likeplot.toml
    InitConfig,
}

impl Args {
    fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    fn input_format(&self) -> InputFormat {
        match (self.input_format, &self.input) {
            (Some(format), _) => format,
            (None, Some(path)) => InputFormat::from_path(path),
            (None, None) => InputFormat::Csv,
        }
    }

    /// Explicit `--format`, else the output file extension, else the config
    fn output_format(&self) -> Option<OutputFormat> {
        if self.format.is_some() {
            return self.format;
        }
        let ext = self.output.as_deref()?.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("png") {
            Some(OutputFormat::Png)
        } else if ext.eq_ignore_ascii_case("svg") {
            Some(OutputFormat::Svg)
        } else {
            None
        }
    }

    fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_or_default(self.config.as_deref())?;
        if let Some(format) = self.output_format() {
            config.canvas.format = format;
        }
        if let Some(width) = self.width {
            config.canvas.width = width;
        }
        if let Some(height) = self.height {
            config.canvas.height = height;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() {
    let args = Args::parse();
    init_logging(&args);

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Initialize logging on stderr; stdout carries the chart
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .finish();

    // A subscriber may already be installed when embedded
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run(args: &Args) -> Result<()> {
    let kind = match args.command {
        Command::InitConfig => return init_config(args.output.as_deref()),
        Command::Summary { pretty } => {
            let dataset = read_dataset(args)?;
            let mut json = runtime::summary_json(&dataset, pretty)?;
            json.push('\n');
            return write_output(args.output.as_deref(), json.as_bytes());
        }
        Command::Boxplot => ChartKind::Boxplot,
        Command::Bar => ChartKind::Bar,
        Command::Line => ChartKind::Line,
    };

    let config = args.load_config()?;
    let dataset = read_dataset(args)?;
    let bytes = runtime::render_chart(kind, &dataset, &config)?;
    write_output(args.output.as_deref(), &bytes)
}

fn init_config(path: Option<&Path>) -> Result<()> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    if path.exists() {
        anyhow::bail!("{} already exists. Remove it first or edit it manually.", path.display());
    }
    fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote default config");
    Ok(())
}

fn read_dataset(args: &Args) -> Result<Dataset> {
    let raw = match &args.input {
        Some(path) => fs::read(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .context("Failed to read data from stdin")?;
            buf
        }
    };

    let format = args.input_format();
    debug!(?format, bytes = raw.len(), "Read input");
    let dataset = Dataset::load(raw.as_slice(), format).context("Failed to load dataset")?;
    info!(records = dataset.len(), "Loaded dataset");
    Ok(dataset)
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => fs::write(path, bytes)
            .with_context(|| format!("Failed to write output file: {}", path.display())),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(bytes).context("Failed to write to stdout")?;
            handle.flush().context("Failed to flush stdout")
        }
    }
}
