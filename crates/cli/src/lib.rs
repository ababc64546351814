use anyhow::{anyhow, Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use netsketch_classifier::{classify, complete_address, normalize_interface, Ipv4Cidr};
use netsketch_model::DetectionBatch;
use netsketch_ocr::{RegionReadings, ReplayEngine};
use netsketch_pipeline::{Pipeline, ReconstructionConfig, TopologyStore};
use serde::Deserialize;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "netsketch")]
#[command(about = "Rebuild network topology from diagram detections", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for results)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct a topology from detections and recorded OCR readings
    Reconstruct(ReconstructArgs),

    /// Print the class of each text
    Classify(TextArgs),

    /// Print the canonical interface name of each text
    Normalize(TextArgs),

    /// Complete a partial address with a known network
    Complete(CompleteArgs),
}

#[derive(Args)]
struct ReconstructArgs {
    /// JSON file with `batch` and `readings`
    #[arg(short, long)]
    input: PathBuf,

    /// TOML file with reconstruction settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to save topology.json and the Ansible inventory into
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Override the number of OCR shards
    #[arg(long)]
    ocr_shards: Option<usize>,

    /// Override the minimum OCR confidence
    #[arg(long)]
    min_confidence: Option<f64>,

    /// Override the zone <-> link attach distance
    #[arg(long)]
    link_attach_distance: Option<f64>,

    /// Override the pc/server default interface name
    #[arg(long)]
    default_host_interface: Option<String>,
}

#[derive(Args)]
struct TextArgs {
    #[arg(required = true)]
    texts: Vec<String>,
}

#[derive(Args)]
struct CompleteArgs {
    /// Partial address, e.g. `.5` or `1.5`
    fragment: String,

    /// Network the address belongs to, e.g. `192.168.1.0/24`
    #[arg(short, long)]
    network: String,
}

/// Contents of the `--input` file
#[derive(Deserialize)]
struct DiagramInput {
    batch: DetectionBatch,
    #[serde(default)]
    readings: Vec<RegionReadings>,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Reconstruct(args) => run_reconstruct(args).await?,
        Commands::Classify(args) => {
            for text in &args.texts {
                print_stdout(&format!("{text}\t{}", classify(text)))?;
            }
        }
        Commands::Normalize(args) => {
            for text in &args.texts {
                print_stdout(&normalize_interface(text))?;
            }
        }
        Commands::Complete(args) => {
            let network: Ipv4Cidr = args
                .network
                .parse()
                .with_context(|| format!("Invalid network {:?}", args.network))?;
            let completed = complete_address(&args.fragment, &network).ok_or_else(|| {
                anyhow!("{:?} cannot be completed within {network}", args.fragment)
            })?;
            print_stdout(&completed)?;
        }
    }
    Ok(())
}

async fn run_reconstruct(args: ReconstructArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ReconstructionConfig::load(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ReconstructionConfig::default(),
    };
    if let Some(shards) = args.ocr_shards {
        config.ocr_shards = shards;
    }
    if let Some(confidence) = args.min_confidence {
        config.min_ocr_confidence = confidence;
    }
    if let Some(distance) = args.link_attach_distance {
        config.link_attach_distance = distance;
    }
    if let Some(name) = args.default_host_interface {
        config.default_host_interface = name;
    }

    let raw = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let input: DiagramInput = serde_json::from_slice(&raw)
        .with_context(|| format!("Invalid detection file {}", args.input.display()))?;
    for record in &input.readings {
        for reading in &record.readings {
            reading
                .validate()
                .with_context(|| format!("Invalid OCR reading for {}", record.region))?;
        }
    }

    let pipeline = Pipeline::new(config).context("Invalid reconstruction settings")?;
    let engine = Arc::new(ReplayEngine::from_records(input.readings));
    let report = pipeline
        .run(&input.batch, engine)
        .await
        .context("Reconstruction failed")?;

    if let Some(dir) = &args.out {
        TopologyStore::new(dir)
            .save(&report.topology)
            .await
            .with_context(|| format!("Failed to save topology to {}", dir.display()))?;
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    print_stdout(&json)
}
