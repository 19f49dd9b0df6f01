//! ascq-map - convert between editor tile maps and `.map` files

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use ascq_config::CodecConfig;
use ascq_maps::{has_map_extension, supports_file, JsonCompanionStore, MapCodec, MapDocument};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Encode, decode and inspect binary .map files")]
struct Args {
    /// Codec options file (`key = value` lines)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log merge and record details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a JSON map document into a `.map` file and its companion
    Encode {
        /// Input document (JSON)
        input: PathBuf,
        /// Output `.map` path
        output: PathBuf,
    },
    /// Decode a `.map` file using its companion document
    Decode {
        /// Input `.map` path
        input: PathBuf,
        /// Write the decoded document here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Report whether a file looks like a `.map` file
    Check {
        file: PathBuf,
    },
    /// Print the header and record summary of a `.map` file
    Inspect {
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(args.config.as_deref())?;
    let codec = MapCodec::new(config);
    let store = JsonCompanionStore::new();

    match args.cmd {
        Command::Encode { input, output } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let doc: MapDocument = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", input.display()))?;

            if !has_map_extension(&output) {
                warn!("{} does not have a .map extension", output.display());
            }
            codec
                .write_file(&doc, &output, &store)
                .with_context(|| format!("encoding {}", output.display()))?;
            info!("Wrote {}", output.display());
        }
        Command::Decode { input, out } => {
            let doc = codec
                .read_file(&input, &store)
                .with_context(|| format!("decoding {}", input.display()))?;
            let json = serde_json::to_string_pretty(&doc)?;
            match out {
                Some(path) => {
                    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
                    info!("Wrote {}", path.display());
                }
                None => println!("{}", json),
            }
        }
        Command::Check { file } => {
            if !supports_file(&file) {
                bail!("{} is not a .map file", file.display());
            }
            println!("{}: ok", file.display());
        }
        Command::Inspect { input } => {
            let bytes = fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            let inspection = codec
                .inspect(&bytes)
                .with_context(|| format!("inspecting {}", input.display()))?;
            let header = &inspection.header;
            let (tiles, objects, blocks) = inspection.flag_counts();

            println!("size:     {}x{}", header.width, header.height);
            println!("version:  {}", header.version);
            println!("records:  {}", inspection.records.len());
            println!("tiles:    {}", tiles);
            println!("objects:  {}", objects);
            println!("blocked:  {}", blocks);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<CodecConfig> {
    let config = match path {
        Some(path) => CodecConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CodecConfig::default(),
    };
    config.display();
    Ok(config)
}
