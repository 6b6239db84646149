use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fieldmask_tools::{
    decode_mask, find_layout, format_layout_pretty, layout_report, parse_hex, run_demo,
    DemoTick, BYSTANDER, LOOTER,
};
use records::ProjectionConfig;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fieldmask-tools",
    version,
    about = "fieldmask layout and payload inspection tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Describe a record's mask layout and fingerprint.
    Layout {
        /// Record name, e.g. UnitData (case-insensitive).
        record: String,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Run a scripted broadcast and print the frames sent.
    Demo {
        /// Only show frames for this receiver.
        #[arg(long, value_enum)]
        receiver: Option<DemoReceiver>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DemoFormat::Hex)]
        format: DemoFormat,
        /// ProjectionConfig JSON file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Decode the mask header at the start of a record payload.
    DecodeMask {
        /// Record name the payload belongs to.
        record: String,
        /// Payload as hex digits.
        hex: String,
        /// Print JSON instead of a list.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DemoReceiver {
    Looter,
    Bystander,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DemoFormat {
    Hex,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Layout { record, json } => {
            let report = layout_report(find_layout(&record)?);
            if json {
                let json = serde_json::to_string_pretty(&report).context("serialize json")?;
                println!("{json}");
            } else {
                print!("{}", format_layout_pretty(&report));
            }
        }
        Command::Demo {
            receiver,
            format,
            config,
        } => {
            let projection = match config {
                Some(path) => load_config(&path).context("load projection config")?,
                None => ProjectionConfig::default(),
            };
            debug!(?projection, "running demo");
            let mut ticks = run_demo(projection);
            if let Some(receiver) = receiver {
                let guid = match receiver {
                    DemoReceiver::Looter => LOOTER,
                    DemoReceiver::Bystander => BYSTANDER,
                };
                for tick in &mut ticks {
                    tick.frames.retain(|frame| frame.receiver_guid == guid);
                }
            }
            match format {
                DemoFormat::Json => {
                    let json = serde_json::to_string_pretty(&ticks).context("serialize json")?;
                    println!("{json}");
                }
                DemoFormat::Hex => print_demo(&ticks),
            }
        }
        Command::DecodeMask { record, hex, json } => {
            let layout = find_layout(&record)?;
            let bytes = parse_hex(&hex).context("parse payload")?;
            let report = decode_mask(layout, &bytes)?;
            if json {
                let json = serde_json::to_string_pretty(&report).context("serialize json")?;
                println!("{json}");
            } else {
                println!(
                    "{}: {} bits set, header {} bytes",
                    report.record,
                    report.set.len(),
                    report.header_bytes
                );
                for info in &report.set {
                    println!("  {:>5} {} {:?}", info.bit, info.name, info.role);
                }
            }
        }
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<ProjectionConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_str(&contents).context("parse config json")
}

fn print_demo(ticks: &[DemoTick]) {
    for tick in ticks {
        println!("== tick {} ==", tick.tick);
        for frame in &tick.frames {
            println!("{} ({} bytes)", frame.receiver, frame.bytes);
            if !frame.out_of_range.is_empty() {
                println!("  out of range: {}", frame.out_of_range.join(", "));
            }
            for block in &frame.blocks {
                println!(
                    "  {} {} ({} bytes): {}",
                    block.kind, block.guid, block.bytes, block.hex
                );
            }
        }
    }
}
