use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use vfxseq::{Sequence, SequenceFile};

#[derive(Parser, Debug)]
#[command(name = "vfxseq", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of a sequence file.
    Inspect(InspectArgs),
    /// Parse and validate a sequence file.
    Validate(ValidateArgs),
    /// Evaluate a timestamp's curves at a frame.
    Sample(SampleArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input sequence JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input sequence JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    /// Input sequence JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Timestamp index within the sequence.
    #[arg(long)]
    timestamp: usize,

    /// Sequence frame to sample at.
    #[arg(long)]
    frame: i32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args),
        Command::Validate(args) => cmd_validate(args),
        Command::Sample(args) => cmd_sample(args),
    }
}

fn read_sequence(path: &Path) -> anyhow::Result<Sequence> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("open sequence '{}'", path.display()))?;
    let file: SequenceFile =
        serde_json::from_str(&text).with_context(|| "parse sequence JSON")?;
    let mut sq = Sequence::new(0);
    sq.name = file.name.clone();
    file.apply_to(&mut sq)
        .with_context(|| "materialize sequence")?;
    Ok(sq)
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let sq = read_sequence(&args.in_path)?;
    println!("name:       {}", sq.name);
    println!("duration:   {} frames", sq.duration);
    println!("meshes:     {}", sq.meshes.len());
    println!("emitters:   {}", sq.emitters.len());
    println!("timestamps: {}", sq.timestamps.len());
    for (i, ts) in sq.timestamps.iter().enumerate() {
        let effect = match ts.effect {
            vfxseq::EffectRef::Mesh(m) => format!("mesh {m}"),
            vfxseq::EffectRef::Emitter(e) => format!("emitter {e}"),
        };
        println!(
            "  [{i}] {effect} @ [{}, {}], {} curve(s)",
            ts.window.start,
            ts.window.end,
            ts.curves.len()
        );
        for curve in ts.curves.iter() {
            println!(
                "        {} ({:?}, {} point(s), range [{}, {}])",
                curve.attribute.display_name(),
                curve.profile,
                curve.points.len(),
                curve.min_value,
                curve.max_value
            );
        }
    }
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let sq = read_sequence(&args.in_path)?;
    sq.validate()
        .with_context(|| format!("validate sequence '{}'", sq.name))?;
    println!("ok: {}", args.in_path.display());
    Ok(())
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    let sq = read_sequence(&args.in_path)?;
    sq.validate()?;
    let ts = sq
        .timestamps
        .get(args.timestamp)
        .with_context(|| format!("sequence has no timestamp {}", args.timestamp))?;
    if !ts.window.contains(args.frame) {
        println!(
            "frame {} is outside timestamp window [{}, {}]",
            args.frame, ts.window.start, ts.window.end
        );
    }
    for curve in ts.curves.iter() {
        let value = curve.evaluate(args.frame, ts.window);
        println!("{}: {value}", curve.attribute.display_name());
    }
    Ok(())
}
