use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use reelkit::{
    EncodeConfig, MediaAsset, NarrationAsset, RenderConfig, RenderDriver, RenderJob,
};

#[derive(Parser, Debug)]
#[command(name = "reelkit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the render plan and dump it as JSON (no ffmpeg needed).
    Plan(JobArgs),
    /// Build the render plan and encode the final video (requires `ffmpeg`
    /// and `ffprobe` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct JobArgs {
    /// Narration audio file (the master clock).
    #[arg(long)]
    narration: PathBuf,

    /// Narration text file; its words drive the caption cues.
    #[arg(long)]
    text: PathBuf,

    /// Footage clips, in playback order.
    #[arg(long = "clip", required = true)]
    clips: Vec<PathBuf>,

    /// Render configuration JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Plan(args) => cmd_plan(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<RenderConfig> {
    match path {
        None => Ok(RenderConfig::default()),
        Some(p) => {
            let raw = std::fs::read_to_string(p)
                .with_context(|| format!("read config '{}'", p.display()))?;
            serde_json::from_str(&raw).with_context(|| "parse config JSON")
        }
    }
}

fn probe_job(args: &JobArgs) -> anyhow::Result<RenderJob> {
    let narration = NarrationAsset::probe(&args.narration)
        .with_context(|| format!("probe narration '{}'", args.narration.display()))?;
    let narration_text = std::fs::read_to_string(&args.text)
        .with_context(|| format!("read narration text '{}'", args.text.display()))?;
    let clips = args
        .clips
        .iter()
        .map(|p| {
            MediaAsset::probe(p).with_context(|| format!("probe clip '{}'", p.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(RenderJob {
        narration,
        narration_text,
        clips,
    })
}

fn cmd_plan(args: JobArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let job = probe_job(&args)?;
    let mut driver = RenderDriver::new(config)?;
    let plan = driver.plan(&job)?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = read_config(args.job.config.as_deref())?;
    let job = probe_job(&args.job)?;
    let mut driver = RenderDriver::new(config)?;
    let plan = driver.render(&job, &EncodeConfig::new(&args.out))?;
    eprintln!(
        "wrote {} ({:.2}s, {} clips, {} cues)",
        args.out.display(),
        plan.total_duration(),
        plan.clip_paths.len(),
        plan.main().map_or(0, |m| m.cues.len()),
    );
    Ok(())
}
