use std::path::{Path, PathBuf};

use anyhow::{ensure, Result};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "prosodyzer",
    version,
    about = "Compare the prosody of a spoken attempt against a target recording"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract and summarize the prosodic features of one recording.
    Analyze(AnalyzeArgs),
    /// Score a user recording against a target recording and print feedback.
    Compare(CompareArgs),
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// JSON file overriding analysis settings.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Emit the result as pretty-printed JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Input audio file (WAV, MP3, OGG, FLAC, ...).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
    #[command(flatten)]
    pub output: OutputArgs,
}

impl AnalyzeArgs {
    pub fn validate(&self) -> Result<()> {
        ensure_audio_file(&self.input, "input")
    }
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Target (reference accent) recording.
    #[arg(long, value_name = "PATH")]
    pub target: PathBuf,
    /// User attempt at the same text.
    #[arg(long, value_name = "PATH")]
    pub user: PathBuf,
    #[command(flatten)]
    pub output: OutputArgs,
}

impl CompareArgs {
    pub fn validate(&self) -> Result<()> {
        ensure_audio_file(&self.target, "target")?;
        ensure_audio_file(&self.user, "user")
    }
}

fn ensure_audio_file(path: &Path, label: &str) -> Result<()> {
    ensure!(path.exists(), "{label} file does not exist: {:?}", path);
    ensure!(path.is_file(), "{label} path is not a file: {:?}", path);
    Ok(())
}
