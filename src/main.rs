use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use prosodyzer::audio::decoder::decode_audio;
use prosodyzer::config::AppConfig;
use prosodyzer::prosody::cli::{AnalyzeArgs, Cli, Command, CompareArgs};
use prosodyzer::prosody::{BundleSummary, ComparisonReport, ProsodyEngine};

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Analyze(args) => handle_analyze(&args),
        Command::Compare(args) => handle_compare(&args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_analyze(args: &AnalyzeArgs) -> Result<()> {
    args.validate()
        .context("Failed to validate command-line arguments")?;
    let engine = build_engine(args.output.config.clone())?;
    let audio = decode_audio(&args.input)
        .with_context(|| format!("Failed to decode {:?}", args.input))?;
    let bundle = engine.analyze(&audio).context("Feature analysis failed")?;
    let summary = BundleSummary::from(&bundle);
    if args.output.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary("Recording", &summary);
    }
    Ok(())
}

fn handle_compare(args: &CompareArgs) -> Result<()> {
    args.validate()
        .context("Failed to validate command-line arguments")?;
    let engine = build_engine(args.output.config.clone())?;
    let target = decode_audio(&args.target)
        .with_context(|| format!("Failed to decode target {:?}", args.target))?;
    let user = decode_audio(&args.user)
        .with_context(|| format!("Failed to decode user recording {:?}", args.user))?;
    let report = engine
        .evaluate(&target, &user)
        .context("Prosody comparison failed")?;
    if args.output.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn build_engine(config: Option<PathBuf>) -> Result<ProsodyEngine> {
    let app = AppConfig::from_override(config)?;
    ProsodyEngine::new(app.settings).context("Analysis settings rejected")
}

fn print_summary(label: &str, summary: &BundleSummary) {
    println!("{label}:");
    println!("   Duration:       {:.3} s", summary.duration);
    println!(
        "   Voiced frames:  {} of {}",
        summary.voiced_frames, summary.frame_count
    );
    match summary.pitch_range {
        Some(range) => println!(
            "   Pitch:          mean {:.1} Hz, range {:.1}-{:.1} Hz",
            range.mean, range.min, range.max
        ),
        None => println!("   Pitch:          unvoiced"),
    }
    let [f1, f2, f3] = summary.formant_means;
    println!("   Formants:       F1 {f1:.0} Hz, F2 {f2:.0} Hz, F3 {f3:.0} Hz");
    println!(
        "   Intensity:      mean {:.1} dB, range {:.1} dB",
        summary.intensity_mean_db, summary.intensity_range_db
    );
    println!(
        "   Speaking rate:  {:.2} syll/s ({} syllables)",
        summary.speaking_rate.syllables_per_second, summary.speaking_rate.estimated_syllables
    );
}

fn print_report(report: &ComparisonReport) {
    print_summary("Target", &report.target);
    print_summary("User", &report.user);
    println!("\nScores:");
    for (name, value) in report.scores.dimensions() {
        println!("   {name:<14} {value:.3}");
    }
    println!("   {:<14} {:.3}", "overall", report.scores.overall);
    println!("\nFeedback:");
    for line in &report.feedback {
        println!("   - {line}");
    }
}
