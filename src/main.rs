//! scenefit CLI - Find the usage scenes an image's dimensions suit

use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use scenefit::batch::{self, BatchSummary};
use scenefit::{report, ImageDimensions, SceneClassifier, SceneError};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser)]
#[command(name = "scenefit", version, about = "Classify images into avatar, phone, tablet and PC scenes")]
struct Args {
    #[command(subcommand)]
    command: Command,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze an image file, or every image in a directory
    Analyze {
        /// Image file or directory
        path: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
        /// Also write the JSON report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Relative ratio tolerance for discrete-ratio scenes
        #[arg(short, long, default_value = "0.05", value_parser = parse_tolerance)]
        tolerance: f64,
        /// Number of parallel workers (default: number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,
        /// Only print the batch summary
        #[arg(short, long)]
        quiet: bool,
    },
    /// Classify literal dimensions, e.g. 1920x1080
    Dims {
        /// Dimensions as WIDTHxHEIGHT
        #[arg(allow_hyphen_values = true)]
        size: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
        /// Relative ratio tolerance for discrete-ratio scenes
        #[arg(short, long, default_value = "0.05", value_parser = parse_tolerance)]
        tolerance: f64,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), SceneError> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Analyze { path, json, output, tolerance, jobs, quiet } => {
            let classifier = SceneClassifier::default().with_tolerance(tolerance)?;
            if path.is_dir() {
                run_batch(&path, &classifier, json, output.as_deref(), jobs, quiet)
            } else {
                let report = scenefit::analyze_path(&path, &classifier)?;
                print_report(&report, json)?;
                if let Some(output) = output {
                    write_json_file(&output, &report)?;
                }
                Ok(())
            }
        }
        Command::Dims { size, json, tolerance } => {
            let dims = parse_size(&size)?;
            let classifier = SceneClassifier::default().with_tolerance(tolerance)?;
            print_report(&classifier.classify_dimensions(dims), json)
        }
    }
}

fn print_report(report: &scenefit::SceneReport, json: bool) -> Result<(), SceneError> {
    if json {
        report::write_json(&mut io::stdout().lock(), report)
    } else {
        print!("{}", report::render_text(report));
        Ok(())
    }
}

fn run_batch(
    dir: &Path,
    classifier: &SceneClassifier,
    json: bool,
    output: Option<&Path>,
    jobs: Option<usize>,
    quiet: bool,
) -> Result<(), SceneError> {
    if let Some(jobs) = jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let files = batch::collect_images(dir)?;
    if files.is_empty() {
        eprintln!("No images found in {}", dir.display());
        return Ok(());
    }

    let pb = if !quiet && !json && files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let entries = batch::analyze_files(&files, classifier, |entry| {
        if let Some(ref pb) = pb {
            pb.inc(1);
            pb.set_message(entry.file_name.clone());
        }
    });

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let summary = BatchSummary::from_entries(&entries);
    if json {
        report::write_json(&mut io::stdout().lock(), &entries)?;
    } else {
        if !quiet {
            for entry in &entries {
                println!("{}", entry.summary_line());
            }
            println!();
        }
        print_summary(&summary);
    }

    if let Some(output) = output {
        write_json_file(output, &entries)?;
        eprintln!("Report saved: {}", output.display());
    }
    Ok(())
}

fn print_summary(summary: &BatchSummary) {
    println!("Summary: {} image(s)", summary.total);
    for (scene, count) in &summary.best_scene_counts {
        println!("  {:<10} {}", scene.name(), count);
    }
    println!("  {:<10} {}", "No fit", summary.unmatched);
    if summary.failed > 0 {
        println!("  {:<10} {}", "Failed", summary.failed);
    }
}

fn write_json_file<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SceneError> {
    let mut writer = BufWriter::new(File::create(path)?);
    report::write_json(&mut writer, value)
}

fn parse_tolerance(value: &str) -> Result<f64, String> {
    let tolerance: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if tolerance.is_finite() && tolerance >= 0.0 {
        Ok(tolerance)
    } else {
        Err(format!("tolerance must be finite and non-negative, got {}", value))
    }
}

fn parse_size(size: &str) -> Result<ImageDimensions, SceneError> {
    let invalid = || SceneError::InvalidSize(size.to_string());
    let (w, h) = size
        .split_once(|c| c == 'x' || c == 'X')
        .ok_or_else(invalid)?;
    let width: i64 = w.trim().parse().map_err(|_| invalid())?;
    let height: i64 = h.trim().parse().map_err(|_| invalid())?;
    ImageDimensions::try_from((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_size() {
        let dims = parse_size("1920x1080").unwrap();
        assert_eq!((dims.width(), dims.height()), (1920, 1080));
        let dims = parse_size(" 1080 X 1920 ").unwrap();
        assert_eq!((dims.width(), dims.height()), (1080, 1920));
    }

    #[test]
    fn rejects_malformed_size() {
        assert!(matches!(parse_size("1920"), Err(SceneError::InvalidSize(_))));
        assert!(matches!(parse_size("wide x tall"), Err(SceneError::InvalidSize(_))));
    }

    #[test]
    fn rejects_non_positive_size() {
        assert!(matches!(
            parse_size("-1x100"),
            Err(SceneError::InvalidDimensions { width: -1, height: 100 })
        ));
        assert!(matches!(parse_size("100x0"), Err(SceneError::InvalidDimensions { .. })));
    }

    #[test]
    fn parses_dims_command() {
        let args = Args::try_parse_from(["scenefit", "dims", "-5x10", "--json"]).unwrap();
        match args.command {
            Command::Dims { size, json, tolerance } => {
                assert_eq!(size, "-5x10");
                assert!(json);
                assert_eq!(tolerance, 0.05);
            }
            _ => panic!("expected dims command"),
        }
    }

    #[test]
    fn parses_tolerance_rejects_nan_and_negative() {
        for bad in ["NaN", "inf", "-0.1", "loose"] {
            let flag = format!("--tolerance={}", bad);
            let result = Args::try_parse_from(["scenefit", "dims", "1920x1080", flag.as_str()]);
            assert!(result.is_err(), "{}", bad);
        }
        assert!(parse_tolerance("NaN").is_err());
        assert!(parse_tolerance("-0.1").is_err());
        assert_eq!(parse_tolerance("0"), Ok(0.0));
        let args = Args::try_parse_from(["scenefit", "analyze", "img.png", "-t", "0.1"]).unwrap();
        match args.command {
            Command::Analyze { tolerance, .. } => assert_eq!(tolerance, 0.1),
            _ => panic!("expected analyze command"),
        }
    }

    #[test]
    fn parses_analyze_flags() {
        let args = Args::try_parse_from(["scenefit", "-vv", "analyze", "./wallpapers", "-j", "4", "-q"])
            .unwrap();
        assert_eq!(args.verbose, 2);
        match args.command {
            Command::Analyze { path, jobs, quiet, json, .. } => {
                assert_eq!(path, PathBuf::from("./wallpapers"));
                assert_eq!(jobs, Some(4));
                assert!(quiet);
                assert!(!json);
            }
            _ => panic!("expected analyze command"),
        }
    }
}
