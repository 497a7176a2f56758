use chrono::Local;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use phenoviz::report::Summary;
use phenoviz::{report, VizPayload};
use rayon::prelude::*;
use std::io::{self, Write};
use std::path::PathBuf;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "phenoviz")]
#[command(author, version, about = "Render diagnostic-score refinement payloads as interactive chart reports")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Payload file or directory of payloads (optional in GUI mode)
    path: Option<PathBuf>,

    /// Launch GUI file picker (auto-enabled when double-clicked)
    #[arg(long)]
    gui: bool,

    /// Output report file (.html, .json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for auto-generated reports
    #[arg(long, default_value = "phenoviz-reports")]
    report_dir: PathBuf,

    /// Don't auto-generate HTML reports
    #[arg(long)]
    no_report: bool,

    /// Don't prompt to open the report
    #[arg(long)]
    no_open: bool,

    /// Number of parallel workers (default: number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Show per-panel details
    #[arg(short, long)]
    verbose: bool,

    /// Only show summary
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start interactive web UI for a payload
    Serve {
        /// Payload file to serve
        path: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value = "3001")]
        port: u16,
    },
}

struct Rendered {
    source: PathBuf,
    summary: Option<Summary>,
    report_path: Option<PathBuf>,
    error: Option<String>,
}

fn main() {
    let args = Args::parse();

    if let Some(cmd) = args.command {
        match cmd {
            Command::Serve { path, port } => {
                if let Err(e) = phenoviz::serve::start(port, path) {
                    eprintln!("Server error: {}", e);
                    std::process::exit(1);
                }
                return;
            }
        }
    }

    // Determine if we should use GUI mode
    // With GUI feature: launch GUI if --gui flag OR no path provided
    // This makes double-click behavior "just work"
    #[cfg(feature = "gui")]
    let use_gui = args.gui || args.path.is_none();

    #[cfg(not(feature = "gui"))]
    let use_gui = false;

    #[cfg(feature = "gui")]
    let path = if use_gui {
        match pick_path_gui() {
            Some(p) => p,
            None => {
                eprintln!("No payload file or folder selected.");
                std::process::exit(0);
            }
        }
    } else {
        args.path.clone().unwrap()
    };

    #[cfg(not(feature = "gui"))]
    let path = if let Some(p) = args.path.clone() {
        p
    } else {
        eprintln!("Usage: phenoviz <PATH>");
        eprintln!("Run 'phenoviz --help' for more options.");
        eprintln!("Note: GUI mode not available in this build.");
        std::process::exit(1);
    };

    // Set up thread pool
    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    // Collect payload files
    let files: Vec<PathBuf> = if path.is_dir() {
        WalkDir::new(&path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case("json"))
                    .unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect()
    } else {
        vec![path.clone()]
    };

    if files.is_empty() {
        eprintln!("No payload files found (expected .json)");
        std::process::exit(1);
    }

    if !args.quiet {
        eprintln!("\x1b[1mPhenoviz - Refinement Chart Reports\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        eprintln!("Found {} payload file(s)\n", files.len());
    }

    // Set up progress bar
    let pb = if !args.quiet && files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    if !args.no_report || args.output.is_some() {
        std::fs::create_dir_all(&args.report_dir).ok();
    }

    // Render payloads in parallel
    let results: Vec<Rendered> = files
        .par_iter()
        .map(|file| {
            let rendered = render_payload(file, &args);
            if let Some(ref pb) = pb {
                pb.inc(1);
                pb.set_message(
                    file.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                );
            }
            rendered
        })
        .collect();

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    // Print results
    if !args.quiet {
        for r in &results {
            let name = r.source.file_name().unwrap_or_default().to_string_lossy();
            match (&r.summary, &r.error) {
                (Some(s), _) => {
                    println!(
                        "\x1b[32m[ok]\x1b[0m    {:>3} diseases  {:>3} terms  {:>3} charts  \x1b[32m↑{}\x1b[0m \x1b[31m↓{}\x1b[0m  {}",
                        s.diseases,
                        s.terms,
                        s.chart_count(),
                        s.improved,
                        s.declined,
                        name
                    );
                    if args.verbose {
                        eprintln!(
                            "    Panels: {} heatmap(s), {} posttest, {} distribution",
                            s.heatmaps, s.posttests, s.distributions
                        );
                    }
                }
                (None, Some(e)) => {
                    println!("\x1b[31m[error]\x1b[0m {}  {}", name, e);
                }
                (None, None) => {}
            }
        }
    }

    // Summary
    let ok_count = results.iter().filter(|r| r.summary.is_some()).count();
    let error_count = results.iter().filter(|r| r.error.is_some()).count();

    if !args.quiet {
        eprintln!("\n{}", "─".repeat(70));
        eprintln!("\x1b[1mSummary:\x1b[0m");
        eprintln!("  \x1b[32m✓ Rendered:\x1b[0m {}", ok_count);
        if error_count > 0 {
            eprintln!("  \x1b[31m✗ Errors:\x1b[0m   {}", error_count);
        }
    }

    // Report the generated files and offer to open the first one
    let first_report = results.iter().find_map(|r| r.report_path.clone());
    if let Some(ref report_path) = first_report {
        if !args.quiet {
            eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", report_path.display());
            if results.iter().filter(|r| r.report_path.is_some()).count() > 1 {
                eprintln!("(one report per payload in {})", args.report_dir.display());
            }
        }

        if !args.no_open {
            if use_gui {
                // In GUI mode, auto-open the report (no prompt)
                let _ = open::that(report_path);
            } else if !args.quiet {
                // In terminal mode, ask first
                eprint!("\nOpen report in browser? [Y/n] ");
                io::stderr().flush().ok();

                let mut input = String::new();
                if io::stdin().read_line(&mut input).is_ok() {
                    let input = input.trim().to_lowercase();
                    if input.is_empty() || input == "y" || input == "yes" {
                        if let Err(e) = open::that(report_path) {
                            eprintln!("Failed to open report: {}", e);
                        }
                    }
                }
            }
        }
    }

    if !args.quiet {
        eprintln!("\n\x1b[90mDone.\x1b[0m");
    }

    if error_count > 0 {
        std::process::exit(1);
    }
}

fn render_payload(file: &PathBuf, args: &Args) -> Rendered {
    let payload = match std::fs::File::open(file)
        .map_err(|e| e.to_string())
        .and_then(|f| VizPayload::from_reader(io::BufReader::new(f)).map_err(|e| e.to_string()))
    {
        Ok(p) => p,
        Err(e) => {
            return Rendered {
                source: file.clone(),
                summary: None,
                report_path: None,
                error: Some(e),
            }
        }
    };

    let summary = Summary::from_payload(&payload);

    let report_path = if let Some(ref output) = args.output {
        Some(output.clone())
    } else if !args.no_report {
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "payload".to_string());
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        Some(args.report_dir.join(format!("{}_{}.html", stem, timestamp)))
    } else {
        None
    };

    if let Some(ref path) = report_path {
        if let Err(e) = report::generate(path, &payload) {
            return Rendered {
                source: file.clone(),
                summary: None,
                report_path: None,
                error: Some(format!("failed to write report: {}", e)),
            };
        }
    }

    Rendered {
        source: file.clone(),
        summary: Some(summary),
        report_path,
        error: None,
    }
}

#[cfg(feature = "gui")]
fn pick_path_gui() -> Option<PathBuf> {
    // First try file picker for a single payload
    if let Some(file) = rfd::FileDialog::new()
        .set_title("Select payload file to render (or Cancel for a folder)")
        .add_filter("Payload files", &["json"])
        .pick_file()
    {
        return Some(file);
    }

    // If cancelled, offer folder picker for batch mode
    rfd::FileDialog::new()
        .set_title("Select folder of payload files")
        .pick_folder()
}
