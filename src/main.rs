//! CLI entry point for `mboxbook`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use mboxbook::book::{self, ArchiveReport, BookOptions, BuildStats};
use mboxbook::config::Config;

#[derive(Parser)]
#[command(
    name = "mboxbook",
    version,
    about = "Compile an MBOX mail archive into a chapter-grouped HTML book"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// MBOX file to compile (shorthand for `build FILE`)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an archive into an HTML book
    Build {
        /// MBOX file to compile
        path: PathBuf,
        /// Book title (defaults to the configured title)
        #[arg(short, long)]
        title: Option<String>,
        /// Book author (defaults to the configured author)
        #[arg(short, long)]
        author: Option<String>,
        /// Output file (defaults to "<title>.html" in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Analyze an archive without writing the book
    Stats {
        /// MBOX file to analyze
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = mboxbook::config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Some(Commands::Build {
            path,
            title,
            author,
            output,
        }) => cmd_build(&path, title, author, output, &config),
        Some(Commands::Stats { path, json }) => cmd_stats(&path, json, &config),
        Some(Commands::Completions { shell }) => cmd_completions(shell),
        Some(Commands::Manpage) => cmd_manpage(),
        None => match cli.file {
            Some(path) => cmd_build(&path, None, None, None, &config),
            None => {
                Cli::command().print_help()?;
                Ok(())
            }
        },
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = mboxbook::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mboxbook.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mboxbook", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Compile an archive and write the HTML book.
fn cmd_build(
    path: &Path,
    title: Option<String>,
    author: Option<String>,
    output: Option<PathBuf>,
    config: &Config,
) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("MBOX file not found: {}", path.display());
    }

    let opts = BookOptions {
        title: title.unwrap_or_else(|| config.book.default_title.clone()),
        author: author.unwrap_or_else(|| config.book.default_author.clone()),
        date_format: config.book.date_format.clone(),
    };
    let output_path = output.unwrap_or_else(|| PathBuf::from(format!("{}.html", opts.title)));

    let file_size = std::fs::metadata(path)?.len();
    let pb = ProgressBar::new(file_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Reading archive [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let stats = book::build_book(
        path,
        &output_path,
        &opts,
        config,
        Some(&|current, total| {
            pb.set_length(total);
            pb.set_position(current);
        }),
    )?;
    pb.finish_and_clear();
    let elapsed = start.elapsed();

    print_build_table(path, &output_path, &stats, elapsed);

    Ok(())
}

/// Analyze an archive and print the chapter breakdown.
fn cmd_stats(path: &Path, json: bool, config: &Config) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("MBOX file not found: {}", path.display());
    }

    let opts = BookOptions {
        title: config.book.default_title.clone(),
        author: config.book.default_author.clone(),
        date_format: config.book.date_format.clone(),
    };

    let file_size = std::fs::metadata(path)?.len();
    let pb = ProgressBar::new(file_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Reading archive [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let report = book::analyze(
        path,
        &opts,
        config,
        Some(&|current, total| {
            pb.set_length(total);
            pb.set_position(current);
        }),
    )?;
    pb.finish_and_clear();
    let elapsed = start.elapsed();

    if json {
        print_report_json(path, file_size, &report)?;
    } else {
        print_report_table(path, file_size, &report, elapsed);
    }

    Ok(())
}

/// Print the build summary as a human-readable table.
fn print_build_table(path: &Path, output: &Path, stats: &BuildStats, elapsed: std::time::Duration) {
    use humansize::{format_size, BINARY};

    println!();
    println!("  {:<22} {}", "Archive", path.display());
    println!("  {:<22} {}", "Messages found", stats.messages_total);
    println!("  {:<22} {}", "Messages in book", stats.messages_kept);
    if stats.messages_skipped > 0 {
        println!(
            "  {:<22} {}",
            "Unparseable (skipped)", stats.messages_skipped
        );
    }
    if stats.messages_empty > 0 {
        println!("  {:<22} {}", "Empty after cleanup", stats.messages_empty);
    }
    println!("  {:<22} {}", "Chapters", stats.chapters);
    println!("  {:<22} {:.2?}", "Build time", elapsed);
    println!(
        "  {:<22} {} ({})",
        "Output",
        output.display(),
        format_size(stats.output_bytes, BINARY)
    );
    println!();
}

/// Print the archive report as a human-readable table.
fn print_report_table(
    path: &Path,
    file_size: u64,
    report: &ArchiveReport,
    elapsed: std::time::Duration,
) {
    use humansize::{format_size, BINARY};

    println!();
    println!("  {:<22} {}", "Archive", path.display());
    println!("  {:<22} {}", "File size", format_size(file_size, BINARY));
    println!("  {:<22} {}", "Messages found", report.messages_total);
    println!("  {:<22} {}", "Messages in book", report.messages_kept);
    println!(
        "  {:<22} {}",
        "Unparseable (skipped)", report.messages_skipped
    );
    println!("  {:<22} {}", "Empty after cleanup", report.messages_empty);
    println!("  {:<22} {:.2?}", "Scan time", elapsed);

    if !report.chapters.is_empty() {
        println!();
        println!("  Chapters:");
        for chapter in &report.chapters {
            println!("    {:>6}  {}", chapter.messages, chapter.name);
        }
    }
    println!();
}

/// Print the archive report as JSON.
fn print_report_json(path: &Path, file_size: u64, report: &ArchiveReport) -> anyhow::Result<()> {
    let stats = serde_json::json!({
        "file": path.to_string_lossy(),
        "file_size": file_size,
        "messages_total": report.messages_total,
        "messages_kept": report.messages_kept,
        "messages_skipped": report.messages_skipped,
        "messages_empty": report.messages_empty,
        "chapters": &report.chapters,
    });

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
