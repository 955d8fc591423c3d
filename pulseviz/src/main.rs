//! Pulseviz CLI - reshape and summarize pulse exercise data
//!
//! # Commands
//!
//! ```bash
//! pulseviz tidy exercise.csv                         # Tidy table as JSON
//! pulseviz pivot exercise.csv --rows diet --cols exercise --table
//! pulseviz summary exercise.csv --by exercise        # Distribution per category
//! pulseviz report exercise.csv --out-dir figures     # Write the SVG figures
//! pulseviz cache list                                # Inspect cached pivot views
//! ```

use clap::{Parser, Subcommand};
use pulseviz::logs::{log_info, log_success};
use pulseviz::transform::pipeline::format_delimiter;
use pulseviz::{
    load_pulse_data, pivot_by, render_report, summarize, Aggregation, Dimension, LoadOptions,
    LoadResult, LogFormat, PipelineError, PivotCache, Settings, LOG_BROADCASTER,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pulseviz")]
#[command(about = "Reshape and summarize pulse exercise data", long_about = None)]
struct Cli {
    /// Log lines as JSON instead of text
    #[arg(long, global = true)]
    json_logs: bool,

    /// Silence log lines
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean and reshape a CSV file, output the tidy table as JSON
    Tidy {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Aggregate pulse over two dimensions
    Pivot {
        /// Input CSV file
        input: PathBuf,

        /// Row dimension: diet, exercise or time
        #[arg(long, default_value = "diet")]
        rows: Dimension,

        /// Column dimension: diet, exercise or time
        #[arg(long, default_value = "exercise")]
        cols: Dimension,

        /// Aggregation: mean, median, min, max, sum or count
        #[arg(long, default_value = "mean")]
        agg: Aggregation,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print an aligned text table instead of JSON
        #[arg(long)]
        table: bool,

        /// Serve and store the view in the pivot cache
        #[arg(long)]
        cache: bool,
    },

    /// Pulse distribution per category
    Summary {
        /// Input CSV file
        input: PathBuf,

        /// Dimension to group by: diet, exercise or time
        #[arg(long, default_value = "diet")]
        by: Dimension,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the heatmaps and categorical plots as SVG files
    Report {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output directory (default: PULSEVIZ_OUTPUT_DIR or .)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Manage cached pivot views
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached views
    List,

    /// Delete every cached view
    Clear,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        settings.log_format
    };
    LOG_BROADCASTER.set_format(format);
    LOG_BROADCASTER.set_quiet(cli.quiet);

    match cli.command {
        Commands::Tidy {
            input,
            delimiter,
            output,
        } => cmd_tidy(&input, delimiter, output.as_deref()),

        Commands::Pivot {
            input,
            rows,
            cols,
            agg,
            delimiter,
            output,
            table,
            cache,
        } => {
            let cache_dir = cache.then_some(settings.cache_dir.as_path());
            cmd_pivot(
                &input,
                delimiter,
                (rows, cols, agg),
                output.as_deref(),
                table,
                cache_dir,
            )
        }

        Commands::Summary {
            input,
            by,
            delimiter,
            output,
        } => cmd_summary(&input, delimiter, by, output.as_deref()),

        Commands::Report {
            input,
            delimiter,
            out_dir,
        } => cmd_report(
            &input,
            delimiter,
            out_dir.as_deref().unwrap_or(settings.output_dir.as_path()),
        ),

        Commands::Cache { action } => cmd_cache(action, &settings.cache_dir),
    }
}

fn load(input: &Path, delimiter: Option<char>) -> Result<LoadResult, PipelineError> {
    let options = LoadOptions {
        delimiter,
        ..LoadOptions::default()
    };
    let result = load_pulse_data(input, &options)?;
    log_info(format!(
        "Encoding: {}, delimiter: '{}', {} of {} rows kept",
        result.csv_info.encoding,
        format_delimiter(result.csv_info.delimiter),
        result.csv_info.row_count - result.csv_info.dropped_rows,
        result.csv_info.row_count
    ));
    Ok(result)
}

fn cmd_tidy(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = load(input, delimiter)?;
    let json = serde_json::to_string_pretty(&result.tidy)?;
    write_output(&json, output)
}

fn cmd_pivot(
    input: &Path,
    delimiter: Option<char>,
    (rows, cols, agg): (Dimension, Dimension, Aggregation),
    output: Option<&Path>,
    table: bool,
    cache_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = load(input, delimiter)?;

    let view = match cache_dir {
        Some(dir) => PivotCache::with_dir(dir).get_or_compute(&result.tidy, rows, cols, agg)?,
        None => pivot_by(&result.tidy, rows, cols, agg)?,
    };
    log_success(format!(
        "{} of pulse by {} × {}: {} × {} cells",
        agg,
        rows,
        cols,
        view.rows.len(),
        view.columns.len()
    ));

    let content = if table {
        view.to_string()
    } else {
        serde_json::to_string_pretty(&view)?
    };
    write_output(&content, output)
}

fn cmd_summary(
    input: &Path,
    delimiter: Option<char>,
    by: Dimension,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = load(input, delimiter)?;
    let summaries = summarize(&result.tidy, by);
    log_success(format!("{} {} categories", summaries.len(), by));

    let json = serde_json::to_string_pretty(&summaries)?;
    write_output(&json, output)
}

fn cmd_report(
    input: &Path,
    delimiter: Option<char>,
    out_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = load(input, delimiter)?;
    if result.tidy.is_empty() {
        return Err(PipelineError::EmptyInput.into());
    }

    let written = render_report(&result.tidy, out_dir)?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn cmd_cache(action: CacheAction, cache_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut cache = PivotCache::with_dir(cache_dir);

    match action {
        CacheAction::List => {
            let views = cache.list();
            if views.is_empty() {
                eprintln!("📋 No cached views in {}", cache_dir.display());
                eprintln!("   Use 'pulseviz pivot <input> --cache' to add one.");
                return Ok(());
            }

            eprintln!("📋 Cached views ({}):\n", views.len());
            for v in views {
                println!(
                    "  📄 {} by {} ({})",
                    v.request.row_key, v.request.col_key, v.request.aggregation
                );
                println!("     Key: {}", v.key);
                println!("     Created: {}", v.created_at);
                println!("     Hits: {}", v.hit_count);
                if let Some(ref last) = v.last_used {
                    println!("     Last used: {}", last);
                }
                println!();
            }
        }

        CacheAction::Clear => {
            let count = cache.clear()?;
            eprintln!("🗑️  Removed {} cached views", count);
        }
    }

    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            log_success(format!("Output written to: {}", p.display()));
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
