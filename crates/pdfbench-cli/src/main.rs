//! pdfbench CLI
//!
//! ```bash
//! pdfbench run --dir pdfs --tools mineru,pdftotext,lopdf
//! pdfbench discover --dir pdfs
//! pdfbench tools
//! pdfbench serve --port 8501
//! ```

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pdfbench::{
    BenchmarkConfig, BenchmarkRunner, ExportFormat, RunSummary, ToolRegistry, discover_documents, write_report,
};

#[derive(Parser)]
#[command(name = "pdfbench")]
#[command(version, about = "Benchmark PDF-to-text extraction tools", long_about = None)]
struct Cli {
    /// Configuration file (default: discover pdfbench.toml in this or a parent directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every selected tool on every PDF and write the results
    Run {
        /// Directory scanned for PDF files
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Tools to benchmark (comma-separated, default: all registered)
        #[arg(short, long, value_delimiter = ',')]
        tools: Vec<String>,

        /// Output directory for results
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Timeout per extraction, in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Keep raw tool outputs in this directory
        #[arg(long)]
        artifacts: Option<PathBuf>,

        /// Only scan the top level of the directory
        #[arg(long)]
        flat: bool,

        /// Export formats (comma-separated: json, csv, html)
        #[arg(short, long, value_delimiter = ',', default_value = "json,csv,html")]
        format: Vec<ExportFormat>,

        /// Print the run as JSON on stdout instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// List the PDF files a run would use
    Discover {
        #[arg(short, long)]
        dir: Option<PathBuf>,

        #[arg(long)]
        flat: bool,
    },

    /// List registered tools and whether they are available
    Tools,

    /// Start the local dashboard
    #[cfg(feature = "api")]
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, env = "PDFBENCH_HOST", default_value = pdfbench::api::DEFAULT_HOST)]
        host: String,

        /// Port to bind to
        #[arg(short, long, env = "PDFBENCH_PORT", default_value_t = pdfbench::api::DEFAULT_PORT)]
        port: u16,

        /// Default directory offered for runs
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<BenchmarkConfig> {
    let config = BenchmarkConfig::load(path.map(|p| p.as_path())).context("Failed to load configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            dir,
            tools,
            output,
            timeout,
            artifacts,
            flat,
            format,
            json,
        } => {
            let mut config = load_config(cli.config.as_ref())?;
            if let Some(dir) = dir {
                config.data_dir = dir;
            }
            if !tools.is_empty() {
                config.tools = tools;
            }
            if let Some(output) = output {
                config.output_dir = output;
            }
            if let Some(timeout) = timeout {
                config.timeout_secs = timeout;
            }
            if artifacts.is_some() {
                config.artifacts_dir = artifacts;
            }
            if flat {
                config.recursive = false;
            }
            config.validate()?;

            let registry = ToolRegistry::from_config(&config)?;
            let tools = registry.resolve(&config.tools)?;
            let documents = discover_documents(&config.data_dir, config.recursive)?;
            if documents.is_empty() {
                bail!("No PDF files found in {}", config.data_dir.display());
            }

            tracing::info!(
                "Benchmarking {} document(s) from {} with {} tool(s)",
                documents.len(),
                config.data_dir.display(),
                tools.len()
            );

            let runner = BenchmarkRunner::new(&config);
            let run = runner
                .run_with_progress(&documents, &tools, |progress| {
                    eprintln!(
                        "[{}/{}] {} x {}",
                        progress.completed + 1,
                        progress.total,
                        progress.document,
                        progress.tool
                    );
                })
                .await?;

            let written = write_report(&run, &config.output_dir, &format)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&run)?);
            } else {
                print_summary(&RunSummary::from_run(&run));
                for path in &written {
                    println!("Wrote {}", path.display());
                }
            }

            Ok(())
        }

        Commands::Discover { dir, flat } => {
            let config = load_config(cli.config.as_ref())?;
            let dir = dir.unwrap_or(config.data_dir);
            let documents = discover_documents(&dir, config.recursive && !flat)?;

            println!("Found {} PDF file(s) in {}", documents.len(), dir.display());
            for document in &documents {
                println!(
                    "  {} ({:.2} MB)",
                    document.path.display(),
                    document.file_size as f64 / (1024.0 * 1024.0)
                );
            }

            Ok(())
        }

        Commands::Tools => {
            let config = load_config(cli.config.as_ref())?;
            let registry = ToolRegistry::from_config(&config)?;

            for name in registry.names() {
                let tool = registry.get(&name)?;
                let status = match tool.setup().await {
                    Ok(()) => "available".to_string(),
                    Err(e) => format!("unavailable ({})", e),
                };
                println!("  {:<14} {:<11} {}", name, tool.kind().as_str(), status);
            }

            Ok(())
        }

        #[cfg(feature = "api")]
        Commands::Serve { host, port, dir } => {
            let mut config = load_config(cli.config.as_ref())?;
            if let Some(dir) = dir {
                config.data_dir = dir;
            }
            pdfbench::api::serve_with_config(&host, port, config).await?;
            Ok(())
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!("  Total files: {}", summary.total_documents);
    println!("  Total extractions: {}", summary.total_extractions);
    println!("  Successful: {}", summary.successful_extractions);
    println!("  Success rate: {:.1}%", summary.success_rate * 100.0);

    println!(
        "\n  {:<14} {:>8} {:>9} {:>12} {:>10}",
        "tool", "success", "rate", "avg time (s)", "avg chars"
    );
    for tool in &summary.tools {
        println!(
            "  {:<14} {:>4}/{:<3} {:>8.1}% {:>12.2} {:>10.0}",
            tool.tool,
            tool.successes,
            tool.attempts,
            tool.success_rate * 100.0,
            tool.durations.mean.as_secs_f64(),
            tool.mean_char_count
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_arguments() {
        let cli = Cli::try_parse_from([
            "pdfbench",
            "run",
            "--dir",
            "pdfs",
            "--tools",
            "mineru,lopdf",
            "--format",
            "csv,html",
            "--timeout",
            "60",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                dir,
                tools,
                format,
                timeout,
                flat,
                ..
            } => {
                assert_eq!(dir, Some(PathBuf::from("pdfs")));
                assert_eq!(tools, vec!["mineru", "lopdf"]);
                assert_eq!(format, vec![ExportFormat::Csv, ExportFormat::Html]);
                assert_eq!(timeout, Some(60));
                assert!(!flat);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_default_formats() {
        let cli = Cli::try_parse_from(["pdfbench", "run"]).unwrap();
        match cli.command {
            Commands::Run { format, .. } => assert_eq!(format, ExportFormat::ALL.to_vec()),
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["pdfbench", "run", "--format", "xlsx"]).is_err());
    }
}
