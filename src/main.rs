use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod aggregate;
mod config;
mod dashboard;
mod distribution;
mod error;
mod import;
mod models;
mod parser;
mod rank;
mod report;

use config::Thresholds;
use dashboard::{Dashboard, ImportStatus};

#[derive(Parser)]
#[command(name = "grade-dashboard")]
#[command(about = "Class results dashboard built from a CSV grade sheet", long_about = None)]
struct Cli {
    #[command(flatten)]
    thresholds: ThresholdArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ThresholdArgs {
    /// JSON file with threshold overrides
    #[arg(long, global = true)]
    thresholds: Option<PathBuf>,
    /// Grade counted as a pass
    #[arg(long, global = true)]
    pass_mark: Option<f64>,
    /// Students averaging below this need support
    #[arg(long, global = true)]
    improvement_below: Option<f64>,
    /// Subjects averaging at least this are strong
    #[arg(long, global = true)]
    strong_from: Option<f64>,
    /// Subjects under this pass rate need attention
    #[arg(long, global = true)]
    min_success_rate: Option<f64>,
    /// Number of top and struggling students to list
    #[arg(long, global = true)]
    limit: Option<usize>,
}

impl ThresholdArgs {
    fn resolve(&self) -> anyhow::Result<Thresholds> {
        let mut thresholds = match &self.thresholds {
            Some(path) => Thresholds::from_json_file(path)?,
            None => Thresholds::default(),
        };
        if let Some(value) = self.pass_mark {
            thresholds.pass_mark = value;
        }
        if let Some(value) = self.improvement_below {
            thresholds.improvement_below = value;
        }
        if let Some(value) = self.strong_from {
            thresholds.strong_from = value;
        }
        if let Some(value) = self.min_success_rate {
            thresholds.min_success_rate = value;
        }
        if let Some(value) = self.limit {
            thresholds.top_k = value;
        }
        Ok(thresholds)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a CSV grade sheet and render the dashboard
    Report {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
    },
    /// Render the dashboard for the built-in sample class
    Sample {
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
    },
    /// Interactive session: load, sample, clear, show, status, quit
    Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grade_dashboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let thresholds = cli.thresholds.resolve()?;
    let mut dashboard = Dashboard::new(thresholds);

    match cli.command {
        Commands::Report { csv, out, format } => {
            if let ImportStatus::Error(message) = dashboard.import_file(&csv).await {
                anyhow::bail!("import of {} failed: {message}", csv.display());
            }
            tracing::info!("{}", dashboard.status().message());
            emit(&dashboard, format, out.as_deref())?;
        }
        Commands::Sample { out, format } => {
            dashboard.load_sample();
            emit(&dashboard, format, out.as_deref())?;
        }
        Commands::Shell => run_shell(&mut dashboard).await?,
    }

    Ok(())
}

fn render(dashboard: &Dashboard, format: Format) -> anyhow::Result<String> {
    let view = dashboard.view();
    let now = chrono::Utc::now();
    match format {
        Format::Markdown => Ok(report::build_report(&view, now)),
        Format::Json => report::build_json(&view, now),
    }
}

fn emit(dashboard: &Dashboard, format: Format, out: Option<&Path>) -> anyhow::Result<()> {
    let rendered = render(dashboard, format)?;
    match out {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report written to {}.", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

async fn run_shell(dashboard: &mut Dashboard) -> anyhow::Result<()> {
    println!("Commands: load <file.csv>, sample, clear, show [json], status, quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "" => continue,
            "load" if argument.is_empty() => println!("usage: load <file.csv>"),
            "load" => {
                let status = dashboard.import_file(Path::new(argument)).await;
                println!("{}", status.message());
            }
            "sample" => {
                dashboard.load_sample();
                println!("{}", dashboard.status().message());
            }
            "clear" => {
                dashboard.clear_roster();
                println!("Roster cleared.");
            }
            "show" => {
                let format = if argument == "json" {
                    Format::Json
                } else {
                    Format::Markdown
                };
                print!("{}", render(dashboard, format)?);
            }
            "status" => {
                if dashboard.is_empty() {
                    println!("No roster loaded.");
                } else {
                    println!("{} students loaded.", dashboard.roster().len());
                }
                if *dashboard.status() != ImportStatus::Idle {
                    println!("Last import: {}", dashboard.status().message());
                }
            }
            "quit" | "exit" => break,
            other => println!("unknown command: {other}"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds_from(args: &[&str]) -> Thresholds {
        let cli = Cli::try_parse_from(args).unwrap();
        cli.thresholds.resolve().unwrap()
    }

    #[test]
    fn flags_override_thresholds_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{ "pass_mark": 12.0, "strong_from": 15.0 }"#).unwrap();
        let path = file.path().to_str().unwrap();

        let thresholds = thresholds_from(&[
            "grade-dashboard",
            "--thresholds",
            path,
            "--pass-mark",
            "8",
            "--limit",
            "5",
            "sample",
        ]);
        assert_eq!(thresholds.pass_mark, 8.0);
        assert_eq!(thresholds.top_k, 5);
        assert_eq!(thresholds.strong_from, 15.0);
        assert_eq!(thresholds.improvement_below, 12.0);
        assert_eq!(thresholds.min_success_rate, 0.7);
    }

    #[test]
    fn file_applies_without_flags() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{ "pass_mark": 12.0 }"#).unwrap();
        let path = file.path().to_str().unwrap();

        let thresholds = thresholds_from(&["grade-dashboard", "sample", "--thresholds", path]);
        assert_eq!(thresholds.pass_mark, 12.0);
        assert_eq!(thresholds.top_k, 3);
    }

    #[test]
    fn defaults_without_file_or_flags() {
        assert_eq!(thresholds_from(&["grade-dashboard", "shell"]), Thresholds::default());
    }
}
