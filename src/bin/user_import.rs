use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use asll_user_import::core::export::write_export;
use asll_user_import::utils::logging::init_tracing_with;
use asll_user_import::{
    export_users_csv, write_csv_template, Field, ImportConfig, ImportReport, ParseStats,
    UserImporter,
};

const USAGE: &str = "Usage:
  user_import <file-path> [--no-header] [--json] [--max-rows N] [--export <out.csv>]
  user_import --template <output-path>";

struct Options {
    file_path: PathBuf,
    no_header: bool,
    json: bool,
    max_rows: usize,
    export_path: Option<PathBuf>,
}

enum Command {
    Import(Options),
    Template(PathBuf),
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(error) => {
            eprintln!("Error: {error}\n{USAGE}");
            std::process::exit(1);
        }
    };

    let config = ImportConfig::load_or_default();
    init_tracing_with(Some(&config.log_level));

    if let Err(error) = run(command, config).await {
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<Command> {
    let mut iter = args.iter();
    let mut file_path = None;
    let mut no_header = false;
    let mut json = false;
    let mut max_rows = 20;
    let mut export_path = None;

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--template" => {
                let output = iter.next().context("--template needs an output path")?;
                return Ok(Command::Template(PathBuf::from(output)));
            }
            "--no-header" => no_header = true,
            "--json" => json = true,
            "--max-rows" => {
                let value = iter.next().context("--max-rows needs a number")?;
                max_rows = value
                    .parse()
                    .with_context(|| format!("Invalid --max-rows value: {value}"))?;
            }
            "--export" => {
                let output = iter.next().context("--export needs an output path")?;
                export_path = Some(PathBuf::from(output));
            }
            flag if flag.starts_with("--") => bail!("Unknown option: {flag}"),
            path => file_path = Some(PathBuf::from(path)),
        }
    }

    let Some(file_path) = file_path else {
        bail!("Missing file path");
    };

    Ok(Command::Import(Options {
        file_path,
        no_header,
        json,
        max_rows,
        export_path,
    }))
}

async fn run(command: Command, mut config: ImportConfig) -> Result<()> {
    match command {
        Command::Template(output) => {
            let written = write_csv_template(&output, &config.template_file_name)?;
            println!("Template written to {}", written.display());
        }
        Command::Import(options) => {
            if options.no_header {
                config.has_header = false;
            }

            let (report, stats) = UserImporter::with_config(config)
                .import_file(&options.file_path)
                .await
                .with_context(|| format!("Failed to import {}", options.file_path.display()))?;

            if options.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report, &stats, options.max_rows);
            }

            if let Some(path) = options.export_path {
                export_valid(&report, &path)?;
            }
        }
    }

    Ok(())
}

fn print_report(report: &ImportReport, stats: &ParseStats, max_rows: usize) {
    println!("Headers: {:?}", report.headers);
    println!("Encoding: {}", stats.detected_encoding);
    println!(
        "Rows: {} total, {} valid, {} invalid ({} ms)",
        stats.total_rows, stats.valid_rows, stats.invalid_rows, stats.parse_time_ms
    );

    for record in report.rows.iter().take(max_rows) {
        let mark = if record.is_valid { "ok" } else { "invalid" };
        println!(
            "  row {:>4} [{}] {} <{}>",
            record.row_number, mark, record.data.name, record.data.email
        );
        for error in &record.errors {
            println!("           - {error}");
        }
    }

    if report.rows.len() > max_rows {
        println!("  ... {} more rows", report.rows.len() - max_rows);
    }
}

fn export_valid(report: &ImportReport, path: &Path) -> Result<()> {
    let drafts = report.valid_drafts();
    let content = export_users_csv(&drafts, &Field::ALL, true)?;
    write_export(path, &content)?;
    println!("Exported {} valid users to {}", drafts.len(), path.display());
    Ok(())
}
