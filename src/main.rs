//! gridmerge - merge spreadsheets cell by cell

mod config;
mod script;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use gridmerge_core::storage::{read_sheet, render_markdown, write_markdown};
use gridmerge_core::{CellRef, GeminiSummarizer, Session};
use std::io::{self, BufReader};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gridmerge", version, about = "Merge spreadsheets by summing matching cells")]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge two or more workbooks into one
    Merge {
        /// Input workbooks; the first one is the template
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Output workbook
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Name of the output sheet
        #[arg(long)]
        sheet_name: Option<String>,

        /// Edit a cell before merging: N:A1=VALUE (N is the 1-based file number)
        #[arg(long = "edit", value_name = "N:CELL=VALUE", value_parser = parse_edit_spec)]
        edits: Vec<EditSpec>,

        /// Print a summary of the merged data
        #[arg(long)]
        summarize: bool,
    },
    /// Print the first sheet of a workbook
    Show {
        file: PathBuf,

        /// Print the grid as JSON instead of markdown
        #[arg(long, conflicts_with = "output")]
        json: bool,

        /// Write the markdown preview to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Run session commands from a script (stdin when omitted)
    Session { script: Option<PathBuf> },
}

#[derive(Clone, Debug, PartialEq)]
struct EditSpec {
    file: usize,
    cell: CellRef,
    value: String,
}

fn parse_edit_spec(s: &str) -> std::result::Result<EditSpec, String> {
    let (target, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected N:CELL=VALUE, got '{}'", s))?;
    let (file, cell) = target
        .split_once(':')
        .ok_or_else(|| format!("expected N:CELL=VALUE, got '{}'", s))?;
    let file: usize = file
        .trim()
        .parse()
        .map_err(|_| format!("invalid file number '{}'", file))?;
    if file == 0 {
        return Err("file numbers start at 1".to_string());
    }
    let cell = CellRef::from_str(cell.trim())
        .ok_or_else(|| format!("invalid cell reference '{}'", cell))?;
    Ok(EditSpec {
        file,
        cell,
        value: value.to_string(),
    })
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let (config, warnings) = config::load_config(cli.config.as_deref());
    for warning in &warnings {
        eprintln!("Warning: {}", warning);
    }

    match cli.command {
        Commands::Merge {
            files,
            output,
            sheet_name,
            edits,
            summarize,
        } => {
            let mut session = Session::new();
            let ids = session.load_paths(&files);
            for id in &ids {
                if let Some(file) = session.file(*id) {
                    if let Some(err) = file.error() {
                        eprintln!("Skipping {}: {}", file.name, err);
                    }
                }
            }

            for edit in &edits {
                let id = session
                    .id_at(edit.file - 1)
                    .ok_or_else(|| anyhow!("--edit: no file number {}", edit.file))?;
                session
                    .apply_edit(id, edit.cell, &edit.value)
                    .with_context(|| format!("--edit {}:{}", edit.file, edit.cell))?;
            }

            session.merge()?;
            let output = output.unwrap_or_else(|| PathBuf::from(&config.export.file_name));
            let label = sheet_name.unwrap_or_else(|| config.export.sheet_name.clone());
            session.export_to(&output, &label)?;
            println!(
                "Merged {} files into {}",
                session.ready_count(),
                output.display()
            );

            if summarize {
                let summarizer = GeminiSummarizer::new(config.summary.clone())?;
                if let Some(text) = session.summarize(&summarizer) {
                    println!();
                    println!("{}", text);
                }
            }
        }
        Commands::Show { file, json, output } => {
            let grid = read_sheet(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&grid)?);
            } else {
                let title = file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file.display().to_string());
                match output {
                    Some(path) => {
                        write_markdown(&path, &grid, &title)
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                        println!("Wrote {}", path.display());
                    }
                    None => print!("{}", render_markdown(&grid, &title)),
                }
            }
        }
        Commands::Session { script } => {
            let mut runner = script::ScriptRunner::new(config);
            let stdout = io::stdout();
            let stderr = io::stderr();
            let failures = match script {
                Some(path) => {
                    let file = std::fs::File::open(&path)
                        .with_context(|| format!("Failed to open {}", path.display()))?;
                    runner.run(BufReader::new(file), &mut stdout.lock(), &mut stderr.lock())?
                }
                None => runner.run(io::stdin().lock(), &mut stdout.lock(), &mut stderr.lock())?,
            };
            if failures > 0 {
                bail!("{} command(s) failed", failures);
            }
        }
    }
    Ok(())
}
