//! GraphForge - browse and query folders of ontology files
//!
//! Usage:
//!   graphforge init ~/Documents
//!   graphforge tree
//!   graphforge query "Project Demo" -q "SELECT ?c WHERE { ?c a owl:Class } LIMIT 10"

use clap::{Parser, Subcommand};
use graphforge::api::Session;
use graphforge::config::GraphForgeConfig;
use graphforge::pipeline::Freshness;
use graphforge::storage::{FileInfo, LocalDirectory};
use graphforge::{Error, Result};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::SystemTime;

#[derive(Parser, Debug)]
#[command(name = "graphforge")]
#[command(about = "GraphForge - Triplify ontology folders and query them with SPARQL")]
struct Cli {
    /// Application folder to use instead of the remembered one
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the GraphForge folder inside PARENT and remember it
    Init {
        parent: PathBuf,
        /// Do not download the demo project
        #[arg(long)]
        no_demo: bool,
    },
    /// Request read-write access to the application folder again
    Reauth,
    /// Show the folder tree and bring every project cache up to date
    Tree,
    /// Bring every project cache up to date
    Refresh,
    /// Create a project with an empty Source Data folder
    NewProject { name: String },
    /// Copy a file into a project's Source Data folder
    Import {
        project: String,
        file: PathBuf,
        /// Name inside the project (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
    },
    Rename { project: String, from: String, to: String },
    Delete { project: String, name: String },
    Duplicate { project: String, name: String },
    /// List the Source Data files of a project with their modification times
    Files { project: String },
    /// Print a Source Data file with line numbers
    Show { project: String, name: String },
    /// Run one or more queries against a project
    Query {
        project: String,
        /// Query text; repeat for several independent queries
        #[arg(short, long = "query")]
        queries: Vec<String>,
        /// Read a query from a file; may be repeated
        #[arg(short, long)]
        file: Vec<PathBuf>,
        /// Print the normalized query text
        #[arg(long)]
        show_query: bool,
        /// Extra prefix declaration as PREFIX=NAMESPACE; may be repeated
        #[arg(short, long = "prefix", value_parser = parse_prefix)]
        prefixes: Vec<(String, String)>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "info" }),
    )
    .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::PermissionDenied(message)) => {
            eprintln!("Error: {}", message);
            eprintln!("Run `graphforge reauth` to grant access to the application folder again.");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Arc::new(match &cli.config {
        Some(path) => GraphForgeConfig::load(path)?,
        None => GraphForgeConfig::default(),
    });

    if let Command::Init { parent, no_demo } = &cli.command {
        let session = Session::initialize(parent, config, !no_demo).await?;
        println!("Application folder: {}", session.workspace().root().path().display());
        report_refresh(&session)?;
        return Ok(());
    }

    let session = match &cli.root {
        Some(root) => Session::new(LocalDirectory::open(root)?, config)?,
        None => Session::restore(config)?,
    };
    let workspace = session.workspace();

    match cli.command {
        Command::Init { .. } => {}
        Command::Reauth => {
            session.reauthorize()?;
            println!("Directory access re-authorized.");
        }
        Command::Tree => {
            report_refresh(&session)?;
            print!("{}", workspace.tree()?);
        }
        Command::Refresh => report_refresh(&session)?,
        Command::NewProject { name } => {
            workspace.create_project(&name)?;
            println!("Project '{}' created.", name);
        }
        Command::Import { project, file, name } => {
            let name = match name {
                Some(name) => name,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .ok_or_else(|| Error::NotFound(file.display().to_string()))?,
            };
            workspace.import_file(&project, &name, &fs::read(&file)?)?;
            println!("Imported '{}' into '{}'.", name, project);
        }
        Command::Rename { project, from, to } => {
            workspace.rename_file(&project, &from, &to)?;
            println!("Renamed '{}' to '{}'.", from, to);
        }
        Command::Delete { project, name } => {
            workspace.delete_file(&project, &name)?;
            println!("Deleted '{}'.", name);
        }
        Command::Duplicate { project, name } => {
            let copy = workspace.duplicate_file(&project, &name)?;
            println!("Duplicated '{}' as '{}'.", name, copy);
        }
        Command::Files { project } => {
            let now = SystemTime::now();
            for info in workspace.file_dates(&project)? {
                println!("{}", describe_file(&info, now));
            }
        }
        Command::Show { project, name } => {
            print!("{}", workspace.read_numbered(&project, &name)?);
        }
        Command::Query { project, mut queries, file, show_query, prefixes } => {
            for path in &file {
                queries.push(fs::read_to_string(path)?);
            }
            if queries.is_empty() {
                return Err(Error::Query("no query given, use --query or --file".to_string()));
            }

            let source_data = workspace.source_data(&project)?;
            session.triplifier().ensure_fresh(&source_data)?;
            let size = session.select_project(&project)?;
            println!("Loaded {} quads from '{}'.", size, project);
            for (prefix, namespace) in &prefixes {
                session.set_prefix(prefix, namespace);
            }

            for (i, result) in session.run_queries(&queries).into_iter().enumerate() {
                println!("\n== Query {} ==", i + 1);
                match result {
                    Ok(outcome) => {
                        if show_query {
                            println!("{}\n", outcome.query);
                        }
                        print!("{}", outcome.table);
                        if let Some(plot) = outcome.plot {
                            println!();
                            print!("{}", plot);
                        }
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
        }
    }
    Ok(())
}

fn parse_prefix(arg: &str) -> std::result::Result<(String, String), String> {
    match arg.split_once('=') {
        Some((prefix, namespace)) if !namespace.is_empty() => {
            Ok((prefix.to_string(), namespace.to_string()))
        }
        _ => Err(format!("expected PREFIX=NAMESPACE, got {:?}", arg)),
    }
}

fn report_refresh(session: &Session<LocalDirectory>) -> Result<()> {
    for outcome in session.refresh()? {
        match outcome.result {
            Ok(Freshness::UpToDate) => println!("{}: up to date", outcome.project),
            Ok(Freshness::Regenerated(report)) => {
                println!(
                    "{}: wrote {} quads from {} files",
                    outcome.project, report.quads_written, report.files_written
                );
                for skipped in report.files_skipped {
                    println!("  skipped {}: {}", skipped.name, skipped.reason);
                }
            }
            Err(e) => println!("{}: {}", outcome.project, e),
        }
    }
    Ok(())
}

fn describe_file(info: &FileInfo, now: SystemTime) -> String {
    let age = now.duration_since(info.modified).map(|d| d.as_secs()).unwrap_or(0);
    let age = match age {
        0..=59 => format!("{}s ago", age),
        60..=3599 => format!("{}m ago", age / 60),
        3600..=86_399 => format!("{}h ago", age / 3600),
        _ => format!("{}d ago", age / 86_400),
    };
    format!("{:<40} {:>10} bytes  modified {}", info.name, info.size, age)
}
