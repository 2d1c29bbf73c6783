use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser as ClapParser, Subcommand};
use colored::Colorize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use kscript::interpreter::Interpreter;
use kscript::source::parse_source;

#[derive(ClapParser)]
#[command(name = "kscript", about = "The kscript language interpreter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a kscript file
    Run {
        file: PathBuf,
        /// Resolve top-level imports against this directory instead of the file's
        #[arg(long)]
        base_dir: Option<PathBuf>,
        /// Collect garbage after the run and report heap statistics
        #[arg(long)]
        gc: bool,
    },
    /// Parse a file without running it
    Check { file: PathBuf },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("KSCRIPT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{}", msg.to_string().red());
    process::exit(1);
}

fn read_file(path: &PathBuf) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("Cannot open file '{}': {}", path.display(), e)))
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Run { file, base_dir, gc } => cmd_run(file, base_dir.as_ref(), *gc),
        Commands::Check { file } => cmd_check(file),
    }
}

fn cmd_run(file: &PathBuf, base_dir: Option<&PathBuf>, gc: bool) {
    let source = read_file(file);
    let stmts = parse_source(&source).unwrap_or_else(|e| fail(e));

    let mut interp = Interpreter::new();
    match base_dir {
        Some(dir) => interp.set_base_dir(dir),
        None => {
            if let Some(dir) = file.parent().filter(|d| !d.as_os_str().is_empty()) {
                interp.set_base_dir(dir);
            }
        }
    }

    if let Err(e) = interp.interpret(&stmts) {
        fail(e);
    }

    if gc {
        let freed = interp.collect_garbage();
        eprintln!(
            "{} {} live, {} freed",
            "heap:".cyan(),
            interp.heap().len(),
            freed
        );
    }
}

fn cmd_check(file: &PathBuf) {
    let source = read_file(file);
    let stmts = parse_source(&source).unwrap_or_else(|e| fail(e));
    println!(
        "{} {} ({} top-level statements)",
        "OK".green(),
        file.display(),
        stmts.len()
    );
}
