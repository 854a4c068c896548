//! cvtex CLI - Context-aware LaTeX sanitizer and lualatex compile driver

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use cvtex::utils::workspace::{clear_workspace, remove_stale_outputs};
use cvtex::{
    check_document, extract_sections, format_check, sanitize_content, sanitize_file,
    CompilerConfig, FileDescriptor, LatexCompiler, LualatexCompiler,
};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "cvtex")]
#[command(version)]
#[command(about = "Cvtex - Context-aware LaTeX sanitizer and lualatex compile driver", long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Sanitize LaTeX source, escaping specials outside guarded regions
    Sanitize {
        /// Input file path (reads from stdin if not provided)
        input: Option<String>,

        /// Output file path (writes to stdout if not provided)
        #[arg(short, long, conflicts_with = "in_place")]
        output: Option<String>,

        /// Rewrite the input file in place
        #[arg(long, requires = "input")]
        in_place: bool,
    },

    /// Check LaTeX source for problems before spending a compile on it
    Check {
        /// Input file to check (reads from stdin if not provided)
        input: Option<String>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Print the section outline of a document as JSON
    Sections {
        /// Input file path (reads from stdin if not provided)
        input: Option<String>,
    },

    /// Compile a document to PDF with lualatex
    Compile {
        /// LaTeX source file to compile
        input: String,

        /// Engine timeout in seconds (overrides CVTEX_LATEX_TIMEOUT)
        #[arg(long)]
        timeout: Option<u64>,

        /// Keep auxiliary files (.aux, .log, ...) after compilation
        #[arg(long)]
        keep_aux: bool,
    },

    /// Remove old compile outputs from a workspace directory
    Clean {
        /// Workspace directory to clean
        dir: String,

        /// Remove entries older than this many days
        #[arg(long, default_value_t = 7)]
        days: u32,

        /// Remove every entry regardless of age
        #[arg(long)]
        all: bool,
    },

    /// Show version and feature info
    Info,
}

#[cfg(feature = "cli")]
fn main() -> io::Result<()> {
    init_tracing();

    match Cli::parse().command {
        Commands::Sanitize {
            input,
            output,
            in_place,
        } => run_sanitize(input, output, in_place),
        Commands::Check { input, no_color } => run_check(input, no_color),
        Commands::Sections { input } => run_sections(input),
        Commands::Compile {
            input,
            timeout,
            keep_aux,
        } => run_compile(input, timeout, keep_aux),
        Commands::Clean { dir, days, all } => run_clean(dir, days, all),
        Commands::Info => {
            print_info();
            Ok(())
        }
    }
}

#[cfg(feature = "cli")]
fn init_tracing() {
    // Diagnostics go to stderr so command output stays pipeable.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cvtex=warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[cfg(feature = "cli")]
fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

#[cfg(feature = "cli")]
fn run_sanitize(input: Option<String>, output: Option<String>, in_place: bool) -> io::Result<()> {
    if in_place {
        let Some(path) = input else {
            eprintln!("✗ --in-place requires an input file");
            std::process::exit(2);
        };
        sanitize_file(Path::new(&path))
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        eprintln!("✓ Sanitized in place: {}", path);
        return Ok(());
    }

    let content = read_input(input.as_deref())?;
    let sanitized = sanitize_content(&content);
    match output {
        Some(path) => {
            fs::write(&path, &sanitized)?;
            eprintln!("✓ Output written to: {}", path);
        }
        None => print!("{}", sanitized),
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn run_check(input: Option<String>, no_color: bool) -> io::Result<()> {
    let content = read_input(input.as_deref())?;
    let check = check_document(&content);
    println!("{}", format_check(&check, !no_color));

    if check.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn run_sections(input: Option<String>) -> io::Result<()> {
    let content = read_input(input.as_deref())?;
    let sections = extract_sections(&content);
    let serialized = serde_json::to_string_pretty(&sections)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    println!("{}", serialized);
    Ok(())
}

#[cfg(feature = "cli")]
fn run_compile(input: String, timeout: Option<u64>, keep_aux: bool) -> io::Result<()> {
    let mut config = CompilerConfig::from_env();
    if let Some(secs) = timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let compiler = LualatexCompiler::new(config);
    let descriptor = FileDescriptor::new(&input);

    let result = compiler.compile(&descriptor);
    if !keep_aux {
        compiler.cleanup(&descriptor);
    }

    match result {
        Some(result) => {
            println!("{}", result.pdf_path.display());
            Ok(())
        }
        None => {
            eprintln!("✗ Compilation failed: {}", input);
            eprintln!("  The .tex source is still usable; see the log output above.");
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "cli")]
fn run_clean(dir: String, days: u32, all: bool) -> io::Result<()> {
    let dir = PathBuf::from(dir);
    let removed = if all {
        clear_workspace(&dir)
    } else {
        remove_stale_outputs(&dir, days)
    };
    eprintln!("✓ Removed {} workspace entries", removed);
    Ok(())
}

#[cfg(feature = "cli")]
fn print_info() {
    println!("Cvtex - Context-aware LaTeX sanitizer and lualatex compile driver");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Features:");
    println!("  ✓ AST-based escaping of & $ # _ % in plain text");
    println!("  ✓ Verbatim, math and table regions preserved");
    println!("  ✓ href URLs kept raw, labels escaped");
    println!("  ✓ Regex fallback for sources that will not parse");
    println!("  ✓ lualatex driver with timeout and retry");
    println!("  ✓ Preflight checks and section outlines");
    println!();
    println!("Environment:");
    println!("  CVTEX_LATEX_TIMEOUT  engine timeout in seconds (default 30)");
    println!("  CVTEX_PROJECT_ROOT   working directory for the retry attempt");
    println!();
    println!("Repository: https://github.com/cvtex/cvtex");
    println!();
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install cvtex --features cli");
    eprintln!("  cvtex <COMMAND> [OPTIONS]");
}
