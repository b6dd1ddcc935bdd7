//! kplc Command Line Interface
//!
//! Usage:
//!   kplc [OPTIONS] <input-file>
//!   kplc --help
//!
//! Examples:
//!   kplc example.kpl                      # Check syntax and declarations
//!   kplc --emit=tokens example.kpl        # Dump consumed tokens
//!   kplc --emit=symbols -o out.txt a.kpl  # Dump the symbol table
//!   kplc --permissive-lvalues a.kpl       # Warn on bad assignment targets

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use kplc::utils::errors::CompileError;
use kplc::utils::location::SourceMap;
use kplc::{symtab, Compilation, CompilerConfig};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// kplc - Syntax and semantic analyzer for KPL
#[derive(Parser, Debug)]
#[command(name = "kplc")]
#[command(version)]
#[command(about = "A syntax and semantic analyzer for KPL", long_about = None)]
struct Cli {
    /// Input file to analyze (.kpl format)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// What to emit
    #[arg(long, default_value = "check")]
    emit: EmitKind,

    /// Accept assignments to constants, types and procedures with a warning
    #[arg(long)]
    permissive_lvalues: bool,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress warnings)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EmitKind {
    /// Only report whether the program is valid
    Check,
    /// Consumed tokens, one per line
    Tokens,
    /// Symbol table of the program
    Symbols,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    info!("kplc v{}", kplc::VERSION);
    debug!("Input file: {:?}", cli.input);

    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read input file: {:?}", cli.input))?;

    let config = CompilerConfig {
        strict_lvalues: !cli.permissive_lvalues,
        trace_tokens: matches!(cli.emit, EmitKind::Tokens),
    };
    debug!("Compiler config: {:?}", config);

    info!("Parsing...");
    let compilation = match kplc::compile(&source, &config) {
        Ok(compilation) => compilation,
        Err(e) => {
            report_error(&cli.input, source, &e);
            std::process::exit(1);
        }
    };

    if !compilation.diagnostics.is_empty() {
        warn!("{} invalid symbol(s) skipped", compilation.diagnostics.len());
    }
    info!("Analysis complete: {} objects declared", compilation.symtab.object_count());

    let output = render(&compilation, cli.emit);
    write_output(&cli.output, &output)?;
    Ok(())
}

fn render(compilation: &Compilation, emit: EmitKind) -> String {
    match emit {
        EmitKind::Check => {
            let name = &compilation.symtab.object(compilation.program).name;
            format!("Program {} is valid.", name)
        }
        EmitKind::Tokens => compilation
            .tokens
            .iter()
            .map(|token| token.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
        EmitKind::Symbols => symtab::print::print_program(&compilation.symtab)
            .trim_end()
            .to_string(),
    }
}

/// Print `file:line:col: error: message`, then the source line and a caret.
fn report_error(path: &Path, source: String, error: &CompileError) {
    let Some(location) = error.location() else {
        eprintln!("{}: error: {}", path.display(), error);
        return;
    };
    eprintln!("{}:{}:{}: error: {}", path.display(), location.line, location.column, error);

    let map = SourceMap::new(source);
    if let Some(line) = map.line(location.line) {
        eprintln!("    {}", line);
        eprintln!("    {}^", " ".repeat(location.column.saturating_sub(1)));
    }
}

fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(p) => {
            fs::write(p, content)
                .with_context(|| format!("Failed to write output file: {:?}", p))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
