//! Command-line driver: discovers `.phd` sources, elaborates each
//! independently, and writes one `.sv` file per emitted module.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use phd_common::Interner;
use phd_diagnostics::{DiagnosticRenderer, DiagnosticSink, TerminalRenderer};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

/// Compiles phd hardware description sources into synthesizable SystemVerilog.
#[derive(Parser, Debug)]
#[command(name = "phd", version, about)]
struct Cli {
    /// A `.phd` file, or a directory containing `.phd` files (searched
    /// non-recursively).
    input: PathBuf,

    /// Directory to write emitted `.sv` files into.
    #[arg(short = 'o', long = "out", default_value = "../hdl")]
    out_dir: PathBuf,

    /// Show per-stage timing and full diagnostic detail (notes and help).
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let files = match discover_inputs(&cli.input) {
        Ok(files) => files,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };

    if files.is_empty() {
        tracing::warn!(path = %cli.input.display(), "no .phd files found");
        return ExitCode::SUCCESS;
    }
    tracing::info!(count = files.len(), "discovered source files");

    if let Err(err) = fs::create_dir_all(&cli.out_dir) {
        eprintln!("error: could not create output directory {}: {err}", cli.out_dir.display());
        return ExitCode::from(2);
    }

    let color = stdout_is_terminal();
    let results: Vec<bool> = files
        .par_iter()
        .map(|path| compile_one(path, &cli.out_dir, cli.verbose, color))
        .collect();

    if results.iter().all(|ok| *ok) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

/// Compiles a single file: parse, elaborate, and (if error-free) emit every
/// module it produced. Returns `false` if any diagnostic of error severity
/// was raised, in which case no `.sv` files are written for this file.
fn compile_one(path: &Path, out_dir: &Path, verbose: bool, color: bool) -> bool {
    let span = tracing::info_span!("compile", file = %path.display());
    let _enter = span.enter();

    let mut source_db = phd_source::SourceDb::new();
    let file_id = match source_db.load_file(path) {
        Ok(id) => id,
        Err(err) => {
            eprintln!("error: could not read {}: {err}", path.display());
            return false;
        }
    };
    let source = source_db.get_file(file_id).content.clone();

    let interner = Interner::new();
    let sink = DiagnosticSink::new();

    let parsed = phd_parser::parse_file(file_id, &source, &interner, &sink);
    let ctx = phd_elaborate::elaborate(std::slice::from_ref(&parsed), interner, &sink);

    let diagnostics = sink.diagnostics();
    if !diagnostics.is_empty() {
        let renderer = TerminalRenderer::new(color, 100);
        for diag in &diagnostics {
            let rendered = renderer.render(diag, &source_db);
            eprint!("{}", trim_detail(&rendered, verbose));
        }
    }

    if sink.has_errors() {
        tracing::error!(modules = ctx.design.module_count(), "compilation failed");
        return false;
    }

    let emitted = match phd_emit::emit_design(&ctx.design, &ctx.interner) {
        Ok(emitted) => emitted,
        Err(err) => {
            eprintln!("internal error while emitting {}: {err}", path.display());
            return false;
        }
    };
    for file in &emitted {
        let out_path = out_dir.join(&file.file_name);
        if let Err(err) = fs::write(&out_path, &file.source) {
            eprintln!("error: could not write {}: {err}", out_path.display());
            return false;
        }
        tracing::debug!(path = %out_path.display(), "wrote module");
    }
    tracing::info!(modules = emitted.len(), "compilation succeeded");
    true
}

/// Drops `note:`/`help:` lines from a rendered diagnostic unless verbose
/// output was requested.
fn trim_detail(rendered: &str, verbose: bool) -> String {
    if verbose {
        return rendered.to_string();
    }
    rendered
        .lines()
        .filter(|l| {
            let trimmed = l.trim_start();
            !trimmed.starts_with("= note:") && !trimmed.starts_with("= help:")
        })
        .map(|l| format!("{l}\n"))
        .collect()
}

/// Resolves `input` to the list of `.phd` files to compile: itself, if it's
/// a file, or every `.phd` entry directly inside it (no recursion) if it's a
/// directory.
fn discover_inputs(input: &Path) -> std::io::Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a file or directory", input.display()),
        ));
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(input)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "phd") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

/// Whether stdout looks like an interactive terminal, used to decide
/// whether to emit ANSI color in rendered diagnostics. There is no
/// dedicated `--color` flag; this heuristic is the only signal.
fn stdout_is_terminal() -> bool {
    std::env::var("TERM").is_ok_and(|v| v != "dumb")
}
