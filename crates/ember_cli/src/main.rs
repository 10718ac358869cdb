//! Command-line generator: compile an editor program file to C source.
//!
//! Usage: `embergen <program.json>`. The generated source goes to stdout -
//! ready to pipe to the remote compile service - and every degraded
//! fragment is reported on stderr with the block it came from.

use std::fs;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};

use ember_blocks::standard_registry;
use ember_engine::compiler::compile_program;
use ember_engine::graph::Program;

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let path = match args.next() {
        Some(path) => path,
        None => bail!("usage: embergen <program.json>"),
    };
    if args.next().is_some() {
        bail!("usage: embergen <program.json>");
    }

    let json = fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;
    let program = Program::from_json(&json).with_context(|| format!("failed to parse {path}"))?;

    let registry = standard_registry();
    let generated = compile_program(&program, &registry)
        .with_context(|| format!("generation failed for program '{}'", program.metadata.name))?;

    for diagnostic in &generated.diagnostics {
        eprintln!(
            "warning: block {}: {}",
            diagnostic.block_id, diagnostic.reason
        );
    }

    print!("{}", generated.source);
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
