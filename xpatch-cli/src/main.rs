//! XML Patch Tool CLI
//!
//! Applies an RFC 5261 style diff document to a base XML file and writes the
//! patched result.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use clap::Parser;
use xml_patch::{PatchOptions, Patcher, UnknownOpPolicy, XmlPrinter, XmlPrinterOptions};

/// XML Patch Tool
#[derive(Parser)]
#[command(name = "xpatch")]
#[command(version)]
#[command(about = "Apply an XML diff document to a base XML file", long_about = None)]
struct Cli {
    /// Base file to patch
    base: String,
    /// Diff file (patch XML)
    diff: String,
    /// Output file (default: stdout)
    output: Option<String>,

    /// Fail on unrecognized diff operations instead of skipping them
    #[arg(long)]
    fail_on_unknown: bool,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    match run_patch(&cli) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

/// Loads both documents, applies the patch, and writes the result.
fn run_patch(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = PatchOptions {
        unknown_ops: if cli.fail_on_unknown {
            UnknownOpPolicy::Fail
        } else {
            UnknownOpPolicy::Ignore
        },
    };
    let patcher = Patcher::with_options(options);

    eprintln!("Patching {} with {}", cli.base, cli.diff);
    let patched = patcher.patch_files(&cli.base, &cli.diff)?;

    let output: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };

    let mut printer = XmlPrinter::with_options(
        output,
        XmlPrinterOptions {
            xml_declaration: true,
        },
    );
    printer.print(&patched)?;

    eprintln!("Patch complete.");
    Ok(())
}
