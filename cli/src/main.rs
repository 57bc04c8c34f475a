//! rehue CLI - DOCX to styled HTML conversion with color recovery

use clap::{Parser, Subcommand};
use colored::*;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// DOCX to styled HTML conversion with color recovery
#[derive(Parser)]
#[command(
    name = "rehue",
    version,
    about = "Convert DOCX files to styled HTML",
    long_about = "rehue - DOCX to styled HTML conversion tool.\n\n\
                  Recovers run colors and table shading that generic converters\n\
                  discard and re-applies them onto the generated HTML."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document to styled HTML
    Convert {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit the full conversion result as JSON instead of HTML
        #[arg(long)]
        json: bool,

        /// Print the conversion log trace to stderr
        #[arg(long)]
        logs: bool,
    },

    /// Extract color contexts from a document as JSON
    Contexts {
        /// Input file path
        input: PathBuf,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Show document and color-context information
    Info {
        /// Input file path
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Convert {
            input,
            output,
            json,
            logs,
        } => {
            let result = rehue::convert_file(&input);

            if logs {
                for line in &result.logs {
                    eprintln!("{line}");
                }
            }

            if json {
                write_output(output.as_ref(), &serde_json::to_string_pretty(&result)?)?;
                return Ok(());
            }

            if !result.success {
                return Err(result
                    .error
                    .unwrap_or_else(|| "conversion failed".to_string())
                    .into());
            }

            write_output(output.as_ref(), &result.html)?;
            if let Some(path) = output {
                println!(
                    "{} Converted to HTML: {}",
                    "✓".green().bold(),
                    path.display()
                );
            }
        }

        Commands::Contexts { input, compact } => {
            let bytes = fs::read(&input)?;
            let package = rehue::DocxPackage::from_bytes(bytes)?;
            let xml = package.document_xml()?;
            let extraction = rehue::extract_color_contexts(&xml);

            let json = if compact {
                serde_json::to_string(&extraction.contexts)?
            } else {
                serde_json::to_string_pretty(&extraction.contexts)?
            };
            println!("{json}");
        }

        Commands::Info { input } => {
            let bytes = fs::read(&input)?;
            let size = bytes.len();
            let package = rehue::DocxPackage::from_bytes(bytes)?;
            let xml = package.document_xml()?;
            let extraction = rehue::extract_color_contexts(&xml);

            println!("{}", "Document Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            println!("{}: {} bytes", "Size".bold(), size);
            println!("{}: {}", "Parts".bold(), package.list_parts().len());
            println!("{}: {} chars", "Document XML".bold(), xml.len());

            println!("\n{}", "Color Contexts".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Total".bold(), extraction.contexts.len());
            for kind in [
                rehue::ContextKind::TextColor,
                rehue::ContextKind::ParagraphShading,
                rehue::ContextKind::RowBackground,
                rehue::ContextKind::CellBackground,
            ] {
                let count = extraction
                    .contexts
                    .iter()
                    .filter(|c| c.kind == kind)
                    .count();
                println!("{}: {}", kind.as_str().bold(), count);
            }
        }

        Commands::Version => {
            println!("{} {}", "rehue".cyan().bold(), env!("CARGO_PKG_VERSION"));
            println!("DOCX to styled HTML conversion with color recovery");
        }
    }

    Ok(())
}

fn write_output(output: Option<&PathBuf>, content: &str) -> io::Result<()> {
    match output {
        Some(path) => fs::write(path, content),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(content.as_bytes())?;
            handle.write_all(b"\n")
        }
    }
}
