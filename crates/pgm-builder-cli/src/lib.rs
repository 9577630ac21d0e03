//! CLI logic for the pgm-builder tool.
//!
//! Reads a diagram document, lays it out, and writes the resulting
//! [`Diagram`](pgm_builder::Diagram) as JSON for a rendering backend.

pub mod error_adapter;

mod args;
mod config;
mod document;
mod error;

pub use args::Args;
pub use config::ConfigError;
pub use document::Document;
pub use error::CliError;

use std::fs;

use log::{debug, info};

/// Run the pgm-builder CLI application
///
/// This function processes the input document through the layout pipeline
/// and writes the resulting diagram to the output file.
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed documents
/// - Invalid diagram declarations
pub fn run(args: &Args) -> Result<(), CliError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing document"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let document =
        Document::parse(&source).map_err(|err| CliError::new_document_error(err, &*source))?;
    debug!("Document parsed successfully");

    let pgm = document.into_pgm(app_config)?;
    let diagram = pgm.build()?;

    let json = serde_json::to_string_pretty(&diagram)?;
    fs::write(&args.output, json)?;

    info!(output_file = args.output; "Diagram exported successfully");

    Ok(())
}
