//! Command-line argument definitions for the pgm-builder CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the pgm-builder tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input diagram document (TOML)
    #[arg(help = "Path to the input document")]
    pub input: String,

    /// Path to the output JSON file with the laid-out diagram
    #[arg(short, long, default_value = "out.json")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["pgm-builder", "model.toml"]);
        assert_eq!(args.input, "model.toml");
        assert_eq!(args.output, "out.json");
        assert!(args.config.is_none());
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_all_flags() {
        let args = Args::parse_from([
            "pgm-builder",
            "model.toml",
            "-o",
            "lda.json",
            "-c",
            "style.toml",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.output, "lda.json");
        assert_eq!(args.config.as_deref(), Some("style.toml"));
        assert_eq!(args.log_level, "debug");
    }
}
