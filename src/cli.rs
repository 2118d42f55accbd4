//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// CallSight - vCon call analytics server
///
/// Serves an HTTP API that accepts vCon conversation-record uploads
/// and derives batch analytics plus per-call quality scores.
///
/// Examples:
///   callsight
///   callsight --port 8080 --seed 42
///   callsight --config ./callsight.toml --verbose
///   callsight --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Address to bind the HTTP server to
    ///
    /// Can also be set via CALLSIGHT_HOST or .callsight.toml.
    #[arg(long, value_name = "ADDR", env = "CALLSIGHT_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    ///
    /// Can also be set via CALLSIGHT_PORT or .callsight.toml.
    #[arg(short, long, value_name = "PORT", env = "CALLSIGHT_PORT")]
    pub port: Option<u16>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .callsight.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum accepted upload size in bytes
    #[arg(long, value_name = "BYTES")]
    pub max_upload_bytes: Option<usize>,

    /// Seed for the service-attribution randomness source
    ///
    /// Makes engine output reproducible per file id. Useful for
    /// testing and demos; leave unset in production.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .callsight.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(port) = self.port {
            if port == 0 {
                return Err("Port must be between 1 and 65535".to_string());
            }
        }

        if let Some(max_upload) = self.max_upload_bytes {
            if max_upload == 0 {
                return Err("Upload size limit must be at least 1 byte".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            host: None,
            port: None,
            config: None,
            max_upload_bytes: None,
            seed: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_defaults_validate() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_zero_port() {
        let mut args = make_args();
        args.port = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_upload_limit() {
        let mut args = make_args();
        args.max_upload_bytes = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.port = Some(0);
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
