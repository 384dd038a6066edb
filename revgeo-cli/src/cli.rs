use clap::Parser;
use revgeo_core::config::DEFAULT_CONFIG_FILE;
use revgeo_core::CliOverrides;
use std::path::PathBuf;

/// Reverse geocode a column of coordinates and append the addresses to the table
#[derive(Parser, Debug)]
#[command(name = "revgeo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reverse geocodes a table column via the Baidu Maps API", long_about = None)]
pub struct Args {
    /// Config file path
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Baidu Maps API key (ignored if set in the config file)
    #[arg(short = 'k', long = "api_key")]
    pub api_key: Option<String>,

    /// Input table path (ignored if set in the config file)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output table path (ignored if set in the config file)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Zero-based index of the column holding the locations (ignored if set in the config file)
    #[arg(long = "column")]
    pub column: Option<usize>,

    /// Seconds to wait after each API request (ignored if the config file has request_delay)
    #[arg(long = "delay")]
    pub delay: Option<f64>,

    /// Number of locations per chunk (ignored if set in the config file)
    #[arg(long = "chunk-size")]
    pub chunk_size: Option<usize>,

    /// Log file path
    #[arg(long = "log-file", default_value = "geocoding.log")]
    pub log_file: PathBuf,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Args {
    /// Values that may fill gaps left by the config file
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            api_key: self.api_key.clone(),
            input: self.input.clone(),
            output: self.output.clone(),
            column: self.column,
            delay: self.delay,
            chunk_size: self.chunk_size,
        }
    }
}

/// Parses command-line arguments
pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["revgeo"]).unwrap();
        assert_eq!(args.config, PathBuf::from("config.json"));
        assert_eq!(args.log_file, PathBuf::from("geocoding.log"));
        assert!(args.api_key.is_none());
        assert!(args.delay.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "revgeo", "-c", "job.json", "-k", "secret", "-i", "in.csv", "-o", "out/result.csv",
            "--column", "3", "--delay", "1.25", "--chunk-size", "200",
        ])
        .unwrap();

        let overrides = args.overrides();
        assert_eq!(args.config, PathBuf::from("job.json"));
        assert_eq!(overrides.api_key.as_deref(), Some("secret"));
        assert_eq!(overrides.input, Some(PathBuf::from("in.csv")));
        assert_eq!(overrides.output, Some(PathBuf::from("out/result.csv")));
        assert_eq!(overrides.column, Some(3));
        assert_eq!(overrides.delay, Some(1.25));
        assert_eq!(overrides.chunk_size, Some(200));
    }

    #[test]
    fn test_long_api_key_flag() {
        let args = Args::try_parse_from(["revgeo", "--api_key", "secret"]).unwrap();
        assert_eq!(args.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_negative_column_rejected() {
        assert!(Args::try_parse_from(["revgeo", "--column", "-1"]).is_err());
    }
}
