use std::path::PathBuf;
use thiserror::Error;

/// Problems with the merged configuration. These halt a run before any I/O.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting `{key}`: {hint}")]
    MissingKey { key: &'static str, hint: &'static str },

    #[error("input file does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Failure of a single reverse geocoding request
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("provider returned status {status}: {message}")]
    Provider { status: i64, message: String },

    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GeocodeError::Timeout
        } else if let Some(status) = err.status() {
            GeocodeError::HttpStatus(status.as_u16())
        } else if err.is_decode() {
            GeocodeError::Parse(err.to_string())
        } else {
            GeocodeError::Network(err.to_string())
        }
    }
}

/// Errors at the table file boundary (reading input, writing output)
#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot read workbook {}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("cannot write workbook {}: {source}", .path.display())]
    Xlsx {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("workbook has no worksheets: {}", .0.display())]
    EmptyWorkbook(PathBuf),

    #[error("unsupported table format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error(
        "row on line {line} of {} has {fields} fields but the header has {width}; quote cells that contain the delimiter",
        .path.display()
    )]
    RowTooWide {
        path: PathBuf,
        line: u64,
        fields: usize,
        width: usize,
    },

    #[error("column {column} is out of range (table has {width} columns)")]
    ColumnOutOfRange { column: usize, width: usize },
}
