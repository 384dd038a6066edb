use anyhow::Result;
use std::path::PathBuf;

// Internal modules
mod address;
mod batch;
mod chunks;
mod error;
mod geocoding;
mod writer;

pub mod config;
pub mod table;

// Re-export public types
pub use address::{AddressResult, GeocodeStatus, RESULT_COLUMNS};
pub use batch::BatchGeocoder;
pub use chunks::ChunkedReader;
pub use config::{CliOverrides, JobConfig, Settings};
pub use error::{ConfigError, GeocodeError, TableError};
pub use geocoding::{BaiduGeocoder, GeocodingService, BAIDU_REVERSE_GEOCODING_URL, REQUEST_TIMEOUT};
pub use writer::{merge_results, write_results};

/// Outcome of a complete geocoding run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of locations processed
    pub total: usize,
    /// Number of results with a non-empty formatted address
    pub with_address: usize,
    /// Whether the output table was written
    pub output_written: bool,
    /// Where the output table was (or would have been) written
    pub output_path: PathBuf,
}

/// Runs a geocoding job: chunks -> batch geocode -> accumulate -> write
pub struct GeocodeEngine {
    job: JobConfig,
    service: Box<dyn GeocodingService>,
}

impl GeocodeEngine {
    /// Create an engine with an arbitrary provider
    pub fn new(job: JobConfig, service: Box<dyn GeocodingService>) -> Self {
        Self { job, service }
    }

    /// Create an engine backed by the Baidu reverse geocoding API
    pub fn with_baidu(job: JobConfig) -> Result<Self> {
        let service = BaiduGeocoder::new(job.api_key.clone())?;
        Ok(Self::new(job, Box::new(service)))
    }

    /// Validated settings this engine runs with
    pub fn job(&self) -> &JobConfig {
        &self.job
    }

    /// Geocode every chunk in order and collect the results into one list
    pub fn geocode_chunks<I>(&self, chunks: I) -> Vec<AddressResult>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let batch = BatchGeocoder::new(self.service.as_ref(), self.job.request_delay);
        let mut all_results = Vec::new();

        for chunk in chunks {
            all_results.extend(batch.batch_resolve(&chunk));
            log::info!("Processed {} locations so far...", all_results.len());
        }

        all_results
    }

    /// Read the input column, geocode it and write the merged table
    pub fn run(&self) -> RunSummary {
        log::info!(
            "Geocoding column {} of {} with {} (chunk size {}, delay {:?})",
            self.job.column,
            self.job.input_path.display(),
            self.service.name(),
            self.job.chunk_size,
            self.job.request_delay
        );

        let chunks =
            ChunkedReader::open(&self.job.input_path, self.job.column, self.job.chunk_size);
        let results = self.geocode_chunks(chunks);

        let output_written = write_results(&results, &self.job.input_path, &self.job.output_path);

        RunSummary {
            total: results.len(),
            with_address: results.iter().filter(|r| r.has_address()).count(),
            output_written,
            output_path: self.job.output_path.clone(),
        }
    }
}
