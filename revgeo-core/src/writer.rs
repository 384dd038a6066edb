use crate::address::{AddressResult, RESULT_COLUMNS};
use crate::error::TableError;
use crate::table::{self, Table};
use std::path::Path;

/// Append the result columns to `input`, row by row.
///
/// Original columns are padded to a common width first so the result columns
/// line up. If there are more results than rows (or the other way round) the
/// missing side is filled with empty cells.
pub fn merge_results(input: &Table, results: &[AddressResult]) -> Table {
    let width = input.width();
    let row_count = input.rows.len().max(results.len());

    let mut headers = input.headers.clone();
    headers.resize(width, String::new());
    headers.extend(RESULT_COLUMNS.iter().map(|c| c.to_string()));

    let rows = (0..row_count)
        .map(|i| {
            let mut row = input.rows.get(i).cloned().unwrap_or_default();
            row.resize(width, String::new());
            match results.get(i) {
                Some(result) => row.extend(result.to_cells()),
                None => row.extend(std::iter::repeat(String::new()).take(RESULT_COLUMNS.len())),
            }
            row
        })
        .collect();

    Table { headers, rows }
}

fn try_write(results: &[AddressResult], input_path: &Path, output_path: &Path) -> Result<(), TableError> {
    let input = table::read_table(input_path)?;
    if input.rows.len() != results.len() {
        log::warn!(
            "Input has {} rows but {} results were produced",
            input.rows.len(),
            results.len()
        );
    }

    let merged = merge_results(&input, results);
    table::write_table(output_path, &merged)
}

/// Merge results with the input table and write them to `output_path`.
///
/// Failures are logged, not returned; the return value says whether the
/// output file was written.
pub fn write_results(results: &[AddressResult], input_path: &Path, output_path: &Path) -> bool {
    match try_write(results, input_path, output_path) {
        Ok(()) => {
            log::info!("Results saved to {}", output_path.display());
            true
        }
        Err(e) => {
            log::error!("Failed to save results to {}: {}", output_path.display(), e);
            false
        }
    }
}
