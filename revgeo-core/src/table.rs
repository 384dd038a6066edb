//! Table files
//!
//! Spreadsheets (`.xls`, `.xlsx`, `.xlsm`, `.xlsb`, `.ods`) are read with
//! `calamine`, first worksheet only, and written as `.xlsx` workbooks with
//! `rust_xlsxwriter`. Everything else is delimited text through the `csv`
//! crate: `.tsv`/`.tab`/`.txt` are tab-separated, anything else is
//! comma-separated.
//!
//! Legacy `.xls` output is written in the `.xlsx` container since no writer
//! for the old binary format is available; the reader detects the container
//! from the file contents, so such files still read back.

use crate::error::TableError;
use calamine::{Data, Reader};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// A table with a header row. Rows may be shorter than the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Number of columns: the widest of the header and every row
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    /// All data cells of one column. Short rows contribute an empty string.
    pub fn column(&self, index: usize) -> Result<Vec<String>, TableError> {
        let width = self.width();
        if index >= width {
            return Err(TableError::ColumnOutOfRange {
                column: index,
                width,
            });
        }

        Ok(self
            .rows
            .iter()
            .map(|row| row.get(index).cloned().unwrap_or_default())
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableFormat {
    Delimited(u8),
    Workbook,
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

fn format_for(path: &Path) -> TableFormat {
    match extension_of(path).as_str() {
        "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => TableFormat::Workbook,
        "tsv" | "tab" | "txt" => TableFormat::Delimited(b'\t'),
        _ => TableFormat::Delimited(b','),
    }
}

fn io_error(path: &Path, source: std::io::Error) -> TableError {
    TableError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_error(path: &Path, source: csv::Error) -> TableError {
    TableError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

fn xlsx_error(path: &Path, source: XlsxError) -> TableError {
    TableError::Xlsx {
        path: path.to_path_buf(),
        source,
    }
}

/// Read a whole table into memory. The first row is the header.
pub fn read_table(path: &Path) -> Result<Table, TableError> {
    let table = match format_for(path) {
        TableFormat::Workbook => read_workbook(path)?,
        TableFormat::Delimited(delimiter) => read_delimited(path, delimiter)?,
    };

    log::debug!("Read {} rows from {}", table.rows.len(), path.display());
    Ok(table)
}

/// Rows wider than the header are rejected: they almost always mean an
/// unquoted delimiter inside a cell (e.g. `116.40,39.90` in a CSV), and
/// reading them would silently split that cell.
fn read_delimited(path: &Path, delimiter: u8) -> Result<Table, TableError> {
    let file = fs::File::open(path).map_err(|e| io_error(path, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        if record.len() > headers.len() {
            return Err(TableError::RowTooWide {
                path: path.to_path_buf(),
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                fields: record.len(),
                width: headers.len(),
            });
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table { headers, rows })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn read_workbook(path: &Path) -> Result<Table, TableError> {
    let bytes = fs::read(path).map_err(|e| io_error(path, e))?;

    // Detect the container from the contents, not the extension
    let mut workbook =
        calamine::open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|source| {
            TableError::Workbook {
                path: path.to_path_buf(),
                source,
            }
        })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TableError::EmptyWorkbook(path.to_path_buf()))?
        .map_err(|source| TableError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;

    // A used range that starts right of column A keeps its column indices
    let offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    let mut rows = range.rows().map(|cells| {
        let mut row = vec![String::new(); offset];
        row.extend(cells.iter().map(cell_text));
        row
    });

    let headers = rows.next().unwrap_or_default();
    Ok(Table {
        headers,
        rows: rows.collect(),
    })
}

/// Read the data cells of one column (zero-based)
pub fn read_column(path: &Path, column: usize) -> Result<Vec<String>, TableError> {
    read_table(path)?.column(column)
}

/// Write a table, creating the parent directory if it is missing.
///
/// `.xls` and `.xlsx` paths get an `.xlsx` workbook; other spreadsheet
/// extensions cannot be written.
pub fn write_table(path: &Path, table: &Table) -> Result<(), TableError> {
    let format = format_for(path);
    if format == TableFormat::Workbook && !matches!(extension_of(path).as_str(), "xls" | "xlsx") {
        return Err(TableError::UnsupportedFormat(path.to_path_buf()));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
            log::info!("Created output directory: {}", parent.display());
        }
    }

    match format {
        TableFormat::Workbook => write_workbook(path, table),
        TableFormat::Delimited(delimiter) => write_delimited(path, table, delimiter),
    }
}

/// Every record is padded to the table width so the file stays rectangular
fn write_delimited(path: &Path, table: &Table, delimiter: u8) -> Result<(), TableError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let width = table.width();
    let pad = |cells: &[String]| -> Vec<String> {
        let mut record = cells.to_vec();
        record.resize(width, String::new());
        record
    };

    writer
        .write_record(pad(&table.headers))
        .map_err(|e| csv_error(path, e))?;
    for row in &table.rows {
        writer.write_record(pad(row)).map_err(|e| csv_error(path, e))?;
    }

    writer.flush().map_err(|e| io_error(path, e))
}

/// Cells are written as strings; empty cells are left blank
fn write_workbook(path: &Path, table: &Table) -> Result<(), TableError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (row_index, row) in std::iter::once(&table.headers).chain(&table.rows).enumerate() {
        let row_num = u32::try_from(row_index)
            .map_err(|_| xlsx_error(path, XlsxError::RowColumnLimitError))?;

        for (col_index, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let col_num = u16::try_from(col_index)
                .map_err(|_| xlsx_error(path, XlsxError::RowColumnLimitError))?;
            worksheet
                .write_string(row_num, col_num, cell.as_str())
                .map_err(|e| xlsx_error(path, e))?;
        }
    }

    workbook.save(path).map_err(|e| xlsx_error(path, e))
}
