//! File parser - turns an uploaded CSV or workbook into raw rows

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::result::{Error, Result};
use crate::domain::{CellValue, RawRow};

/// A parsed upload: headers in file column order plus one RawRow per data row
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl ParsedFile {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Parse an uploaded file according to its extension
///
/// `csv` is read as comma-delimited text, `xls`/`xlsx` as the first sheet
/// of a workbook, both with the first row as headers. Any other extension
/// is rejected with `UnsupportedFormat` and no partial result. A file that
/// parses to zero data rows is rejected with `EmptyFile`.
pub fn parse_file(path: &Path) -> Result<ParsedFile> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let parsed = match extension.as_str() {
        "csv" => parse_csv(path)?,
        "xls" | "xlsx" => parse_workbook(path)?,
        "" => {
            return Err(Error::unsupported_format(
                "file has no extension; expected .csv, .xls, or .xlsx",
            ))
        }
        other => {
            return Err(Error::unsupported_format(format!(
                ".{} files are not supported; expected .csv, .xls, or .xlsx",
                other
            )))
        }
    };

    if parsed.rows.is_empty() {
        return Err(Error::EmptyFile);
    }

    debug!(
        rows = parsed.rows.len(),
        columns = parsed.headers.len(),
        "parsed {}",
        path.display()
    );

    Ok(parsed)
}

fn parse_csv(path: &Path) -> Result<ParsedFile> {
    // Flexible mode keeps ragged rows; build_row pads them out
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(clean_header).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = build_row(&headers, record.iter().map(CellValue::text));
        if row.values().all(|v| v.is_blank()) {
            continue;
        }
        rows.push(row);
    }

    Ok(ParsedFile { headers, rows })
}

fn parse_workbook(path: &Path) -> Result<ParsedFile> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_names = workbook.sheet_names().to_owned();
    let first_sheet = match sheet_names.first() {
        Some(name) => name.clone(),
        None => return Err(Error::EmptyFile),
    };

    let range = workbook.worksheet_range(&first_sheet)?;
    let mut sheet_rows = range.rows();

    let headers: Vec<String> = match sheet_rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| clean_header(&cell_value(cell).render()))
            .collect(),
        None => return Err(Error::EmptyFile),
    };

    let mut rows = Vec::new();
    for cells in sheet_rows {
        let row = build_row(&headers, cells.iter().map(cell_value));
        if row.values().all(|v| v.is_blank()) {
            continue;
        }
        rows.push(row);
    }

    Ok(ParsedFile { headers, rows })
}

/// Strip any BOM and surrounding whitespace from a header
fn clean_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_string()
}

/// Key cells by header, padding short rows with `Empty`.
/// Cells beyond the header count are dropped.
fn build_row<I>(headers: &[String], cells: I) -> RawRow
where
    I: IntoIterator<Item = CellValue>,
{
    let mut cells = cells.into_iter();
    let mut row = RawRow::new();
    for header in headers {
        row.insert(header.clone(), cells.next().unwrap_or(CellValue::Empty));
    }
    row
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Int(i) => CellValue::Number(Decimal::from(*i)),
        Data::Float(f) => Decimal::from_f64_retain(*f)
            .map(CellValue::Number)
            .unwrap_or(CellValue::Empty),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) if ndt.time() == chrono::NaiveTime::MIN => {
                CellValue::Text(ndt.date().format("%Y-%m-%d").to_string())
            }
            Some(ndt) => CellValue::Text(ndt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Decimal::from_f64_retain(dt.as_f64())
                .map(CellValue::Number)
                .unwrap_or(CellValue::Empty),
        },
        Data::DateTimeIso(s) => CellValue::text(s.as_str()),
        Data::DurationIso(s) => CellValue::text(s.as_str()),
        // Formula errors (#N/A, #DIV/0!, ...) carry no importable value
        Data::Error(_) => CellValue::Empty,
    }
}
