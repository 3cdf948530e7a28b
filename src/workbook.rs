//! Spreadsheet input (XLSX, XLSM, XLS, ODS) read through calamine.
//!
//! Cells are rendered to text and fed through the same header resolution and
//! record mapping as delimited input, so both paths accept the same column
//! layouts and report the same per-row errors.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use jiff::{Span, civil::date};
use tracing::debug;

use crate::error::{Error, Result};
use crate::schedule::{FieldMap, InputFormat, NumberedRecord, read_records, records_from_rows};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Delimited,
    Spreadsheet,
}

impl InputKind {
    /// Recognises a spreadsheet by its container signature: ZIP for
    /// XLSX/XLSM/ODS, OLE compound file for legacy XLS.
    pub fn sniff(input: &[u8]) -> Self {
        if input.starts_with(ZIP_MAGIC) || input.starts_with(OLE_MAGIC) {
            InputKind::Spreadsheet
        } else {
            InputKind::Delimited
        }
    }

    /// Picks the reader by file extension, falling back to the content.
    pub fn detect(path: &Path, input: &[u8]) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => InputKind::Spreadsheet,
            Some("csv" | "tsv" | "txt") => InputKind::Delimited,
            _ => Self::sniff(input),
        }
    }
}

/// Reads schedule rows from either input kind.
pub fn read_input(
    input: &[u8],
    kind: InputKind,
    format: &InputFormat,
) -> Result<Vec<NumberedRecord>> {
    match kind {
        InputKind::Delimited => read_records(input, format),
        InputKind::Spreadsheet => read_workbook(input, format),
    }
}

/// Reads schedule rows from a workbook, using the configured sheet or the
/// first one. `sheet_skip_rows` counts from the top of the sheet.
pub fn read_workbook(input: &[u8], format: &InputFormat) -> Result<Vec<NumberedRecord>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(input))?;
    let sheet = match &format.sheet {
        Some(sheet) => sheet.clone(),
        None => workbook
            .sheet_names()
            .into_iter()
            .next()
            .ok_or(Error::EmptyWorkbook)?,
    };
    debug!(%sheet, "reading worksheet");
    let range = workbook.worksheet_range(&sheet)?;
    records_from_range(&range, format.sheet_skip_rows, &format.columns)
}

pub(crate) fn records_from_range(
    range: &Range<Data>,
    skip_rows: usize,
    map: &FieldMap,
) -> Result<Vec<NumberedRecord>> {
    let Some((first_row, _)) = range.start() else {
        return Ok(Vec::new());
    };
    // The range begins at the first used row; pad back to the sheet top.
    let leading = (0..first_row).map(|_| Ok(Vec::new()));
    let rows = range
        .rows()
        .map(|row| Ok(row.iter().map(cell_text).collect::<Vec<_>>()));
    records_from_rows(leading.chain(rows), skip_rows, map)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => text.clone(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => {
            let serial = value.as_f64();
            serial_date(serial).unwrap_or_else(|| serial.to_string())
        }
    }
}

/// Renders a 1900-system serial day number as an ISO date.
fn serial_date(serial: f64) -> Option<String> {
    if !serial.is_finite() {
        return None;
    }
    let days = Span::new().try_days(serial.floor() as i64).ok()?;
    let day = date(1899, 12, 30).checked_add(days).ok()?;
    Some(day.to_string())
}
