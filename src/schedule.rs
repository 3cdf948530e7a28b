use std::borrow::Cow;

use csv::ReaderBuilder;
use encoding_rs::WINDOWS_1252;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// One course section of the weekly schedule export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRecord {
    pub section_code: String,
    pub group: String,
    pub class_name: String,
    pub course_title: String,
    pub room: String,
    pub enrollment: String,
    /// Monday is 2 through Saturday 7, Sunday 8.
    pub weekday: u8,
    pub start_period: u8,
    pub end_period: u8,
    pub week_pattern: String,
    pub start_date: Date,
}

/// Input column that carries each record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMap {
    pub section_code: String,
    pub group: String,
    pub class_name: String,
    pub course_title: String,
    pub room: String,
    pub enrollment: String,
    pub weekday: String,
    pub start_period: String,
    pub end_period: String,
    pub week_pattern: String,
    pub start_date: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            section_code: "Mã lớp học phần".into(),
            group: "Nhóm".into(),
            class_name: "Lớp".into(),
            course_title: "Tên học phần".into(),
            room: "Phòng".into(),
            enrollment: "Sĩ số".into(),
            weekday: "Thứ".into(),
            start_period: "Tiết bắt đầu".into(),
            end_period: "Tiết kết thúc".into(),
            week_pattern: "Week Pattern".into(),
            start_date: "Ngày bắt đầu".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputFormat {
    /// Used when it appears in the header line; otherwise sniffed.
    pub delimiter: char,
    /// Preamble rows above the header in delimited input.
    pub skip_rows: usize,
    /// Worksheet to read; the first sheet when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// Rows above the header in a spreadsheet, counted from the top of the
    /// sheet. Registrar exports carry a twelve-row title block.
    pub sheet_skip_rows: usize,
    pub columns: FieldMap,
}

impl Default for InputFormat {
    fn default() -> Self {
        Self {
            delimiter: ',',
            skip_rows: 0,
            sheet: None,
            sheet_skip_rows: 12,
            columns: FieldMap::default(),
        }
    }
}

/// Parses an anchor date.
///
/// Accepts `M/D/YYYY`, `M/D/YY` and ISO `YYYY-MM-DD`, each optionally
/// followed by a time of day. Two-digit years 00-68 fall in the 2000s and
/// 69-99 in the 1900s.
pub fn parse_date(text: &str) -> Result<Date> {
    let text = text.trim();
    let day = text
        .split([' ', 'T'])
        .next()
        .unwrap_or_default();
    parse_month_day_year(day)
        .or_else(|| day.parse::<Date>().ok())
        .ok_or_else(|| Error::DateParse {
            value: text.to_string(),
        })
}

fn parse_month_day_year(text: &str) -> Option<Date> {
    let mut parts = text.split('/');
    let (month, day, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let month = digits(month, 1..=2)?.parse().ok()?;
    let day = digits(day, 1..=2)?.parse().ok()?;
    let year = match digits(year, 2..=4)? {
        short if short.len() == 2 => {
            let short = short.parse::<i16>().ok()?;
            if short < 69 { 2000 + short } else { 1900 + short }
        }
        long if long.len() == 4 => long.parse().ok()?,
        _ => return None,
    };
    Date::new(year, month, day).ok()
}

fn digits(text: &str, len: std::ops::RangeInclusive<usize>) -> Option<&str> {
    (len.contains(&text.len()) && text.bytes().all(|b| b.is_ascii_digit())).then_some(text)
}

/// A schedule record, or the reason it could not be read, tagged with its
/// 1-based position among the data rows below the header. Blank rows keep
/// their number even though they yield no record.
pub type NumberedRecord = (usize, Result<ScheduleRecord>);

const SNIFF_CANDIDATES: [char; 4] = [',', ';', '\t', '|'];

/// Decodes input text. UTF-8 is tried first; anything else is read as
/// Windows-1252, the superset of Latin-1 that legacy spreadsheet exports use.
pub fn decode_text(input: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(input) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            debug!("input is not UTF-8, decoding as Windows-1252");
            WINDOWS_1252.decode_without_bom_handling(input).0
        }
    }
}

/// Picks the delimiter for the header line: the configured one when it
/// appears there, otherwise the most frequent of a few common candidates.
fn sniff_delimiter(header_line: &str, configured: char) -> char {
    if header_line.contains(configured) {
        return configured;
    }
    // Earlier candidates win ties.
    SNIFF_CANDIDATES
        .into_iter()
        .rev()
        .map(|candidate| (header_line.matches(candidate).count(), candidate))
        .filter(|(count, _)| *count > 0)
        .max_by_key(|(count, _)| *count)
        .map_or(configured, |(_, candidate)| candidate)
}

/// Reads schedule rows from delimited text.
///
/// Fails as a whole only when the header cannot be read or a required column
/// is missing. Each data row yields its own result so that one malformed row
/// does not hide the rest. Rows with every cell blank are skipped but keep
/// their place in the row numbering.
pub fn read_records(input: &[u8], format: &InputFormat) -> Result<Vec<NumberedRecord>> {
    u8::try_from(format.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or(Error::InvalidDelimiter(format.delimiter))?;

    let text = decode_text(input);
    let header_line = text.lines().nth(format.skip_rows).unwrap_or_default();
    let delimiter = sniff_delimiter(header_line, format.delimiter);
    if delimiter != format.delimiter {
        debug!(?delimiter, "configured delimiter not in header, using sniffed one");
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut next_line = 1;
    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                rows.push(Err(err.into()));
                continue;
            }
        };
        // Empty lines produce no record but still occupy a row.
        if let Some(position) = row.position() {
            let line = position.line();
            rows.extend((next_line..line).map(|_| Ok(Vec::new())));
            let embedded = row.iter().map(|field| field.matches('\n').count()).sum::<usize>();
            next_line = line + 1 + embedded as u64;
        }
        rows.push(Ok(row.iter().map(str::to_string).collect()));
    }
    records_from_rows(rows.into_iter(), format.skip_rows, &format.columns)
}

/// Shared row handling for delimited text and spreadsheets: skips the
/// preamble, resolves the header, then maps every data row.
pub(crate) fn records_from_rows(
    mut rows: impl Iterator<Item = Result<Vec<String>>>,
    skip_rows: usize,
    map: &FieldMap,
) -> Result<Vec<NumberedRecord>> {
    for _ in 0..skip_rows {
        if rows.next().transpose()?.is_none() {
            return Ok(Vec::new());
        }
    }
    let Some(header) = rows.next().transpose()? else {
        return Ok(Vec::new());
    };
    let columns = Columns::resolve(&header, map)?;

    let records = (1..)
        .zip(rows)
        .filter(|(_, row)| !matches!(row, Ok(cells) if cells.iter().all(|c| c.trim().is_empty())))
        .map(|(row, cells)| (row, cells.and_then(|cells| columns.record(&cells))))
        .collect();
    Ok(records)
}

struct Columns {
    section_code: Option<usize>,
    group: Option<usize>,
    class_name: Option<usize>,
    course_title: Option<usize>,
    room: Option<usize>,
    enrollment: Option<usize>,
    weekday: usize,
    start_period: usize,
    end_period: usize,
    week_pattern: usize,
    start_date: usize,
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map_or("", |value| value.trim())
}

impl Columns {
    fn resolve(header: &[String], map: &FieldMap) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name.trim())
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| Error::MissingColumn {
                column: name.to_string(),
            })
        };

        Ok(Self {
            section_code: find(&map.section_code),
            group: find(&map.group),
            class_name: find(&map.class_name),
            course_title: find(&map.course_title),
            room: find(&map.room),
            enrollment: find(&map.enrollment),
            weekday: require(&map.weekday)?,
            start_period: require(&map.start_period)?,
            end_period: require(&map.end_period)?,
            week_pattern: require(&map.week_pattern)?,
            start_date: require(&map.start_date)?,
        })
    }

    fn record(&self, row: &[String]) -> Result<ScheduleRecord> {
        let text = |index: Option<usize>| index.map_or("", |i| cell(row, i)).to_string();

        Ok(ScheduleRecord {
            section_code: text(self.section_code),
            group: text(self.group),
            class_name: text(self.class_name),
            course_title: text(self.course_title),
            room: text(self.room),
            enrollment: text(self.enrollment),
            weekday: number(cell(row, self.weekday), "weekday")?,
            start_period: number(cell(row, self.start_period), "start period")?,
            end_period: number(cell(row, self.end_period), "end period")?,
            week_pattern: text(Some(self.week_pattern)),
            start_date: parse_date(cell(row, self.start_date))?,
        })
    }
}

/// Parses a small integer, accepting the `3.0` form spreadsheets export
/// integer cells as.
fn number(value: &str, field: &'static str) -> Result<u8> {
    if value.is_empty() {
        return Err(Error::MissingField { field });
    }
    value
        .parse::<u8>()
        .ok()
        .or_else(|| {
            let float = value.parse::<f64>().ok()?;
            (float.fract() == 0.0 && (0.0..=255.0).contains(&float)).then_some(float as u8)
        })
        .ok_or_else(|| Error::InvalidNumber {
            field,
            value: value.to_string(),
        })
}
