use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not parse date: {value:?}")]
    DateParse { value: String },
    #[error("period {period} is outside the daily timetable (1..=17)")]
    PeriodOutOfRange { period: u8 },
    #[error("start period {start} is after end period {end}")]
    PeriodRange { start: u8, end: u8 },
    #[error("weekday code {code} is outside 2..=8")]
    WeekdayOutOfRange { code: u8 },
    #[error("date arithmetic left the supported calendar range: {0}")]
    DateOutOfRange(#[from] jiff::Error),

    #[error("missing column {column:?}")]
    MissingColumn { column: String },
    #[error("missing value for {field}")]
    MissingField { field: &'static str },
    #[error("invalid number for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("delimiter {0:?} is not a single-byte character")]
    InvalidDelimiter(char),

    #[error("workbook has no worksheets")]
    EmptyWorkbook,

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
