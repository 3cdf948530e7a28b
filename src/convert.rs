use jiff::civil::Date;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::event::{CalendarEvent, build};
use crate::expand::Expander;
use crate::schedule::{NumberedRecord, ScheduleRecord};

/// A schedule row that could not be converted.
#[derive(Debug)]
pub struct RecordFailure {
    /// 1-based position among the data rows below the header, blank rows
    /// included.
    pub row: usize,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct Conversion {
    pub events: Vec<CalendarEvent>,
    pub failures: Vec<RecordFailure>,
}

pub struct Converter {
    expander: Expander,
    cutoff: Date,
}

impl Converter {
    /// Keeps only events dated on or after `today`.
    pub fn upcoming(expander: Expander, today: Date) -> Self {
        Self {
            expander,
            cutoff: today,
        }
    }

    /// Keeps every event regardless of date.
    pub fn all(expander: Expander) -> Self {
        Self {
            expander,
            cutoff: Date::MIN,
        }
    }

    /// Converts one record into its calendar events.
    pub fn convert_record(&self, record: &ScheduleRecord) -> Result<Vec<CalendarEvent>> {
        let occurrences = self.expander.expand(record)?;
        build(&occurrences, self.cutoff)
    }

    /// Converts records in input order. A record that fails is reported
    /// under its row number and skipped; the remaining records are still
    /// converted.
    pub fn convert(&self, records: impl IntoIterator<Item = NumberedRecord>) -> Conversion {
        let mut conversion = Conversion::default();
        for (row, record) in records {
            match record.and_then(|record| self.convert_record(&record)) {
                Ok(events) => conversion.events.extend(events),
                Err(error) => {
                    warn!(row, %error, "skipping schedule row");
                    conversion.failures.push(RecordFailure { row, error });
                }
            }
        }
        info!(
            events = conversion.events.len(),
            failures = conversion.failures.len(),
            "converted schedule"
        );
        conversion
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;
    use crate::schedule::{InputFormat, read_records};

    fn record(section: &str, pattern: &str) -> ScheduleRecord {
        ScheduleRecord {
            section_code: section.into(),
            group: String::new(),
            class_name: "K68".into(),
            course_title: "Đại số".into(),
            room: "101-E3".into(),
            enrollment: String::new(),
            weekday: 2,
            start_period: 1,
            end_period: 2,
            week_pattern: pattern.into(),
            start_date: date(2024, 9, 2),
        }
    }

    #[test_log::test]
    fn test_convert_isolates_failures() {
        let mut bad_period = record("B", "11");
        bad_period.start_period = 0;
        let records = vec![
            (1, Ok(record("A", "11"))),
            (2, Ok(bad_period)),
            (
                3,
                Err(Error::DateParse {
                    value: "x".into(),
                }),
            ),
            (4, Ok(record("D", "----"))),
            (5, Ok(record("E", "1"))),
        ];

        let conversion = Converter::all(Expander::default()).convert(records);
        assert_eq!(
            conversion
                .events
                .iter()
                .map(|e| e.subject.as_str())
                .collect::<Vec<_>>(),
            vec!["Đại số - A - K68", "Đại số - A - K68", "Đại số - E - K68"]
        );
        assert_eq!(
            conversion.failures.iter().map(|f| f.row).collect::<Vec<_>>(),
            vec![2, 3]
        );
        assert!(matches!(
            conversion.failures[0].error,
            Error::PeriodOutOfRange { period: 0 }
        ));
    }

    #[test_log::test]
    fn test_convert_reports_source_rows_across_blank_lines() {
        let input = "Mã lớp học phần,Thứ,Tiết bắt đầu,Tiết kết thúc,Week Pattern,Ngày bắt đầu\n\
                     A,2,1,2,1,9/2/2024\n\
                     ,,,,,\n\
                     C,2,1,2,1,9/31/2024\n";
        let records = read_records(input.as_bytes(), &InputFormat::default()).unwrap();
        let conversion = Converter::all(Expander::default()).convert(records);
        assert_eq!(conversion.events.len(), 1);
        assert_eq!(
            conversion.failures.iter().map(|f| f.row).collect::<Vec<_>>(),
            vec![3]
        );
    }

    #[test]
    fn test_convert_upcoming_only() {
        let converter = Converter::upcoming(Expander::default(), date(2024, 9, 9));
        let conversion = converter.convert([(1, Ok(record("A", "111")))]);
        assert_eq!(
            conversion
                .events
                .iter()
                .map(|e| e.start_date)
                .collect::<Vec<_>>(),
            vec![date(2024, 9, 9), date(2024, 9, 16)]
        );
        assert!(conversion.failures.is_empty());
    }

    #[test]
    fn test_convert_is_deterministic() {
        let converter = Converter::upcoming(Expander::default(), date(2024, 9, 1));
        let run = || {
            let conversion =
                converter.convert([(1, Ok(record("A", "1-1"))), (2, Ok(record("B", "11")))]);
            crate::export::events_to_bytes(&conversion.events, true).unwrap()
        };
        assert_eq!(run(), run());
    }
}
