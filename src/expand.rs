use jiff::civil::Date;
use tracing::debug;

use crate::error::Result;
use crate::pattern::WeekPattern;
use crate::projection::project;
use crate::schedule::ScheduleRecord;
use crate::timetable::SessionKind;

pub const DEFAULT_PRACTICE_MARKERS: [&str; 2] = ["Thực hành", "Ứng dụng CNTT"];

/// A single dated meeting of a course section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence<'a> {
    pub record: &'a ScheduleRecord,
    pub kind: SessionKind,
    pub date: Date,
}

/// Expands schedule rows into one occurrence per active week.
#[derive(Debug, Clone)]
pub struct Expander {
    practice_markers: Vec<String>,
}

impl Default for Expander {
    fn default() -> Self {
        Self::new(DEFAULT_PRACTICE_MARKERS)
    }
}

impl Expander {
    pub fn new(practice_markers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            practice_markers: practice_markers.into_iter().map(Into::into).collect(),
        }
    }

    /// Course titles containing any practice marker use the practice
    /// timetable.
    pub fn classify(&self, course_title: &str) -> SessionKind {
        let practice = self
            .practice_markers
            .iter()
            .any(|marker| !marker.is_empty() && course_title.contains(marker.as_str()));
        if practice {
            SessionKind::Practice
        } else {
            SessionKind::Lecture
        }
    }

    pub fn expand<'a>(&self, record: &'a ScheduleRecord) -> Result<Vec<Occurrence<'a>>> {
        let weeks = WeekPattern::decode(&record.week_pattern);
        let kind = self.classify(&record.course_title);
        let dates = project(record.start_date, record.weekday, &weeks)?;

        debug!(
            section = %record.section_code,
            kind = kind.label(),
            weeks = weeks.len(),
            "expanded schedule record"
        );

        Ok(dates
            .into_iter()
            .map(|date| Occurrence { record, kind, date })
            .collect())
    }
}
