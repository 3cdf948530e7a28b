use jiff::civil::{Date, Time};
use serde::Serialize;

use crate::error::Result;
use crate::expand::Occurrence;
use crate::timetable::span;

pub const DATE_FORMAT: &str = "%m/%d/%Y";
pub const TIME_FORMAT: &str = "%H:%M";

/// A single calendar entry in the shape accepted by calendar importers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub subject: String,
    pub start_date: Date,
    pub start_time: Time,
    pub end_date: Date,
    pub end_time: Time,
    pub location: String,
    pub description: String,
}

impl CalendarEvent {
    pub fn from_occurrence(occurrence: &Occurrence<'_>) -> Result<Self> {
        let record = occurrence.record;
        let (start_time, end_time) =
            span(occurrence.kind, record.start_period, record.end_period)?;

        let subject = format!(
            "{} - {} - {}",
            record.course_title, record.section_code, record.class_name
        );
        let description = format!(
            "{}\nTiết: {}-{}\n{}",
            record.room, record.start_period, record.end_period, subject
        );

        Ok(Self {
            subject,
            start_date: occurrence.date,
            start_time,
            end_date: occurrence.date,
            end_time,
            location: record.room.clone(),
            description,
        })
    }

    pub fn row(&self) -> EventRow {
        EventRow {
            subject: self.subject.clone(),
            start_date: self.start_date.strftime(DATE_FORMAT).to_string(),
            start_time: self.start_time.strftime(TIME_FORMAT).to_string(),
            end_date: self.end_date.strftime(DATE_FORMAT).to_string(),
            end_time: self.end_time.strftime(TIME_FORMAT).to_string(),
            location: self.location.clone(),
            description: self.description.clone(),
        }
    }
}

/// Text form of a [`CalendarEvent`], with the column names calendar
/// importers expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRow {
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "Start Time")]
    pub start_time: String,
    #[serde(rename = "End Date")]
    pub end_date: String,
    #[serde(rename = "End Time")]
    pub end_time: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Description")]
    pub description: String,
}

/// Builds calendar events for every occurrence dated on or after `today`.
///
/// Past occurrences are dropped without error. Every occurrence is checked
/// against the timetable first, so a bad period fails the build even when the
/// occurrence itself would have been filtered out.
pub fn build(occurrences: &[Occurrence<'_>], today: Date) -> Result<Vec<CalendarEvent>> {
    let mut events = Vec::with_capacity(occurrences.len());
    for occurrence in occurrences {
        let event = CalendarEvent::from_occurrence(occurrence)?;
        if event.start_date >= today {
            events.push(event);
        }
    }
    Ok(events)
}
