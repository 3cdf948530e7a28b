//! Daily period timetables.
//!
//! The school day has 17 numbered periods in three blocks: morning from
//! 07:00, afternoon from 12:30 and evening from 18:00. Lectures run in 45
//! minute periods with a 25 minute breather after the third period of the
//! morning and the afternoon. Practice sessions run back-to-back inside a
//! block, so the late morning and late afternoon periods start earlier than
//! their lecture counterparts.

use clap::ValueEnum;
use jiff::civil::{Time, time};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const PERIODS_PER_DAY: u8 = 17;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Lecture,
    Practice,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub struct SessionSlot {
    pub start: Time,
    pub end: Time,
}

const fn slot(start_hour: i8, start_minute: i8, end_hour: i8, end_minute: i8) -> SessionSlot {
    SessionSlot {
        start: time(start_hour, start_minute, 0, 0),
        end: time(end_hour, end_minute, 0, 0),
    }
}

static LECTURE: [SessionSlot; PERIODS_PER_DAY as usize] = [
    slot(7, 0, 7, 45),
    slot(7, 45, 8, 30),
    slot(8, 30, 9, 15),
    slot(9, 40, 10, 25),
    slot(10, 25, 11, 10),
    slot(11, 10, 11, 55),
    slot(12, 30, 13, 15),
    slot(13, 15, 14, 0),
    slot(14, 0, 14, 45),
    slot(15, 10, 15, 55),
    slot(15, 55, 16, 40),
    slot(16, 40, 17, 25),
    slot(18, 0, 18, 45),
    slot(18, 45, 19, 30),
    slot(19, 30, 20, 15),
    slot(20, 15, 21, 0),
    slot(21, 0, 21, 45),
];

// Three blocks (1-6, 7-12, 13-17). Lectures also break after periods 3 and
// 9; practice runs straight through, so period 4 starts at 09:15 instead of
// 09:40 and period 10 at 14:45 instead of 15:10.
static PRACTICE: [SessionSlot; PERIODS_PER_DAY as usize] = [
    slot(7, 0, 7, 45),
    slot(7, 45, 8, 30),
    slot(8, 30, 9, 15),
    slot(9, 15, 10, 0),
    slot(10, 0, 10, 45),
    slot(10, 45, 11, 30),
    slot(12, 30, 13, 15),
    slot(13, 15, 14, 0),
    slot(14, 0, 14, 45),
    slot(14, 45, 15, 30),
    slot(15, 30, 16, 15),
    slot(16, 15, 17, 0),
    slot(18, 0, 18, 45),
    slot(18, 45, 19, 30),
    slot(19, 30, 20, 15),
    slot(20, 15, 21, 0),
    slot(21, 0, 21, 45),
];

impl SessionKind {
    pub fn slots(self) -> &'static [SessionSlot] {
        match self {
            SessionKind::Lecture => &LECTURE,
            SessionKind::Practice => &PRACTICE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionKind::Lecture => "lecture",
            SessionKind::Practice => "practice",
        }
    }
}

/// Looks up the slot for a 1-based period index.
pub fn slot_for(kind: SessionKind, period: u8) -> Result<SessionSlot> {
    let index = usize::from(period)
        .checked_sub(1)
        .ok_or(Error::PeriodOutOfRange { period })?;
    kind.slots()
        .get(index)
        .copied()
        .ok_or(Error::PeriodOutOfRange { period })
}

pub fn time_for(kind: SessionKind, period: u8) -> Result<(Time, Time)> {
    let slot = slot_for(kind, period)?;
    Ok((slot.start, slot.end))
}

/// Wall-clock range covered by the contiguous periods `start..=end`.
pub fn span(kind: SessionKind, start: u8, end: u8) -> Result<(Time, Time)> {
    let first = slot_for(kind, start)?;
    let last = slot_for(kind, end)?;
    if start > end {
        return Err(Error::PeriodRange { start, end });
    }
    Ok((first.start, last.end))
}
