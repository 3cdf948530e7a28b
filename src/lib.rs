pub mod config;
pub mod convert;
pub mod error;
pub mod event;
pub mod expand;
pub mod export;
pub mod http;
pub mod logging;
pub mod pattern;
pub mod projection;
pub mod schedule;
pub mod timetable;
pub mod workbook;
