use std::io;

use csv::{QuoteStyle, WriterBuilder};

use crate::error::Result;
use crate::event::CalendarEvent;

const UTF8_BOM: &[u8] = "\u{feff}".as_bytes();

/// Writes events as a calendar-import CSV.
///
/// The header row is always written, even with no events. With `bom` set, the
/// output starts with a UTF-8 byte-order mark so spreadsheet tools keep the
/// Vietnamese text intact.
pub fn write_events<'a, W: io::Write>(
    mut out: W,
    events: impl IntoIterator<Item = &'a CalendarEvent>,
    bom: bool,
) -> Result<()> {
    if bom {
        out.write_all(UTF8_BOM)?;
    }

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(out);
    writer.write_record([
        "Subject",
        "Start Date",
        "Start Time",
        "End Date",
        "End Time",
        "Location",
        "Description",
    ])?;
    for event in events {
        writer.serialize(event.row())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn events_to_bytes(events: &[CalendarEvent], bom: bool) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_events(&mut buf, events, bom)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use jiff::civil::{date, time};

    use super::*;

    fn event() -> CalendarEvent {
        CalendarEvent {
            subject: "Mạng máy tính - INT2213 - K66, CLC".into(),
            start_date: date(2024, 9, 3),
            start_time: time(7, 0, 0, 0),
            end_date: date(2024, 9, 3),
            end_time: time(9, 15, 0, 0),
            location: "301-G2".into(),
            description: "301-G2\nTiết: 1-3\nMạng máy tính - INT2213 - K66, CLC".into(),
        }
    }

    #[test]
    fn test_write_events_with_bom() {
        let bytes = events_to_bytes(&[event()], true).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes).unwrap();
        let text = text.trim_start_matches('\u{feff}');
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Subject,Start Date,Start Time,End Date,End Time,Location,Description")
        );
        assert_eq!(
            lines.next(),
            Some("\"Mạng máy tính - INT2213 - K66, CLC\",09/03/2024,07:00,09/03/2024,09:15,301-G2,\"301-G2")
        );
    }

    #[test]
    fn test_write_events_reads_back() {
        let bytes = events_to_bytes(&[event(), event()], false).unwrap();
        assert!(!bytes.starts_with(UTF8_BOM));

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let rows = reader
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][6], event().description);
        assert_eq!(&rows[1][0], event().subject);
    }

    #[test]
    fn test_write_events_empty() {
        let bytes = events_to_bytes(&[], false).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Subject,Start Date,Start Time,End Date,End Time,Location,Description\n"
        );
    }
}
