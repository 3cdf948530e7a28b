use jiff::{Span, civil::Date};

use crate::error::{Error, Result};
use crate::pattern::WeekPattern;

pub const MONDAY: u8 = 2;
pub const SUNDAY: u8 = 8;

/// Weekday code of `date`: Monday is 2 through Saturday 7, Sunday wraps to 8.
pub fn weekday_code(date: Date) -> u8 {
    // Monday-one offsets run 1..=7 with Sunday last, so shifting by one
    // lands Sunday on 8.
    date.weekday().to_monday_one_offset().unsigned_abs() + 1
}

/// First date on or after `anchor` that falls on `weekday`.
pub fn align(anchor: Date, weekday: u8) -> Result<Date> {
    if !(MONDAY..=SUNDAY).contains(&weekday) {
        return Err(Error::WeekdayOutOfRange { code: weekday });
    }
    let offset = (i64::from(weekday) - i64::from(weekday_code(anchor))).rem_euclid(7);
    Ok(anchor.checked_add(Span::new().try_days(offset)?)?)
}

/// Concrete date of every active week.
///
/// The lowest active week is taken to be the week of the aligned anchor date;
/// later weeks are offset from it in whole weeks.
pub fn project(anchor: Date, weekday: u8, weeks: &WeekPattern) -> Result<Vec<Date>> {
    let Some(first_week) = weeks.first() else {
        return Ok(Vec::new());
    };
    let aligned = align(anchor, weekday)?;
    weeks
        .weeks()
        .iter()
        .map(|&week| -> Result<Date> {
            let span = Span::new().try_weeks(i64::from(week - first_week))?;
            Ok(aligned.checked_add(span)?)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use jiff::civil::{Weekday, date};

    use super::*;

    #[test]
    fn test_weekday_code_convention() {
        // 2024-09-02 is a Monday.
        let monday = date(2024, 9, 2);
        let codes = (0..7)
            .map(|d| weekday_code(monday.checked_add(Span::new().days(d)).unwrap()))
            .collect::<Vec<_>>();
        assert_eq!(codes, vec![2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_align_moves_forward_only() {
        let monday = date(2024, 9, 2);
        assert_eq!(align(monday, 2).unwrap(), monday);
        assert_eq!(align(monday, 3).unwrap(), date(2024, 9, 3));
        assert_eq!(align(monday, 8).unwrap(), date(2024, 9, 8));

        let friday = date(2024, 9, 6);
        assert_eq!(align(friday, 2).unwrap(), date(2024, 9, 9));
        assert_eq!(align(friday, 6).unwrap(), friday);
    }

    #[test]
    fn test_align_rejects_unknown_weekday() {
        let monday = date(2024, 9, 2);
        assert!(matches!(align(monday, 1), Err(Error::WeekdayOutOfRange { code: 1 })));
        assert!(matches!(align(monday, 9), Err(Error::WeekdayOutOfRange { code: 9 })));
    }

    #[test]
    fn test_project_tuesday_from_monday_anchor() {
        let anchor = date(2024, 9, 2);
        let weeks = WeekPattern::decode("1-1--1");
        let dates = project(anchor, 3, &weeks).unwrap();
        assert_eq!(
            dates,
            vec![date(2024, 9, 3), date(2024, 9, 17), date(2024, 10, 8)]
        );
        for d in &dates {
            assert_eq!(d.weekday(), Weekday::Tuesday);
            assert_eq!(d.yesterday().unwrap().weekday(), Weekday::Monday);
        }
    }

    #[test]
    fn test_project_first_active_week_is_anchor_week() {
        let anchor = date(2025, 1, 8);
        let weeks = WeekPattern::decode("----11");
        let dates = project(anchor, 4, &weeks).unwrap();
        assert_eq!(dates, vec![date(2025, 1, 8), date(2025, 1, 15)]);
    }

    #[test]
    fn test_project_hits_requested_weekday_from_any_anchor() {
        let weeks = WeekPattern::decode("11-1");
        for anchor_offset in 0..7 {
            let anchor = date(2024, 12, 30)
                .checked_add(Span::new().days(anchor_offset))
                .unwrap();
            for code in MONDAY..=SUNDAY {
                let dates = project(anchor, code, &weeks).unwrap();
                assert_eq!(dates.len(), 3);
                assert_eq!(weekday_code(dates[0]), code);
                assert!(dates[0] >= anchor);
                assert!(dates[0] < anchor.checked_add(Span::new().days(7)).unwrap());
                for pair in dates.windows(2) {
                    let days = (pair[1] - pair[0]).get_days();
                    assert!(days > 0 && days % 7 == 0);
                }
            }
        }
    }

    #[test]
    fn test_project_empty_pattern() {
        let dates = project(date(2024, 9, 2), 3, &WeekPattern::decode("---")).unwrap();
        assert!(dates.is_empty());
        // Empty patterns short-circuit before the weekday is validated.
        let dates = project(date(2024, 9, 2), 0, &WeekPattern::default()).unwrap();
        assert!(dates.is_empty());
    }

    #[test]
    fn test_project_overflow_is_reported() {
        let weeks = WeekPattern::decode("1-1");
        assert!(matches!(
            project(Date::MAX, 8, &weeks),
            Err(Error::DateOutOfRange(_))
        ));
    }
}
