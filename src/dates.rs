use std::iter::successors;
use time::{
    error::ComponentRange, format_description::BorrowedFormatItem, macros::format_description,
    Date, Month,
};

static YMD_FMT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Canonical `YYYY-MM-DD` key under which tasks are filed.  Built from the
/// date's calendar components, so there is no timezone to shift it.
pub(crate) fn date_key(date: Date) -> String {
    let year = date.year();
    let sign = if year < 0 { "-" } else { "" };
    format!(
        "{sign}{:04}-{:02}-{:02}",
        year.unsigned_abs(),
        u8::from(date.month()),
        date.day()
    )
}

pub(crate) fn parse_date_key(key: &str) -> Option<Date> {
    Date::parse(key, &YMD_FMT).ok()
}

/// One day shown in the month grid
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct GridCell {
    pub(crate) date: Date,
    pub(crate) in_current_month: bool,
}

impl GridCell {
    pub(crate) fn day(&self) -> u8 {
        self.date.day()
    }

    pub(crate) fn key(&self) -> String {
        date_key(self.date)
    }
}

/// Returns the days to display for the given month: the tail of the previous
/// month back to the most recent Sunday, then every day of the month itself.
///
/// The grid is not padded out with days of the following month, so its length
/// varies from month to month.
pub(crate) fn month_grid(year: i32, month: Month) -> Result<Vec<GridCell>, ComponentRange> {
    let first = Date::from_calendar_date(year, month, 1)?;
    let leading = usize::from(first.weekday().number_days_from_sunday());
    let mut cells = successors(Some(first), |&d| d.previous_day())
        .skip(1)
        .take(leading)
        .map(|date| GridCell {
            date,
            in_current_month: false,
        })
        .collect::<Vec<_>>();
    cells.reverse();
    cells.extend(
        successors(Some(first), |&d| d.next_day())
            .take_while(|d| d.month() == month)
            .map(|date| GridCell {
                date,
                in_current_month: true,
            }),
    );
    Ok(cells)
}

pub(crate) fn days_in_month(year: i32, month: Month) -> u8 {
    (28..=31)
        .rev()
        .find(|&d| Date::from_calendar_date(year, month, d).is_ok())
        .unwrap_or(28)
}

/// Moves `date` by `delta` whole months, clamping the day of the month to the
/// length of the target month.  Returns `None` past the end of time.
pub(crate) fn shift_month(date: Date, delta: i32) -> Option<Date> {
    let index = date
        .year()
        .checked_mul(12)?
        .checked_add(i32::from(u8::from(date.month())) - 1)?
        .checked_add(delta)?;
    let year = index.div_euclid(12);
    let month = Month::try_from(u8::try_from(index.rem_euclid(12) + 1).ok()?).ok()?;
    let day = date.day().min(days_in_month(year, month));
    Date::from_calendar_date(year, month, day).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use time::macros::date;

    #[test]
    fn test_date_key() {
        assert_eq!(date_key(date!(2025 - 09 - 25)), "2025-09-25");
        assert_eq!(date_key(date!(0999 - 01 - 02)), "0999-01-02");
        assert_eq!(date_key(date!(2025 - 09 - 25)), date_key(date!(2025 - 09 - 25)));
    }

    #[test]
    fn test_date_key_round_trip() {
        for d in [date!(2025 - 09 - 25), date!(2024 - 02 - 29), date!(0001 - 01 - 01)] {
            assert_eq!(parse_date_key(&date_key(d)), Some(d));
        }
        let ides = Date::from_calendar_date(-44, Month::March, 15).expect("valid date");
        assert_eq!(date_key(ides), "-0044-03-15");
        assert_eq!(parse_date_key(&date_key(ides)), Some(ides));
        assert_eq!(parse_date_key("2025-13-01"), None);
        assert_eq!(parse_date_key(""), None);
    }

    #[test]
    fn test_date_key_injective_over_leap_year() {
        let keys = successors(Some(date!(2024 - 01 - 01)), |&d| d.next_day())
            .take(366)
            .map(date_key)
            .collect::<HashSet<_>>();
        assert_eq!(keys.len(), 366);
    }

    #[test]
    fn test_grid_september_2025() {
        let grid = month_grid(2025, Month::September).expect("valid month");
        assert_eq!(grid.len(), 1 + 30);
        assert_eq!(
            grid[0],
            GridCell {
                date: date!(2025 - 08 - 31),
                in_current_month: false,
            }
        );
        assert_eq!(
            grid[1],
            GridCell {
                date: date!(2025 - 09 - 01),
                in_current_month: true,
            }
        );
        assert_eq!(grid.last().map(GridCell::day), Some(30));
    }

    #[test]
    fn test_grid_starting_on_sunday() {
        let grid = month_grid(2026, Month::February).expect("valid month");
        assert_eq!(grid.len(), 28);
        assert!(grid.iter().all(|c| c.in_current_month));
        assert_eq!(grid[0].key(), "2026-02-01");
    }

    #[test]
    fn test_grid_starting_on_saturday() {
        let grid = month_grid(2025, Month::November).expect("valid month");
        assert_eq!(grid.len(), 6 + 30);
        assert_eq!(grid[0].key(), "2025-10-26");
        assert_eq!(grid[5].key(), "2025-10-31");
        assert_eq!(grid[6].key(), "2025-11-01");
    }

    #[test]
    fn test_grid_shape_for_every_month() {
        for year in [1999, 2000, 2024, 2025, 2100] {
            for m in 1..=12u8 {
                let month = Month::try_from(m).expect("valid month number");
                let grid = month_grid(year, month).expect("valid month");
                let leading = grid.iter().take_while(|c| !c.in_current_month).count();
                assert!(leading <= 6);
                assert_eq!(grid.len(), leading + usize::from(days_in_month(year, month)));
                assert!(grid[leading..].iter().all(|c| c.in_current_month));
                assert_eq!(grid[leading].day(), 1);
            }
        }
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, Month::February), 29);
        assert_eq!(days_in_month(2025, Month::February), 28);
        assert_eq!(days_in_month(1900, Month::February), 28);
        assert_eq!(days_in_month(2000, Month::February), 29);
        assert_eq!(days_in_month(2025, Month::April), 30);
        assert_eq!(days_in_month(2025, Month::December), 31);
    }

    #[test]
    fn test_shift_month() {
        assert_eq!(shift_month(date!(2025 - 09 - 25), 1), Some(date!(2025 - 10 - 25)));
        assert_eq!(shift_month(date!(2025 - 01 - 31), 1), Some(date!(2025 - 02 - 28)));
        assert_eq!(shift_month(date!(2025 - 01 - 15), -1), Some(date!(2024 - 12 - 15)));
        assert_eq!(shift_month(date!(2024 - 12 - 31), 2), Some(date!(2025 - 02 - 28)));
        assert_eq!(shift_month(date!(9999 - 12 - 01), 1), None);
    }
}
