mod widget;
pub(crate) use self::widget::{MonthCalendar, CALENDAR_HEIGHT, CALENDAR_WIDTH};
use crate::dates::{date_key, month_grid, GridCell};
use crate::store::Task;
use std::collections::HashSet;
use time::{Date, Month};

/// Everything needed to draw one day of the month grid
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct CellView {
    pub(crate) cell: GridCell,
    pub(crate) has_tasks: bool,
    pub(crate) selected: bool,
}

pub(crate) fn calendar_cells(
    tasks: &[Task],
    selected: Date,
    year: i32,
    month: Month,
) -> Vec<CellView> {
    let busy = tasks.iter().map(|t| t.date.as_str()).collect::<HashSet<_>>();
    let selected_key = date_key(selected);
    month_grid(year, month)
        .unwrap_or_default()
        .into_iter()
        .map(|cell| {
            let key = cell.key();
            CellView {
                cell,
                has_tasks: busy.contains(key.as_str()),
                selected: key == selected_key,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AnnotationKind, MemoryStorage, TaskStore};
    use time::macros::date;

    #[test]
    fn test_seed_markers() {
        let store = TaskStore::load(MemoryStorage::default(), AnnotationKind::Note);
        let cells = calendar_cells(store.list(), date!(2025 - 09 - 25), 2025, Month::September);
        assert_eq!(cells.len(), 31);
        let busy = cells
            .iter()
            .filter(|c| c.has_tasks)
            .map(|c| c.cell.key())
            .collect::<Vec<_>>();
        assert_eq!(busy, ["2025-09-25", "2025-09-26"]);
        let selected = cells
            .iter()
            .filter(|c| c.selected)
            .map(|c| c.cell.key())
            .collect::<Vec<_>>();
        assert_eq!(selected, ["2025-09-25"]);
        assert!(!cells[0].cell.in_current_month);
    }

    #[test]
    fn test_selected_date_in_leading_days() {
        let cells = calendar_cells(&[], date!(2025 - 08 - 31), 2025, Month::September);
        assert!(cells[0].selected);
        assert!(cells[1..].iter().all(|c| !c.selected && !c.has_tasks));
    }

    #[test]
    fn test_selected_date_outside_grid() {
        let cells = calendar_cells(&[], date!(2025 - 10 - 01), 2025, Month::September);
        assert!(cells.iter().all(|c| !c.selected));
    }
}
