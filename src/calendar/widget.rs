use super::CellView;
use crate::theme::Theme;
use ratatui::{prelude::*, widgets::*};
use time::Month;

static HEADER: &str = " Su   Mo   Tu   We   Th   Fr   Sa  ";

/// Number of columns per day of week
const DAY_WIDTH: u16 = 5;

const DAYS_IN_WEEK: u16 = 7;

/// Width of the day grid in columns
const MAIN_WIDTH: u16 = DAY_WIDTH * DAYS_IN_WEEK;

/// Number of lines taken up by the month title, the weekday header, and its
/// rule
const HEADER_LINES: u16 = 3;

/// Number of lines taken up by each week of the calendar
const WEEK_LINES: u16 = 2;

/// A month never spans more than six Sunday-first weeks
const MAX_WEEKS: u16 = 6;

/// Outer size of the calendar, borders included
pub(crate) const CALENDAR_WIDTH: u16 = MAIN_WIDTH + 2;
pub(crate) const CALENDAR_HEIGHT: u16 = HEADER_LINES + MAX_WEEKS * WEEK_LINES + 2;

const ACS_HLINE: char = '─';

#[derive(Clone, Copy, Debug)]
pub(crate) struct MonthCalendar<'a> {
    cells: &'a [CellView],
    year: i32,
    month: Month,
    theme: &'a Theme,
    focused: bool,
}

impl<'a> MonthCalendar<'a> {
    pub(crate) fn new(cells: &'a [CellView], year: i32, month: Month, theme: &'a Theme) -> Self {
        MonthCalendar {
            cells,
            year,
            month,
            theme,
            focused: false,
        }
    }

    pub(crate) fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn day_style(&self, cv: &CellView) -> Style {
        if cv.selected {
            self.theme.selected_day
        } else if cv.has_tasks {
            self.theme.busy_day
        } else if !cv.cell.in_current_month {
            self.theme.dim
        } else {
            self.theme.base
        }
    }
}

impl Widget for MonthCalendar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(" Calendar ")
            .border_style(if self.focused {
                self.theme.focused_border
            } else {
                self.theme.base
            })
            .style(self.theme.base);
        let inner = block.inner(area);
        block.render(area, buf);
        let left = inner.width.saturating_sub(MAIN_WIDTH) / 2;
        let inner = Rect {
            x: inner.x + left,
            width: inner.width - left,
            ..inner
        };
        let mut canvas = BufferCanvas::new(inner, buf);
        canvas.draw_title(&format!("{} {}", self.month, self.year), self.theme.heading);
        canvas.draw_header(self.theme.heading);
        for (i, cv) in std::iter::zip(0u16.., self.cells) {
            canvas.draw_day(
                i / DAYS_IN_WEEK,
                i % DAYS_IN_WEEK,
                &show_day(cv),
                self.day_style(cv),
            );
        }
    }
}

fn show_day(cv: &CellView) -> String {
    let (open, close) = if cv.selected { ('[', ']') } else { (' ', ' ') };
    let mark = if cv.has_tasks { '•' } else { ' ' };
    format!("{open}{:2}{close}{mark}", cv.cell.day())
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }

    fn draw_title(&mut self, title: &str, style: Style) {
        let width = u16::try_from(title.chars().count()).unwrap_or(u16::MAX);
        self.mvprint(0, MAIN_WIDTH.saturating_sub(width) / 2, title, Some(style));
    }

    fn draw_header(&mut self, style: Style) {
        self.mvprint(1, 0, HEADER, Some(style));
        self.hline(2, 0, ACS_HLINE, MAIN_WIDTH);
    }

    fn draw_day(&mut self, week_no: u16, weekday: u16, s: &str, style: Style) {
        self.mvprint(
            week_no * WEEK_LINES + HEADER_LINES,
            DAY_WIDTH * weekday,
            s,
            Some(style),
        );
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Option<Style>) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style.unwrap_or_default());
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // A Paragraph truncates text running past the calendar's area, as
            // long as its Rect stays inside the frame.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }

    fn hline(&mut self, y: u16, x: u16, ch: char, length: u16) {
        self.mvprint(y, x, String::from(ch).repeat(length.into()), None);
    }
}
