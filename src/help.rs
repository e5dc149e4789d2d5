use ratatui::{
    buffer::Buffer,
    layout::Flex,
    layout::{Alignment, Layout, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Widget},
};

static TEXT: &[&str] = &[
    "Calendar\n",
    "  h, l, LEFT, RIGHT     Previous/next day\n",
    "  k, j, UP, DOWN        Previous/next week\n",
    "  [, ], PAGE UP/DOWN    Previous/next month\n",
    "  t, HOME               Jump to today\n",
    "Tasks\n",
    "  k, j, UP, DOWN        Move between tasks\n",
    "  ENTER                 Show note or history\n",
    "  e                     Edit task\n",
    "  d                     Delete task\n",
    "Anywhere\n",
    "  TAB                   Switch calendar/tasks\n",
    "  a                     Add a task\n",
    "  n                     Edit note (CTRL-S saves)\n",
    "  T                     Toggle light/dark theme\n",
    "  ?                     Show this help\n",
    "  q, ESC                Quit\n",
    "\n",
    "Press the Any Key to dismiss.\n",
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Help(pub(crate) Style);

impl Widget for Help {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = TEXT.iter().map(|&s| Line::raw(s)).collect::<Vec<_>>();
        popup(Text::from(lines), " Commands ", self.0, area, buf);
    }
}

/// Draws `text` in a bordered box centered in `area`, blanking whatever was
/// beneath it.  On a small screen the box is clipped to `area`.
pub(crate) fn popup(text: Text<'_>, title: &str, style: Style, area: Rect, buf: &mut Buffer) {
    let height = u16::try_from(text.height())
        .unwrap_or(u16::MAX)
        .min(area.height.saturating_sub(2))
        .saturating_add(2);
    let width = u16::try_from(text.width())
        .unwrap_or(u16::MAX)
        .min(area.width.saturating_sub(4))
        .saturating_add(2);
    let para = Paragraph::new(text)
        .block(
            Block::bordered()
                .title(title)
                .title_alignment(Alignment::Center),
        )
        .style(style);
    let [popup_area] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
    let [popup_area] = Layout::vertical([height])
        .flex(Flex::Center)
        .areas(popup_area);
    let outer_area = Rect {
        x: popup_area.x.saturating_sub(1),
        y: popup_area.y,
        width: popup_area.width.saturating_add(2),
        height: popup_area.height,
    }
    .intersection(area);
    Clear.render(outer_area, buf);
    Block::new().style(style).render(outer_area, buf);
    para.render(popup_area, buf);
}
