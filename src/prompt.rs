use crate::help::popup;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Text},
    widgets::Widget,
};

/// Blocking yes/no question.  While it is shown, only `y` and `n` (or ESC)
/// are accepted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Confirm<'a> {
    question: &'a str,
    style: Style,
}

impl<'a> Confirm<'a> {
    pub(crate) fn new(question: &'a str, style: Style) -> Self {
        Confirm { question, style }
    }
}

impl Widget for Confirm<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text = Text::from_iter([
            Line::raw(""),
            Line::raw(format!(" {} ", self.question)),
            Line::raw(""),
            Line::raw(" [y] yes    [n] no "),
        ])
        .centered();
        popup(text, " Confirm ", self.style, area, buf);
    }
}
