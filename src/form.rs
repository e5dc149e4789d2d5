use crate::store::{Task, TaskFields, TaskId};
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Margin, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Clear, Paragraph, Widget},
};

const OUTER_WIDTH: u16 = 52;
const OUTER_HEIGHT: u16 = 10;
const LABEL_WIDTH: usize = 6;
const DATE_PLACEHOLDER: &str = "YYYY-MM-DD";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum FormField {
    #[default]
    Name,
    Date,
    Description,
}

impl FormField {
    fn next(self) -> FormField {
        match self {
            FormField::Name => FormField::Date,
            FormField::Date => FormField::Description,
            FormField::Description => FormField::Name,
        }
    }

    fn previous(self) -> FormField {
        match self {
            FormField::Name => FormField::Description,
            FormField::Date => FormField::Name,
            FormField::Description => FormField::Date,
        }
    }

    fn label(self) -> &'static str {
        match self {
            FormField::Name => "Name:",
            FormField::Date => "Date:",
            FormField::Description => "Desc:",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum FormMode {
    Add,
    Edit(TaskId),
}

/// The single create/edit form.  Whether it adds or edits is decided purely
/// by whether a task ID is bound.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct TaskForm {
    id: Option<TaskId>,
    name: String,
    date: String,
    description: String,
    focus: FormField,
}

impl TaskForm {
    /// An empty form in add mode with the date pre-filled
    pub(crate) fn with_date(date: String) -> TaskForm {
        TaskForm {
            date,
            ..TaskForm::default()
        }
    }

    pub(crate) fn edit(task: &Task) -> TaskForm {
        TaskForm {
            id: Some(task.id),
            name: task.name.clone(),
            date: task.date.clone(),
            description: task.description.clone(),
            focus: FormField::Name,
        }
    }

    pub(crate) fn mode(&self) -> FormMode {
        match self.id {
            Some(id) => FormMode::Edit(id),
            None => FormMode::Add,
        }
    }

    pub(crate) fn focus(&self) -> FormField {
        self.focus
    }

    pub(crate) fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Date => &self.date,
            FormField::Description => &self.description,
        }
    }

    fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Date => &mut self.date,
            FormField::Description => &mut self.description,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    pub(crate) fn previous_field(&mut self) {
        self.focus = self.focus.previous();
    }

    pub(crate) fn push_char(&mut self, ch: char) {
        self.value_mut(self.focus).push(ch);
    }

    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.focus).pop();
    }

    pub(crate) fn into_parts(self) -> (Option<TaskId>, TaskFields) {
        (
            self.id,
            TaskFields {
                name: self.name,
                date: self.date,
                description: self.description,
            },
        )
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct TaskFormPopup<'a> {
    form: &'a TaskForm,
    theme: &'a Theme,
}

impl<'a> TaskFormPopup<'a> {
    pub(crate) fn new(form: &'a TaskForm, theme: &'a Theme) -> Self {
        TaskFormPopup { form, theme }
    }

    fn field_line(&self, field: FormField) -> Line<'static> {
        let mut spans = vec![Span::styled(
            format!("{:<LABEL_WIDTH$}", field.label()),
            self.theme.heading,
        )];
        let value = self.form.value(field);
        let focused = self.form.focus() == field;
        if value.is_empty() && field == FormField::Date && !focused {
            spans.push(Span::styled(DATE_PLACEHOLDER, self.theme.unfilled_field));
        } else {
            spans.push(Span::styled(value.to_owned(), self.theme.base));
        }
        if focused {
            spans.push(Span::styled("_", self.theme.cursor));
        }
        Line::from(spans)
    }
}

impl Widget for TaskFormPopup<'_> {
    /*
     * ....................................................
     * .┌─ Add task ─────────────────────────────────────┐.
     * .│                                                │.
     * .│Name: ...                                       │.
     * .│Date: ...                                       │.
     * .│Desc: ...                                       │.
     * .│                                                │.
     * .│[ENTER] save   [TAB] next field   [ESC] cancel  │.
     * .└────────────────────────────────────────────────┘.
     * ....................................................
     */

    fn render(self, area: Rect, buf: &mut Buffer) {
        let [outer_area] = Layout::horizontal([OUTER_WIDTH])
            .flex(Flex::Center)
            .areas(area);
        let [outer_area] = Layout::vertical([OUTER_HEIGHT])
            .flex(Flex::Center)
            .areas(outer_area);
        Clear.render(outer_area, buf);
        Block::new().style(self.theme.base).render(outer_area, buf);
        let block_area = outer_area.inner(Margin::new(1, 1));
        let title = match self.form.mode() {
            FormMode::Add => " Add task ",
            FormMode::Edit(_) => " Edit task ",
        };
        Block::bordered()
            .title(title)
            .title_alignment(Alignment::Left)
            .border_style(self.theme.focused_border)
            .render(block_area, buf);
        let text = Text::from_iter([
            Line::default(),
            self.field_line(FormField::Name),
            self.field_line(FormField::Date),
            self.field_line(FormField::Description),
            Line::default(),
            Line::styled("[ENTER] save   [TAB] next field   [ESC] cancel", self.theme.dim),
        ]);
        Paragraph::new(text)
            .style(self.theme.base)
            .render(block_area.inner(Margin::new(1, 1)), buf);
    }
}
