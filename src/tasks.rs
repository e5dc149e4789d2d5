use crate::session::AnnotationPanel;
use crate::store::{Annotation, Task, TaskId};
use crate::theme::Theme;
use ratatui::{prelude::*, widgets::*};

pub(crate) const NO_TASKS: &str = "No tasks for this day.";
pub(crate) const NO_SELECTION: &str = "Select a task.";
pub(crate) const NO_NOTE: &str = "No note.";
pub(crate) const NO_HISTORY: &str = "No history.";

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum TaskListView<'a> {
    Empty(&'static str),
    Tasks(Vec<&'a Task>),
}

impl<'a> TaskListView<'a> {
    pub(crate) fn new(day_tasks: Vec<&'a Task>) -> Self {
        if day_tasks.is_empty() {
            TaskListView::Empty(NO_TASKS)
        } else {
            TaskListView::Tasks(day_tasks)
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum AnnotationView {
    Placeholder(&'static str),
    Lines(Vec<String>),
    /// The note is being edited; holds the draft text
    Editing(String),
}

impl AnnotationView {
    pub(crate) fn new(task: Option<&Task>, panel: &AnnotationPanel) -> AnnotationView {
        let Some(task) = task else {
            return AnnotationView::Placeholder(NO_SELECTION);
        };
        if let Some(draft) = panel.draft() {
            return AnnotationView::Editing(draft.to_owned());
        }
        match &task.annotation {
            Annotation::Note { text } if text.is_empty() => AnnotationView::Placeholder(NO_NOTE),
            Annotation::Note { text } => {
                AnnotationView::Lines(text.lines().map(ToOwned::to_owned).collect())
            }
            Annotation::History { entries } if entries.is_empty() => {
                AnnotationView::Placeholder(NO_HISTORY)
            }
            Annotation::History { entries } => AnnotationView::Lines(entries.clone()),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct TaskList<'a> {
    view: TaskListView<'a>,
    title: String,
    cursor: usize,
    shown: Option<TaskId>,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> TaskList<'a> {
    pub(crate) fn new(view: TaskListView<'a>, title: String, theme: &'a Theme) -> Self {
        TaskList {
            view,
            title,
            cursor: 0,
            shown: None,
            focused: false,
            theme,
        }
    }

    pub(crate) fn cursor(mut self, cursor: usize) -> Self {
        self.cursor = cursor;
        self
    }

    /// The task whose annotation is currently displayed
    pub(crate) fn shown(mut self, shown: Option<TaskId>) -> Self {
        self.shown = shown;
        self
    }

    pub(crate) fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for TaskList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(if self.focused {
                self.theme.focused_border
            } else {
                self.theme.base
            })
            .style(self.theme.base);
        let lines = match self.view {
            TaskListView::Empty(placeholder) => vec![Line::styled(placeholder, self.theme.dim)],
            TaskListView::Tasks(tasks) => {
                let mut lines = Vec::with_capacity(tasks.len() * 2);
                for (i, task) in tasks.into_iter().enumerate() {
                    let marker = if self.shown == Some(task.id) { "• " } else { "  " };
                    let style = if self.focused && i == self.cursor {
                        self.theme.cursor
                    } else {
                        self.theme.heading
                    };
                    lines.push(Line::from(vec![
                        Span::styled(marker, self.theme.base),
                        Span::styled(task.name.clone(), style),
                    ]));
                    lines.push(Line::styled(
                        format!("  {}", task.description),
                        self.theme.dim,
                    ));
                }
                lines
            }
        };
        Paragraph::new(lines).block(block).render(area, buf);
    }
}

#[derive(Clone, Debug)]
pub(crate) struct AnnotationPane<'a> {
    view: AnnotationView,
    history: bool,
    theme: &'a Theme,
}

impl<'a> AnnotationPane<'a> {
    pub(crate) fn new(view: AnnotationView, history: bool, theme: &'a Theme) -> Self {
        AnnotationPane {
            view,
            history,
            theme,
        }
    }
}

impl Widget for AnnotationPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = match (&self.view, self.history) {
            (AnnotationView::Editing(_), _) => " Note (CTRL-S save, ESC cancel) ",
            (_, true) => " History ",
            (_, false) => " Note ",
        };
        let mut block = Block::bordered().title(title).style(self.theme.base);
        let text = match self.view {
            AnnotationView::Placeholder(s) => Text::styled(s, self.theme.dim),
            AnnotationView::Lines(lines) => {
                Text::from_iter(lines.into_iter().map(|s| Line::styled(s, self.theme.base)))
            }
            AnnotationView::Editing(draft) => {
                block = block.border_style(self.theme.focused_border);
                let fresh_line = draft.is_empty() || draft.ends_with('\n');
                let mut text = Text::styled(draft, self.theme.base);
                let cursor = Span::styled("_", self.theme.cursor);
                match text.lines.last_mut() {
                    Some(line) if !fresh_line => line.push_span(cursor),
                    _ => text.push_line(Line::from(cursor)),
                }
                text
            }
        };
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(block)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: TaskId, annotation: Annotation) -> Task {
        Task {
            id,
            name: format!("Task {id}"),
            date: "2025-09-25".into(),
            description: String::new(),
            annotation,
        }
    }

    #[test]
    fn test_empty_day() {
        assert_eq!(TaskListView::new(Vec::new()), TaskListView::Empty(NO_TASKS));
    }

    #[test]
    fn test_annotation_placeholders() {
        let panel = AnnotationPanel::default();
        assert_eq!(
            AnnotationView::new(None, &panel),
            AnnotationView::Placeholder(NO_SELECTION)
        );
        let note = task(1, Annotation::Note { text: String::new() });
        assert_eq!(
            AnnotationView::new(Some(&note), &panel),
            AnnotationView::Placeholder(NO_NOTE)
        );
        let history = task(2, Annotation::History { entries: Vec::new() });
        assert_eq!(
            AnnotationView::new(Some(&history), &panel),
            AnnotationView::Placeholder(NO_HISTORY)
        );
    }

    #[test]
    fn test_annotation_lines() {
        let panel = AnnotationPanel::default();
        let note = task(
            1,
            Annotation::Note {
                text: "first\nsecond".into(),
            },
        );
        assert_eq!(
            AnnotationView::new(Some(&note), &panel),
            AnnotationView::Lines(vec!["first".into(), "second".into()])
        );
        let history = task(
            2,
            Annotation::History {
                entries: vec!["created".into(), "edited".into()],
            },
        );
        assert_eq!(
            AnnotationView::new(Some(&history), &panel),
            AnnotationView::Lines(vec!["created".into(), "edited".into()])
        );
    }

    #[test]
    fn test_editing_shows_draft() {
        let mut panel = AnnotationPanel::default();
        panel.start_editing("old".into());
        panel.push_char('!');
        let note = task(1, Annotation::Note { text: "old".into() });
        assert_eq!(
            AnnotationView::new(Some(&note), &panel),
            AnnotationView::Editing("old!".into())
        );
    }
}
