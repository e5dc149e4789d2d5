use crate::calendar::{MonthCalendar, CALENDAR_HEIGHT, CALENDAR_WIDTH};
use crate::form::TaskFormPopup;
use crate::help::Help;
use crate::prompt::Confirm;
use crate::session::{Intent, Session};
use crate::store::{KeyValueStore, TaskId};
use crate::tasks::{AnnotationPane, TaskList};
use crossterm::event::{read, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Paragraph, Widget},
    DefaultTerminal,
};
use std::io::{self, Write};
use time::{Date, Duration};

static STATUS_HINT: &str = " ? help   a add task   n edit note   TAB switch panel   q quit";

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct App<S> {
    session: Session<S>,
    state: AppState,
    focus: Focus,
    /// Index of the highlighted task among the selected day's tasks
    cursor: usize,
}

impl<S: KeyValueStore> App<S> {
    pub(crate) fn new(session: Session<S>) -> App<S> {
        App {
            session,
            state: AppState::Browsing,
            focus: Focus::Calendar,
            cursor: 0,
        }
    }

    pub(crate) fn run(mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        while !self.quitting() {
            self.draw(terminal)?;
            self.handle_input()?;
        }
        Ok(())
    }

    fn draw(&self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = read()?.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !self.handle_key(code, modifiers) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let plain = (KeyModifiers::NONE | KeyModifiers::SHIFT).contains(modifiers);
        match self.state {
            AppState::EditingNote => self.handle_note_key(code, modifiers),
            _ if !plain => false,
            AppState::Browsing => self.handle_browse_key(code),
            AppState::Helping => {
                self.state = AppState::Browsing;
                true
            }
            AppState::Form => self.handle_form_key(code),
            AppState::Confirming(id) => match code {
                KeyCode::Char('y' | 'Y') => {
                    self.session.update(Intent::DeleteTask(id));
                    self.clamp_cursor();
                    self.state = AppState::Browsing;
                    true
                }
                KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                    self.state = AppState::Browsing;
                    true
                }
                _ => false,
            },
            AppState::Quitting => false,
        }
    }

    fn handle_browse_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Tab => {
                self.focus = self.focus.other();
                self.clamp_cursor();
                true
            }
            KeyCode::Char('a') => {
                self.session.update(Intent::NewTask);
                self.state = AppState::Form;
                true
            }
            KeyCode::Char('n') => {
                if !self.session.can_edit_annotation() {
                    return false;
                }
                self.session.update(Intent::ToggleAnnotationEdit);
                if self.session.annotation_panel().is_editing() {
                    self.state = AppState::EditingNote;
                }
                true
            }
            KeyCode::Char('T') => {
                self.session.update(Intent::ToggleTheme);
                true
            }
            KeyCode::Char('?') => {
                self.state = AppState::Helping;
                true
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                self.state = AppState::Quitting;
                true
            }
            _ => match self.focus {
                Focus::Calendar => self.handle_calendar_key(code),
                Focus::Tasks => self.handle_task_key(code),
            },
        }
    }

    fn handle_calendar_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('h') | KeyCode::Left => self.move_days(-1),
            KeyCode::Char('l') | KeyCode::Right => self.move_days(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_days(-7),
            KeyCode::Char('j') | KeyCode::Down => self.move_days(7),
            KeyCode::Char('[') | KeyCode::PageUp => self.change_date(Intent::PreviousMonth),
            KeyCode::Char(']') | KeyCode::PageDown => self.change_date(Intent::NextMonth),
            KeyCode::Char('t') | KeyCode::Home => self.change_date(Intent::SelectToday),
            _ => false,
        }
    }

    fn handle_task_key(&mut self, code: KeyCode) -> bool {
        let ids = self
            .session
            .day_tasks()
            .iter()
            .map(|t| t.id)
            .collect::<Vec<_>>();
        let current = ids.get(self.cursor).copied();
        match code {
            KeyCode::Char('j') | KeyCode::Down if self.cursor + 1 < ids.len() => {
                self.cursor += 1;
                true
            }
            KeyCode::Char('k') | KeyCode::Up if self.cursor > 0 => {
                self.cursor -= 1;
                true
            }
            KeyCode::Enter => {
                let Some(id) = current else { return false };
                self.session.update(Intent::ShowAnnotation(id));
                true
            }
            KeyCode::Char('e') => {
                let Some(id) = current else { return false };
                self.session.update(Intent::EditTask(id));
                self.state = AppState::Form;
                true
            }
            KeyCode::Char('d') => {
                let Some(id) = current else { return false };
                self.state = AppState::Confirming(id);
                true
            }
            _ => false,
        }
    }

    fn handle_form_key(&mut self, code: KeyCode) -> bool {
        let form = self.session.form_mut();
        match code {
            KeyCode::Enter => {
                self.session.update(Intent::SubmitForm);
                self.clamp_cursor();
                self.state = AppState::Browsing;
            }
            KeyCode::Esc => {
                self.session.update(Intent::CancelForm);
                self.state = AppState::Browsing;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => form.push_char(ch),
            _ => return false,
        }
        true
    }

    fn handle_note_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let panel = self.session.annotation_panel_mut();
        match code {
            KeyCode::Char('s') if modifiers == KeyModifiers::CONTROL => {
                self.session.update(Intent::SaveAnnotation);
                self.state = AppState::Browsing;
            }
            KeyCode::Esc => {
                self.session.update(Intent::ToggleAnnotationEdit);
                self.state = AppState::Browsing;
            }
            KeyCode::Enter => panel.push_char('\n'),
            KeyCode::Backspace => panel.backspace(),
            KeyCode::Char(ch) if (KeyModifiers::NONE | KeyModifiers::SHIFT).contains(modifiers) => {
                panel.push_char(ch);
            }
            _ => return false,
        }
        true
    }

    fn move_days(&mut self, days: i64) -> bool {
        match self
            .session
            .selected_date()
            .checked_add(Duration::days(days))
        {
            Some(date) => self.change_date(Intent::SelectDate(date)),
            None => false,
        }
    }

    fn change_date(&mut self, intent: Intent) -> bool {
        self.session.update(intent);
        self.cursor = 0;
        true
    }

    fn clamp_cursor(&mut self) {
        let len = self.session.day_tasks().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }
}

impl<S: KeyValueStore> Widget for &App<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.session.theme().theme();
        buf.set_style(area, theme.base);
        let [main_area, status_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
        let [left_area, right_area] =
            Layout::horizontal([Constraint::Length(CALENDAR_WIDTH), Constraint::Min(0)])
                .areas(main_area);
        let [calendar_area, _] =
            Layout::vertical([Constraint::Length(CALENDAR_HEIGHT), Constraint::Min(0)])
                .areas(left_area);
        let [list_area, note_area] =
            Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)])
                .areas(right_area);

        let date = self.session.selected_date();
        let cells = self.session.calendar();
        MonthCalendar::new(&cells, date.year(), date.month(), theme)
            .focused(self.focus == Focus::Calendar)
            .render(calendar_area, buf);
        TaskList::new(self.session.task_list(), long_date(date), theme)
            .cursor(self.cursor)
            .shown(self.session.selected_task())
            .focused(self.focus == Focus::Tasks)
            .render(list_area, buf);
        AnnotationPane::new(
            self.session.annotation(),
            self.session.shows_history(),
            theme,
        )
        .render(note_area, buf);
        let status = match self.session.status() {
            Some(msg) => Line::styled(format!(" {msg}"), theme.heading),
            None => Line::styled(STATUS_HINT, theme.dim),
        };
        Paragraph::new(status).render(status_area, buf);

        match self.state {
            AppState::Helping => Help(theme.base).render(area, buf),
            AppState::Form => TaskFormPopup::new(self.session.form(), theme).render(area, buf),
            AppState::Confirming(_) => Confirm::new("Delete this task?", theme.base).render(area, buf),
            AppState::Browsing | AppState::EditingNote | AppState::Quitting => (),
        }
    }
}

fn long_date(date: Date) -> String {
    format!("{} {} {}", date.day(), date.month(), date.year())
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Browsing,
    Helping,
    Form,
    Confirming(TaskId),
    EditingNote,
    Quitting,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Focus {
    Calendar,
    Tasks,
}

impl Focus {
    fn other(self) -> Focus {
        match self {
            Focus::Calendar => Focus::Tasks,
            Focus::Tasks => Focus::Calendar,
        }
    }
}
