use crate::calendar::{calendar_cells, CellView};
use crate::dates::{date_key, shift_month};
use crate::form::TaskForm;
use crate::store::{Annotation, KeyValueStore, Task, TaskId, TaskStore};
use crate::tasks::{AnnotationView, TaskListView};
use crate::theme::ThemePreference;
use std::fmt;
use time::Date;

/// Something the user asked for.  Every change to the session goes through
/// [`Session::update`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Intent {
    SelectDate(Date),
    PreviousMonth,
    NextMonth,
    SelectToday,
    /// Open the form in add mode for the selected day
    NewTask,
    EditTask(TaskId),
    SubmitForm,
    CancelForm,
    /// Only dispatched once the user has confirmed the deletion
    DeleteTask(TaskId),
    ShowAnnotation(TaskId),
    ToggleAnnotationEdit,
    SaveAnnotation,
    ToggleTheme,
}

/// State of the note/history panel.  A draft is present exactly while the
/// note is being edited.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct AnnotationPanel {
    draft: Option<String>,
}

impl AnnotationPanel {
    pub(crate) fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    pub(crate) fn draft(&self) -> Option<&str> {
        self.draft.as_deref()
    }

    pub(crate) fn start_editing(&mut self, text: String) {
        self.draft = Some(text);
    }

    pub(crate) fn push_char(&mut self, ch: char) {
        if let Some(draft) = self.draft.as_mut() {
            draft.push(ch);
        }
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(draft) = self.draft.as_mut() {
            draft.pop();
        }
    }

    fn finish_editing(&mut self) -> Option<String> {
        self.draft.take()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Session<S> {
    store: TaskStore<S>,
    today: Date,
    selected_date: Date,
    selected_task: Option<TaskId>,
    annotation: AnnotationPanel,
    form: TaskForm,
    theme: ThemePreference,
    status: Option<String>,
}

impl<S: KeyValueStore> Session<S> {
    pub(crate) fn new(store: TaskStore<S>, today: Date) -> Self {
        let theme = store.theme();
        let mut session = Session {
            store,
            today,
            selected_date: today,
            selected_task: None,
            annotation: AnnotationPanel::default(),
            form: TaskForm::default(),
            theme,
            status: None,
        };
        session.refresh_selected_task();
        session
    }

    pub(crate) fn start_date(mut self, date: Date) -> Self {
        self.select_date(date);
        self
    }

    pub(crate) fn selected_date(&self) -> Date {
        self.selected_date
    }

    pub(crate) fn selected_task(&self) -> Option<TaskId> {
        self.selected_task
    }

    pub(crate) fn form(&self) -> &TaskForm {
        &self.form
    }

    pub(crate) fn form_mut(&mut self) -> &mut TaskForm {
        &mut self.form
    }

    pub(crate) fn annotation_panel(&self) -> &AnnotationPanel {
        &self.annotation
    }

    pub(crate) fn annotation_panel_mut(&mut self) -> &mut AnnotationPanel {
        &mut self.annotation
    }

    pub(crate) fn theme(&self) -> ThemePreference {
        self.theme
    }

    /// Message about the last failed operation, if any
    pub(crate) fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub(crate) fn day_tasks(&self) -> Vec<&Task> {
        self.store.find_by_date(&date_key(self.selected_date))
    }

    pub(crate) fn calendar(&self) -> Vec<CellView> {
        calendar_cells(
            self.store.list(),
            self.selected_date,
            self.selected_date.year(),
            self.selected_date.month(),
        )
    }

    pub(crate) fn task_list(&self) -> TaskListView<'_> {
        TaskListView::new(self.day_tasks())
    }

    fn shown_task(&self) -> Option<&Task> {
        self.selected_task.and_then(|id| self.store.get(id))
    }

    pub(crate) fn annotation(&self) -> AnnotationView {
        AnnotationView::new(self.shown_task(), &self.annotation)
    }

    pub(crate) fn shows_history(&self) -> bool {
        self.shown_task().is_some_and(|t| t.annotation.is_history())
    }

    pub(crate) fn can_edit_annotation(&self) -> bool {
        self.shown_task()
            .is_some_and(|t| matches!(t.annotation, Annotation::Note { .. }))
    }

    pub(crate) fn update(&mut self, intent: Intent) {
        log::trace!("Handling {intent:?}");
        self.status = None;
        match intent {
            Intent::SelectDate(date) => self.select_date(date),
            Intent::PreviousMonth => {
                if let Some(date) = shift_month(self.selected_date, -1) {
                    self.select_date(date);
                }
            }
            Intent::NextMonth => {
                if let Some(date) = shift_month(self.selected_date, 1) {
                    self.select_date(date);
                }
            }
            Intent::SelectToday => self.select_date(self.today),
            Intent::NewTask => self.form = TaskForm::with_date(date_key(self.selected_date)),
            Intent::EditTask(id) => {
                if let Some(task) = self.store.get(id) {
                    self.form = TaskForm::edit(task);
                }
            }
            Intent::SubmitForm => self.submit_form(),
            Intent::CancelForm => self.form = TaskForm::default(),
            Intent::DeleteTask(id) => {
                if let Err(e) = self.store.delete(id) {
                    self.report(&e);
                }
                if self.selected_task == Some(id) {
                    self.selected_task = None;
                    self.annotation = AnnotationPanel::default();
                }
                self.refresh_selected_task();
            }
            Intent::ShowAnnotation(id) => {
                if self.store.get(id).is_some() {
                    self.selected_task = Some(id);
                    self.annotation = AnnotationPanel::default();
                }
            }
            Intent::ToggleAnnotationEdit => self.toggle_annotation_edit(),
            Intent::SaveAnnotation => {
                if let (Some(draft), Some(id)) =
                    (self.annotation.finish_editing(), self.selected_task)
                {
                    if let Err(e) = self.store.set_annotation(id, draft) {
                        self.report(&e);
                    }
                }
            }
            Intent::ToggleTheme => {
                self.theme = self.theme.toggled();
                if let Err(e) = self.store.save_theme(self.theme) {
                    self.report(&e);
                }
            }
        }
    }

    fn select_date(&mut self, date: Date) {
        self.selected_date = date;
        self.refresh_selected_task();
    }

    /// Keeps the shown task if it is still listed for the selected day, and
    /// otherwise falls back to the day's first task
    fn refresh_selected_task(&mut self) {
        let day_tasks = self.day_tasks();
        let still_listed = self
            .selected_task
            .is_some_and(|id| day_tasks.iter().any(|t| t.id == id));
        if !still_listed {
            let first = day_tasks.first().map(|t| t.id);
            self.selected_task = first;
            self.annotation = AnnotationPanel::default();
        }
    }

    fn submit_form(&mut self) {
        let (id, fields) = std::mem::take(&mut self.form).into_parts();
        let outcome = match id {
            Some(id) => self
                .store
                .update(id, fields)
                .map(|found| found.then_some((id, "edited"))),
            None => self.store.create(fields).map(|id| Some((id, "created"))),
        };
        match outcome {
            Ok(Some((id, action))) => self.log_history(id, action),
            Ok(None) => (),
            Err(e) => self.report(&e),
        }
        self.refresh_selected_task();
    }

    /// Appends a dated entry to the task's history log, if it keeps one
    fn log_history(&mut self, id: TaskId, action: &str) {
        if !self.store.get(id).is_some_and(|t| t.annotation.is_history()) {
            return;
        }
        let entry = format!("{}: {action}", date_key(self.today));
        if let Err(e) = self.store.append_history(id, entry) {
            self.report(&e);
        }
    }

    fn toggle_annotation_edit(&mut self) {
        if self.annotation.finish_editing().is_some() {
            return;
        }
        let note = match self.shown_task().map(|t| &t.annotation) {
            Some(Annotation::Note { text }) => Some(text.clone()),
            Some(Annotation::History { .. }) => None,
            None => return,
        };
        match note {
            Some(note) => self.annotation.start_editing(note),
            None => self.status = Some(String::from("History entries cannot be edited")),
        }
    }

    fn report<E: fmt::Display>(&mut self, err: &E) {
        log::warn!("{err}");
        self.status = Some(err.to_string());
    }
}

#[cfg(test)]
impl<S> Session<S> {
    pub(crate) fn store(&self) -> &TaskStore<S> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormField, FormMode};
    use crate::store::{AnnotationKind, MemoryStorage};
    use crate::tasks::{NO_HISTORY, NO_NOTE, NO_SELECTION, NO_TASKS};
    use time::macros::date;

    const TODAY: Date = date!(2026 - 10 - 19);

    fn seeded(kind: AnnotationKind) -> Session<MemoryStorage> {
        Session::new(TaskStore::load(MemoryStorage::default(), kind), TODAY)
    }

    fn type_into(form: &mut TaskForm, s: &str) {
        for ch in s.chars() {
            form.push_char(ch);
        }
    }

    fn day_ids(session: &Session<MemoryStorage>) -> Vec<TaskId> {
        session.day_tasks().iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_starts_on_today() {
        let session = seeded(AnnotationKind::Note);
        assert_eq!(session.selected_date(), TODAY);
        assert_eq!(session.selected_task(), None);
        assert_eq!(session.task_list(), TaskListView::Empty(NO_TASKS));
        assert_eq!(session.annotation(), AnnotationView::Placeholder(NO_SELECTION));
    }

    #[test]
    fn test_select_seeded_day() {
        let mut session = seeded(AnnotationKind::Note);
        session.update(Intent::SelectDate(date!(2025 - 09 - 25)));
        assert_eq!(day_ids(&session), [1]);
        assert_eq!(session.selected_task(), Some(1));
        assert_eq!(
            session.annotation(),
            AnnotationView::Lines(vec!["Check the colors with the client.".into()])
        );
        session.update(Intent::SelectDate(date!(2025 - 09 - 27)));
        assert_eq!(session.task_list(), TaskListView::Empty(NO_TASKS));
        assert_eq!(session.selected_task(), None);
        assert_eq!(session.selected_date(), date!(2025 - 09 - 27));
    }

    #[test]
    fn test_calendar_follows_selection() {
        let session = seeded(AnnotationKind::Note).start_date(date!(2025 - 09 - 26));
        let cells = session.calendar();
        assert_eq!(cells.len(), 31);
        assert!(cells[26].selected);
        assert!(cells[25].has_tasks && cells[26].has_tasks);
    }

    #[test]
    fn test_month_navigation() {
        let mut session = seeded(AnnotationKind::Note).start_date(date!(2025 - 01 - 31));
        session.update(Intent::NextMonth);
        assert_eq!(session.selected_date(), date!(2025 - 02 - 28));
        session.update(Intent::PreviousMonth);
        session.update(Intent::PreviousMonth);
        assert_eq!(session.selected_date(), date!(2024 - 12 - 28));
        session.update(Intent::SelectToday);
        assert_eq!(session.selected_date(), TODAY);
    }

    #[test]
    fn test_submit_new_task() {
        let mut session = seeded(AnnotationKind::Note);
        let form = session.form_mut();
        type_into(form, "Test");
        form.next_field();
        type_into(form, "2025-10-01");
        form.next_field();
        type_into(form, "X");
        session.update(Intent::SubmitForm);
        assert_eq!(session.form(), &TaskForm::default());
        let task = session.store().get(3).expect("task 3 should exist");
        assert_eq!(task.name, "Test");
        assert_eq!(task.date, "2025-10-01");
        assert_eq!(task.description, "X");
        let reloaded = TaskStore::load(session.store().storage().clone(), AnnotationKind::Note);
        assert_eq!(reloaded.list(), session.store().list());
    }

    #[test]
    fn test_new_task_defaults_to_selected_day() {
        let mut session = seeded(AnnotationKind::Note).start_date(date!(2025 - 09 - 27));
        session.update(Intent::NewTask);
        assert_eq!(session.form().mode(), FormMode::Add);
        assert_eq!(session.form().value(FormField::Date), "2025-09-27");
        type_into(session.form_mut(), "Lunch");
        session.update(Intent::SubmitForm);
        assert_eq!(day_ids(&session), [3]);
        assert_eq!(session.selected_task(), Some(3));
        assert_eq!(session.annotation(), AnnotationView::Placeholder(NO_NOTE));
    }

    #[test]
    fn test_empty_fields_are_accepted() {
        let mut session = seeded(AnnotationKind::Note);
        session.update(Intent::SubmitForm);
        let task = session.store().get(3).expect("task 3 should exist");
        assert_eq!(task.name, "");
        assert_eq!(task.date, "");
    }

    #[test]
    fn test_edit_task() {
        let mut session = seeded(AnnotationKind::Note).start_date(date!(2025 - 09 - 25));
        session.update(Intent::EditTask(1));
        assert_eq!(session.form().mode(), FormMode::Edit(1));
        type_into(session.form_mut(), "!");
        session.update(Intent::SubmitForm);
        assert_eq!(session.form().mode(), FormMode::Add);
        let task = session.store().get(1).expect("task 1 should exist");
        assert_eq!(task.name, "Create the plugin design!");
        assert_eq!(session.store().list().len(), 2);
    }

    #[test]
    fn test_edit_unknown_task_leaves_form_alone() {
        let mut session = seeded(AnnotationKind::Note);
        session.update(Intent::EditTask(99));
        assert_eq!(session.form().mode(), FormMode::Add);
    }

    #[test]
    fn test_cancel_form() {
        let mut session = seeded(AnnotationKind::Note);
        session.update(Intent::EditTask(2));
        type_into(session.form_mut(), "changed");
        let before = session.store().clone();
        session.update(Intent::CancelForm);
        assert_eq!(session.form(), &TaskForm::default());
        assert_eq!(session.store(), &before);
    }

    #[test]
    fn test_delete_shown_task() {
        let mut session = seeded(AnnotationKind::Note).start_date(date!(2025 - 09 - 25));
        assert_eq!(session.selected_task(), Some(1));
        session.update(Intent::DeleteTask(1));
        assert_eq!(session.task_list(), TaskListView::Empty(NO_TASKS));
        assert_eq!(session.selected_task(), None);
        let stored = session
            .store()
            .storage()
            .get("tasks")
            .expect("read storage")
            .expect("tasks should be persisted");
        assert!(!stored.contains("2025-09-25"));
    }

    #[test]
    fn test_show_annotation() {
        let mut session = seeded(AnnotationKind::Note).start_date(date!(2025 - 09 - 25));
        session.update(Intent::ShowAnnotation(2));
        assert_eq!(session.selected_task(), Some(2));
        assert_eq!(
            session.annotation(),
            AnnotationView::Lines(vec!["Bring a projector.".into()])
        );
        session.update(Intent::ShowAnnotation(42));
        assert_eq!(session.selected_task(), Some(2));
    }

    #[test]
    fn test_edit_and_save_note() {
        let mut session = seeded(AnnotationKind::Note).start_date(date!(2025 - 09 - 26));
        assert!(session.can_edit_annotation());
        session.update(Intent::ToggleAnnotationEdit);
        assert!(session.annotation_panel().is_editing());
        session.annotation_panel_mut().push_char('!');
        session.update(Intent::SaveAnnotation);
        assert!(!session.annotation_panel().is_editing());
        assert_eq!(
            session.store().get(2).map(|t| &t.annotation),
            Some(&Annotation::Note {
                text: "Bring a projector.!".into()
            })
        );
    }

    #[test]
    fn test_toggle_discards_draft() {
        let mut session = seeded(AnnotationKind::Note).start_date(date!(2025 - 09 - 26));
        session.update(Intent::ToggleAnnotationEdit);
        session.annotation_panel_mut().backspace();
        session.update(Intent::ToggleAnnotationEdit);
        assert!(!session.annotation_panel().is_editing());
        session.update(Intent::SaveAnnotation);
        assert_eq!(
            session.annotation(),
            AnnotationView::Lines(vec!["Bring a projector.".into()])
        );
    }

    #[test]
    fn test_history_cannot_be_edited() {
        let mut session = seeded(AnnotationKind::History).start_date(date!(2025 - 09 - 26));
        assert!(session.shows_history());
        assert!(!session.can_edit_annotation());
        assert_eq!(session.annotation(), AnnotationView::Placeholder(NO_HISTORY));
        session.update(Intent::ToggleAnnotationEdit);
        assert!(!session.annotation_panel().is_editing());
        assert!(session.status().is_some());
    }

    #[test]
    fn test_history_logs_form_submissions() {
        let mut session = seeded(AnnotationKind::History).start_date(date!(2025 - 09 - 26));
        session.update(Intent::NewTask);
        type_into(session.form_mut(), "Follow-up");
        session.update(Intent::SubmitForm);
        session.update(Intent::EditTask(3));
        session.update(Intent::SubmitForm);
        assert_eq!(
            session.store().get(3).map(|t| &t.annotation),
            Some(&Annotation::History {
                entries: vec!["2026-10-19: created".into(), "2026-10-19: edited".into()]
            })
        );
    }

    #[test]
    fn test_toggle_theme_is_persisted() {
        let mut session = seeded(AnnotationKind::Note);
        assert_eq!(session.theme(), ThemePreference::Light);
        session.update(Intent::ToggleTheme);
        assert_eq!(session.theme(), ThemePreference::Dark);
        let reopened = Session::new(
            TaskStore::load(session.store().storage().clone(), AnnotationKind::Note),
            TODAY,
        );
        assert_eq!(reopened.theme(), ThemePreference::Dark);
    }
}
