mod storage;
#[cfg(test)]
pub(crate) use self::storage::MemoryStorage;
pub(crate) use self::storage::{FileStorage, KeyValueStore, StorageError};
use crate::theme::ThemePreference;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage key under which the JSON array of tasks is kept
const TASKS_KEY: &str = "tasks";

/// Storage key under which the theme preference is kept
const THEME_KEY: &str = "theme";

pub(crate) type TaskId = u64;

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(from = "StoredTask")]
pub(crate) struct Task {
    pub(crate) id: TaskId,
    pub(crate) name: String,
    /// Date key (`YYYY-MM-DD`).  Only ever compared as a string.
    pub(crate) date: String,
    #[serde(rename = "desc")]
    pub(crate) description: String,
    #[serde(flatten)]
    pub(crate) annotation: Annotation,
}

/// A task as found on disk.  A record with neither `note` nor `history` gets
/// an empty note; one with both is treated as a history log.
#[derive(Deserialize)]
struct StoredTask {
    id: TaskId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    desc: String,
    note: Option<String>,
    history: Option<Vec<String>>,
}

impl From<StoredTask> for Task {
    fn from(stored: StoredTask) -> Task {
        let annotation = match (stored.history, stored.note) {
            (Some(entries), _) => Annotation::History { entries },
            (None, note) => Annotation::Note {
                text: note.unwrap_or_default(),
            },
        };
        Task {
            id: stored.id,
            name: stored.name,
            date: stored.date,
            description: stored.desc,
            annotation,
        }
    }
}

/// The free-form text attached to a task.  On disk, the variant is told apart
/// by whether the task object has a `note` or a `history` field.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub(crate) enum Annotation {
    Note {
        #[serde(rename = "note")]
        text: String,
    },
    History {
        #[serde(rename = "history")]
        entries: Vec<String>,
    },
}

impl Annotation {
    pub(crate) fn is_history(&self) -> bool {
        matches!(self, Annotation::History { .. })
    }
}

/// Which kind of annotation newly created tasks receive
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum AnnotationKind {
    #[default]
    Note,
    History,
}

impl AnnotationKind {
    fn empty(self) -> Annotation {
        match self {
            AnnotationKind::Note => Annotation::Note {
                text: String::new(),
            },
            AnnotationKind::History => Annotation::History {
                entries: Vec::new(),
            },
        }
    }
}

/// The user-editable fields of a task
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct TaskFields {
    pub(crate) name: String,
    pub(crate) date: String,
    pub(crate) description: String,
}

#[derive(Debug, Error)]
pub(crate) enum AnnotationError {
    #[error("task {0} keeps a history log, which cannot be edited")]
    ReadOnlyHistory(TaskId),
    #[error("task {0} has a note rather than a history log")]
    NotHistory(TaskId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The session's tasks, written back to storage after every mutation.
///
/// When writing fails, the mutation has still been applied in memory; the
/// error only reports that storage is now behind.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct TaskStore<S> {
    tasks: Vec<Task>,
    kind: AnnotationKind,
    storage: S,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Reads the tasks out of `storage`, falling back to the sample tasks if
    /// there are none or the stored value is not an array.  Individual
    /// records that cannot be decoded are skipped.
    pub(crate) fn load(storage: S, kind: AnnotationKind) -> TaskStore<S> {
        let tasks = match storage.get(TASKS_KEY) {
            Ok(Some(blob)) => match serde_json::from_str::<Vec<serde_json::Value>>(&blob) {
                Ok(records) => {
                    let tasks = decode_records(records);
                    log::debug!("Loaded {} stored tasks", tasks.len());
                    tasks
                }
                Err(e) => {
                    log::warn!("Stored tasks could not be decoded, using sample tasks: {e}");
                    seed_tasks(kind)
                }
            },
            Ok(None) => {
                log::info!("No stored tasks; using sample tasks");
                seed_tasks(kind)
            }
            Err(e) => {
                log::warn!("Could not read stored tasks, using sample tasks: {e}");
                seed_tasks(kind)
            }
        };
        TaskStore {
            tasks,
            kind,
            storage,
        }
    }

    pub(crate) fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub(crate) fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub(crate) fn find_by_date(&self, key: &str) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.date == key).collect()
    }

    fn next_id(&self) -> TaskId {
        self.tasks
            .iter()
            .map(|t| t.id)
            .max()
            .map_or(1, |id| id.saturating_add(1))
    }

    pub(crate) fn create(&mut self, fields: TaskFields) -> Result<TaskId, StorageError> {
        let id = self.next_id();
        self.tasks.push(Task {
            id,
            name: fields.name,
            date: fields.date,
            description: fields.description,
            annotation: self.kind.empty(),
        });
        log::debug!("Created task {id}");
        self.persist()?;
        Ok(id)
    }

    /// Overwrites the editable fields of task `id`.  Returns `false` without
    /// touching anything if there is no such task.
    pub(crate) fn update(&mut self, id: TaskId, fields: TaskFields) -> Result<bool, StorageError> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            log::debug!("Ignoring update of unknown task {id}");
            return Ok(false);
        };
        task.name = fields.name;
        task.date = fields.date;
        task.description = fields.description;
        log::debug!("Updated task {id}");
        self.persist()?;
        Ok(true)
    }

    pub(crate) fn delete(&mut self, id: TaskId) -> Result<bool, StorageError> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            log::debug!("Deleted task {id}");
        }
        self.persist()?;
        Ok(removed)
    }

    pub(crate) fn set_annotation(
        &mut self,
        id: TaskId,
        note: String,
    ) -> Result<bool, AnnotationError> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        match &mut task.annotation {
            Annotation::Note { text } => *text = note,
            Annotation::History { .. } => return Err(AnnotationError::ReadOnlyHistory(id)),
        }
        self.persist()?;
        Ok(true)
    }

    pub(crate) fn append_history(
        &mut self,
        id: TaskId,
        entry: String,
    ) -> Result<bool, AnnotationError> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        match &mut task.annotation {
            Annotation::History { entries } => entries.push(entry),
            Annotation::Note { .. } => return Err(AnnotationError::NotHistory(id)),
        }
        self.persist()?;
        Ok(true)
    }

    pub(crate) fn theme(&self) -> ThemePreference {
        match self.storage.get(THEME_KEY) {
            Ok(Some(value)) => ThemePreference::from_name(&value).unwrap_or_default(),
            Ok(None) => ThemePreference::default(),
            Err(e) => {
                log::warn!("Could not read theme preference: {e}");
                ThemePreference::default()
            }
        }
    }

    pub(crate) fn save_theme(&mut self, theme: ThemePreference) -> Result<(), StorageError> {
        self.storage.set(THEME_KEY, theme.name())
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        let blob = serde_json::to_string(&self.tasks)?;
        self.storage.set(TASKS_KEY, &blob)
    }
}

#[cfg(test)]
impl<S> TaskStore<S> {
    pub(crate) fn storage(&self) -> &S {
        &self.storage
    }
}

fn decode_records(records: Vec<serde_json::Value>) -> Vec<Task> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<Task>(record) {
            Ok(task) => Some(task),
            Err(e) => {
                log::warn!("Skipping stored task that could not be decoded: {e}");
                None
            }
        })
        .collect()
}

fn seed_tasks(kind: AnnotationKind) -> Vec<Task> {
    let (first, second) = match kind {
        AnnotationKind::Note => (
            Annotation::Note {
                text: String::from("Check the colors with the client."),
            },
            Annotation::Note {
                text: String::from("Bring a projector."),
            },
        ),
        AnnotationKind::History => (
            Annotation::History {
                entries: vec![String::from("Check the colors with the client.")],
            },
            Annotation::History {
                entries: Vec::new(),
            },
        ),
    };
    vec![
        Task {
            id: 1,
            name: String::from("Create the plugin design"),
            date: String::from("2025-09-25"),
            description: String::from("Use Figma for the prototype."),
            annotation: first,
        },
        Task {
            id: 2,
            name: String::from("Team meeting"),
            date: String::from("2025-09-26"),
            description: String::from("Present the prototype."),
            annotation: second,
        },
    ]
}
