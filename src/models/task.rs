use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use super::{FieldKind, FieldSpec, GroupKey, Record, Statements};
use crate::form::{FormData, ValidationError};

/// Two-state completion flag, stored as INTEGER 0/1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    #[default]
    Pending,
    Done,
}

impl Completion {
    pub fn from_flag(flag: bool) -> Self {
        if flag { Completion::Done } else { Completion::Pending }
    }

    pub fn is_done(self) -> bool {
        self == Completion::Done
    }

    pub fn label(self) -> &'static str {
        match self {
            Completion::Pending => "Pending",
            Completion::Done => "Done",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub completed: Completion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub completed: Completion,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            completed: Completion::Pending,
        }
    }
}

impl Record for Task {
    type Draft = TaskDraft;

    const NOUN: &'static str = "Task";
    const PLURAL: &'static str = "Tasks";
    const DB_STEM: &'static str = "todo";

    const SQL: Statements = Statements {
        create_table: "CREATE TABLE IF NOT EXISTS tasks (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                description     TEXT NOT NULL DEFAULT '',
                completed       INTEGER NOT NULL DEFAULT 0
            )",
        create_indexes: &["CREATE INDEX IF NOT EXISTS idx_tasks_completed ON tasks(completed)"],
        list: "SELECT id, title, description, completed
             FROM tasks ORDER BY completed ASC, id DESC",
        fetch: "SELECT id, title, description, completed
             FROM tasks WHERE id = ?1",
        count: "SELECT COUNT(*) FROM tasks",
        insert: "INSERT INTO tasks (title, description, completed)
             VALUES (?1, ?2, ?3)",
        update: "UPDATE tasks SET title = ?1, description = ?2, completed = ?3 WHERE id = ?4",
        delete: "DELETE FROM tasks WHERE id = ?1",
    };

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("title", "Title", FieldKind::Text),
        FieldSpec::optional("description", "Description", FieldKind::LongText),
        FieldSpec::optional("completed", "Completed", FieldKind::Checkbox),
    ];
    const GROUPED: bool = true;

    fn id(&self) -> i64 {
        self.id
    }

    fn draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            completed: self.completed,
        }
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            completed: Completion::from_flag(row.get::<_, i64>(3)? != 0),
        })
    }

    fn to_params(draft: &TaskDraft) -> Vec<Value> {
        vec![
            Value::Text(draft.title.clone()),
            Value::Text(draft.description.clone()),
            Value::Integer(if draft.completed.is_done() { 1 } else { 0 }),
        ]
    }

    fn from_form(form: &FormData) -> Result<TaskDraft, ValidationError> {
        Ok(TaskDraft {
            title: form.required_text("title", "Title")?,
            description: form.optional_text("description"),
            completed: Completion::from_flag(form.checkbox("completed")),
        })
    }

    fn to_form(draft: &TaskDraft) -> FormData {
        let mut form = FormData::new()
            .with("title", draft.title.as_str())
            .with("description", draft.description.as_str());
        // Unchecked boxes are simply absent from a submitted form
        if draft.completed.is_done() {
            form.set("completed", "on");
        }
        form
    }

    fn summary(&self) -> String {
        let mark = if self.completed.is_done() { "[x]" } else { "[ ]" };
        if self.description.is_empty() {
            format!("{} {}", mark, self.title)
        } else {
            format!("{} {} - {}", mark, self.title, self.description)
        }
    }

    fn group_key(&self) -> Option<GroupKey> {
        let rank = match self.completed {
            Completion::Pending => 0,
            Completion::Done => 1,
        };
        Some(GroupKey::ranked(rank, self.completed.label()))
    }
}
