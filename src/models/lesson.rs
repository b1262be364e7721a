use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use super::{FieldKind, FieldSpec, Record, Statements};
use crate::form::{FormData, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Minutes, at least 1
    pub duration: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonDraft {
    pub title: String,
    pub description: String,
    pub duration: u32,
}

impl Record for Lesson {
    type Draft = LessonDraft;

    const NOUN: &'static str = "Lesson";
    const PLURAL: &'static str = "Lessons";
    const DB_STEM: &'static str = "lesson";

    const SQL: Statements = Statements {
        create_table: "CREATE TABLE IF NOT EXISTS lessons (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                description     TEXT NOT NULL DEFAULT '',
                duration        INTEGER NOT NULL DEFAULT 1 CHECK (duration >= 1)
            )",
        create_indexes: &[],
        list: "SELECT id, title, description, duration
             FROM lessons ORDER BY id DESC",
        fetch: "SELECT id, title, description, duration
             FROM lessons WHERE id = ?1",
        count: "SELECT COUNT(*) FROM lessons",
        insert: "INSERT INTO lessons (title, description, duration)
             VALUES (?1, ?2, ?3)",
        update: "UPDATE lessons SET title = ?1, description = ?2, duration = ?3 WHERE id = ?4",
        delete: "DELETE FROM lessons WHERE id = ?1",
    };

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("title", "Title", FieldKind::Text),
        FieldSpec::optional("description", "Description", FieldKind::LongText),
        FieldSpec::optional("duration", "Duration (minutes)", FieldKind::PositiveInt),
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn draft(&self) -> LessonDraft {
        LessonDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            duration: self.duration,
        }
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Lesson {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            duration: row.get(3)?,
        })
    }

    fn to_params(draft: &LessonDraft) -> Vec<Value> {
        vec![
            Value::Text(draft.title.clone()),
            Value::Text(draft.description.clone()),
            Value::Integer(i64::from(draft.duration.max(1))),
        ]
    }

    fn from_form(form: &FormData) -> Result<LessonDraft, ValidationError> {
        Ok(LessonDraft {
            title: form.required_text("title", "Title")?,
            description: form.optional_text("description"),
            duration: form.positive_int("duration", "Duration")?,
        })
    }

    fn to_form(draft: &LessonDraft) -> FormData {
        FormData::new()
            .with("title", draft.title.as_str())
            .with("description", draft.description.as_str())
            .with("duration", draft.duration.to_string())
    }

    fn summary(&self) -> String {
        format!("{} ({} min)", self.title, self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_defaults_to_one_minute() {
        let draft = Lesson::from_form(&FormData::new().with("title", "Intro")).unwrap();
        assert_eq!(draft.duration, 1);
    }

    #[test]
    fn test_duration_must_be_numeric() {
        let form = FormData::new().with("title", "Intro").with("duration", "an hour");
        assert_eq!(
            Lesson::from_form(&form),
            Err(ValidationError::NotANumber("Duration"))
        );
    }
}
