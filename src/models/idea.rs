use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use super::{FieldKind, FieldSpec, Record, Statements};
use crate::form::{FormData, ValidationError, join_tags, split_tags};

/// An idea journal entry. Tags are kept as a list and only joined for storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl Record for Idea {
    type Draft = IdeaDraft;

    const NOUN: &'static str = "Idea";
    const PLURAL: &'static str = "Ideas";
    const DB_STEM: &'static str = "idea";

    const SQL: Statements = Statements {
        create_table: "CREATE TABLE IF NOT EXISTS ideas (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                content         TEXT NOT NULL DEFAULT '',
                tags            TEXT NOT NULL DEFAULT ''
            )",
        create_indexes: &[],
        list: "SELECT id, title, content, tags
             FROM ideas ORDER BY id DESC",
        fetch: "SELECT id, title, content, tags
             FROM ideas WHERE id = ?1",
        count: "SELECT COUNT(*) FROM ideas",
        insert: "INSERT INTO ideas (title, content, tags)
             VALUES (?1, ?2, ?3)",
        update: "UPDATE ideas SET title = ?1, content = ?2, tags = ?3 WHERE id = ?4",
        delete: "DELETE FROM ideas WHERE id = ?1",
    };

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("title", "Title", FieldKind::Text),
        FieldSpec::optional("content", "Content", FieldKind::LongText),
        FieldSpec::optional("tags", "Tags (comma separated)", FieldKind::Tags),
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn draft(&self) -> IdeaDraft {
        IdeaDraft {
            title: self.title.clone(),
            content: self.content.clone(),
            tags: self.tags.clone(),
        }
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let tags: String = row.get(3)?;
        Ok(Idea {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            tags: split_tags(&tags),
        })
    }

    fn to_params(draft: &IdeaDraft) -> Vec<Value> {
        vec![
            Value::Text(draft.title.clone()),
            Value::Text(draft.content.clone()),
            Value::Text(join_tags(&draft.tags)),
        ]
    }

    fn from_form(form: &FormData) -> Result<IdeaDraft, ValidationError> {
        Ok(IdeaDraft {
            title: form.required_text("title", "Title")?,
            content: form.optional_text("content"),
            tags: form.tags("tags"),
        })
    }

    fn to_form(draft: &IdeaDraft) -> FormData {
        FormData::new()
            .with("title", draft.title.as_str())
            .with("content", draft.content.as_str())
            .with("tags", draft.tags.join(", "))
    }

    fn summary(&self) -> String {
        if self.tags.is_empty() {
            self.title.clone()
        } else {
            let tags: Vec<String> = self.tags.iter().map(|t| format!("#{}", t)).collect();
            format!("{} {}", self.title, tags.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_split_at_the_form_edge() {
        let form = FormData::new()
            .with("title", "Garden robot")
            .with("tags", "hardware, weekend,,");
        let draft = Idea::from_form(&form).unwrap();
        assert_eq!(draft.tags, vec!["hardware", "weekend"]);
        assert_eq!(Idea::to_params(&draft)[2], Value::Text("hardware,weekend".into()));
    }

    #[test]
    fn test_summary_shows_hashtags() {
        let idea = Idea {
            id: 3,
            title: "Garden robot".into(),
            content: String::new(),
            tags: vec!["hardware".into()],
        };
        assert_eq!(idea.summary(), "Garden robot #hardware");
    }
}
