use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{FieldKind, FieldSpec, GroupKey, Record, Statements, UnknownVariant, normalize_choice, parse_column};
use crate::form::{FormData, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingStatus {
    #[default]
    ToRead,
    Reading,
    Finished,
}

impl ReadingStatus {
    pub const ALL: [ReadingStatus; 3] = [
        ReadingStatus::ToRead,
        ReadingStatus::Reading,
        ReadingStatus::Finished,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReadingStatus::ToRead => "to-read",
            ReadingStatus::Reading => "reading",
            ReadingStatus::Finished => "finished",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReadingStatus::ToRead => "To read",
            ReadingStatus::Reading => "Reading",
            ReadingStatus::Finished => "Finished",
        }
    }

    fn rank(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_choice(s);
        ReadingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownVariant {
                kind: "reading status",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub status: ReadingStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub status: ReadingStatus,
}

impl Record for Book {
    type Draft = BookDraft;

    const NOUN: &'static str = "Book";
    const PLURAL: &'static str = "Books";
    const DB_STEM: &'static str = "book";

    const SQL: Statements = Statements {
        create_table: "CREATE TABLE IF NOT EXISTS books (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                author          TEXT NOT NULL,
                status          TEXT NOT NULL DEFAULT 'to-read'
            )",
        create_indexes: &["CREATE INDEX IF NOT EXISTS idx_books_title ON books(title)"],
        list: "SELECT id, title, author, status
             FROM books ORDER BY title COLLATE NOCASE ASC, id ASC",
        fetch: "SELECT id, title, author, status
             FROM books WHERE id = ?1",
        count: "SELECT COUNT(*) FROM books",
        insert: "INSERT INTO books (title, author, status)
             VALUES (?1, ?2, ?3)",
        update: "UPDATE books SET title = ?1, author = ?2, status = ?3 WHERE id = ?4",
        delete: "DELETE FROM books WHERE id = ?1",
    };

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("title", "Title", FieldKind::Text),
        FieldSpec::required("author", "Author", FieldKind::Text),
        FieldSpec::optional(
            "status",
            "Status",
            FieldKind::Choice(&["to-read", "reading", "finished"]),
        ),
    ];
    const GROUPED: bool = true;

    fn id(&self) -> i64 {
        self.id
    }

    fn draft(&self) -> BookDraft {
        BookDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            status: self.status,
        }
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Book {
            id: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
            status: parse_column(row, 3)?,
        })
    }

    fn to_params(draft: &BookDraft) -> Vec<Value> {
        vec![
            Value::Text(draft.title.clone()),
            Value::Text(draft.author.clone()),
            Value::Text(draft.status.as_str().to_string()),
        ]
    }

    fn from_form(form: &FormData) -> Result<BookDraft, ValidationError> {
        Ok(BookDraft {
            title: form.required_text("title", "Title")?,
            author: form.required_text("author", "Author")?,
            status: form.choice("status", "Status")?,
        })
    }

    fn to_form(draft: &BookDraft) -> FormData {
        FormData::new()
            .with("title", draft.title.as_str())
            .with("author", draft.author.as_str())
            .with("status", draft.status.as_str())
    }

    fn summary(&self) -> String {
        format!("{} by {}", self.title, self.author)
    }

    fn group_key(&self) -> Option<GroupKey> {
        Some(GroupKey::ranked(self.status.rank(), self.status.label()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing_is_lenient_on_case_and_spacing() {
        assert_eq!("to read".parse::<ReadingStatus>().unwrap(), ReadingStatus::ToRead);
        assert_eq!("To_Read".parse::<ReadingStatus>().unwrap(), ReadingStatus::ToRead);
        assert_eq!("Finished".parse::<ReadingStatus>().unwrap(), ReadingStatus::Finished);
        assert!("abandoned".parse::<ReadingStatus>().is_err());
    }

    #[test]
    fn test_author_is_required() {
        let form = FormData::new().with("title", "Dune");
        assert_eq!(Book::from_form(&form), Err(ValidationError::Required("Author")));
    }

    #[test]
    fn test_unknown_status_is_a_validation_failure() {
        let form = FormData::new()
            .with("title", "Dune")
            .with("author", "Frank Herbert")
            .with("status", "lost");
        assert_eq!(
            Book::from_form(&form),
            Err(ValidationError::InvalidChoice("Status", "lost".to_string()))
        );
    }

    #[test]
    fn test_blank_status_defaults_to_to_read() {
        let form = FormData::new()
            .with("title", "Dune")
            .with("author", "Frank Herbert");
        assert_eq!(Book::from_form(&form).unwrap().status, ReadingStatus::ToRead);
    }
}
