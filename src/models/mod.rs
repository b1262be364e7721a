//! Record types managed by the application, one table each.
//!
//! Every variant implements [`Record`], which ties its row mapping, its
//! literal SQL and its form handling together so that the store and the
//! request handler can stay generic.

pub mod book;
pub mod game;
pub mod idea;
pub mod item;
pub mod lesson;
pub mod task;

use rusqlite::types::Value;
use serde::Serialize;

use crate::form::{FormData, ValidationError};

pub use book::{Book, BookDraft, ReadingStatus};
pub use game::{Game, GameDraft, GameStatus};
pub use idea::{Idea, IdeaDraft};
pub use item::{Item, ItemDraft};
pub use lesson::{Lesson, LessonDraft};
pub use task::{Completion, Task, TaskDraft};

/// Literal SQL for one record table. Every value travels as a `?N` parameter.
#[derive(Debug, Clone, Copy)]
pub struct Statements {
    /// `CREATE TABLE IF NOT EXISTS ...`
    pub create_table: &'static str,
    /// Extra `CREATE INDEX IF NOT EXISTS ...` statements
    pub create_indexes: &'static [&'static str],
    /// `SELECT id, <fields> ... ORDER BY ...`
    pub list: &'static str,
    /// `SELECT id, <fields> ... WHERE id = ?1`
    pub fetch: &'static str,
    /// `SELECT COUNT(*) ...`
    pub count: &'static str,
    /// `INSERT ... VALUES (?1, ...)`, parameters in draft order
    pub insert: &'static str,
    /// `UPDATE ... SET ... WHERE id = ?N`, id bound last
    pub update: &'static str,
    /// `DELETE ... WHERE id = ?1`
    pub delete: &'static str,
}

/// How a field is edited and parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    LongText,
    PositiveInt,
    Checkbox,
    Choice(&'static [&'static str]),
    Tags,
}

/// A form field exposed by a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind, required: true }
    }

    pub const fn optional(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind, required: false }
    }
}

/// Key used to partition a list view into groups.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct GroupKey {
    /// Declaration order for enum-like keys, 0 for free text
    pub rank: u32,
    pub label: String,
}

impl GroupKey {
    pub fn ranked(rank: u32, label: impl Into<String>) -> Self {
        Self { rank, label: label.into() }
    }

    pub fn text(label: impl Into<String>) -> Self {
        Self::ranked(0, label)
    }
}

/// One row type stored in its own table.
pub trait Record: Sized + Clone + Serialize {
    /// Validated field set without an identifier
    type Draft: Clone + PartialEq + std::fmt::Debug + Serialize;

    /// Singular display name, e.g. "Task"
    const NOUN: &'static str;
    /// Plural display name, e.g. "Tasks"
    const PLURAL: &'static str;
    /// File stem of the variant's database, e.g. "todo"
    const DB_STEM: &'static str;
    const SQL: Statements;
    const FIELDS: &'static [FieldSpec];
    /// Whether list views partition rows by [`Record::group_key`]
    const GROUPED: bool = false;

    fn id(&self) -> i64;

    fn draft(&self) -> Self::Draft;

    /// Map a row selected with the `list`/`fetch` column order
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self>;

    /// Bind a draft in the `insert` parameter order
    fn to_params(draft: &Self::Draft) -> Vec<Value>;

    fn from_form(form: &FormData) -> Result<Self::Draft, ValidationError>;

    /// Prefill values for an edit form
    fn to_form(draft: &Self::Draft) -> FormData;

    /// Short human line used in list views
    fn summary(&self) -> String;

    /// Group of this row; only consulted when `GROUPED` is set
    fn group_key(&self) -> Option<GroupKey> {
        None
    }
}

/// Canonical spelling of a choice value: trimmed, lowercase, `-` separated
pub(crate) fn normalize_choice(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace([' ', '_'], "-")
}

/// Convert a stored enum-like text column, reporting unknown values as a
/// conversion failure on that column.
pub(crate) fn parse_column<T>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Error for an enum-like value outside its declared set.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
