use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use super::{FieldKind, FieldSpec, GroupKey, Record, Statements};
use crate::form::{FormData, ValidationError};

/// Group label for items saved without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A shopping list entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub quantity: u32,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub quantity: u32,
    pub category: String,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, quantity: u32, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.max(1),
            category: category.into(),
        }
    }
}

impl Record for Item {
    type Draft = ItemDraft;

    const NOUN: &'static str = "Item";
    const PLURAL: &'static str = "Items";
    const DB_STEM: &'static str = "shopping";

    const SQL: Statements = Statements {
        create_table: "CREATE TABLE IF NOT EXISTS items (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL,
                quantity        INTEGER NOT NULL DEFAULT 1 CHECK (quantity >= 1),
                category        TEXT NOT NULL DEFAULT ''
            )",
        create_indexes: &["CREATE INDEX IF NOT EXISTS idx_items_category ON items(category, name)"],
        list: "SELECT id, name, quantity, category
             FROM items ORDER BY category COLLATE NOCASE ASC, name COLLATE NOCASE ASC, id ASC",
        fetch: "SELECT id, name, quantity, category
             FROM items WHERE id = ?1",
        count: "SELECT COUNT(*) FROM items",
        insert: "INSERT INTO items (name, quantity, category)
             VALUES (?1, ?2, ?3)",
        update: "UPDATE items SET name = ?1, quantity = ?2, category = ?3 WHERE id = ?4",
        delete: "DELETE FROM items WHERE id = ?1",
    };

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("name", "Name", FieldKind::Text),
        FieldSpec::optional("quantity", "Quantity", FieldKind::PositiveInt),
        FieldSpec::optional("category", "Category", FieldKind::Text),
    ];
    const GROUPED: bool = true;

    fn id(&self) -> i64 {
        self.id
    }

    fn draft(&self) -> ItemDraft {
        ItemDraft {
            name: self.name.clone(),
            quantity: self.quantity,
            category: self.category.clone(),
        }
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Item {
            id: row.get(0)?,
            name: row.get(1)?,
            quantity: row.get(2)?,
            category: row.get(3)?,
        })
    }

    fn to_params(draft: &ItemDraft) -> Vec<Value> {
        vec![
            Value::Text(draft.name.clone()),
            Value::Integer(i64::from(draft.quantity.max(1))),
            Value::Text(draft.category.clone()),
        ]
    }

    fn from_form(form: &FormData) -> Result<ItemDraft, ValidationError> {
        Ok(ItemDraft {
            name: form.required_text("name", "Name")?,
            quantity: form.positive_int("quantity", "Quantity")?,
            category: form.optional_text("category"),
        })
    }

    fn to_form(draft: &ItemDraft) -> FormData {
        FormData::new()
            .with("name", draft.name.as_str())
            .with("quantity", draft.quantity.to_string())
            .with("category", draft.category.as_str())
    }

    fn summary(&self) -> String {
        format!("{} x{}", self.name, self.quantity)
    }

    fn group_key(&self) -> Option<GroupKey> {
        // Blank categories sort after every named one
        if self.category.is_empty() {
            Some(GroupKey::ranked(1, UNCATEGORIZED))
        } else {
            Some(GroupKey::text(self.category.as_str()))
        }
    }
}
