use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{FieldKind, FieldSpec, GroupKey, Record, Statements, UnknownVariant, normalize_choice, parse_column};
use crate::form::{FormData, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    #[default]
    Backlog,
    Playing,
    Completed,
    Dropped,
}

impl GameStatus {
    pub const ALL: [GameStatus; 4] = [
        GameStatus::Backlog,
        GameStatus::Playing,
        GameStatus::Completed,
        GameStatus::Dropped,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Backlog => "backlog",
            GameStatus::Playing => "playing",
            GameStatus::Completed => "completed",
            GameStatus::Dropped => "dropped",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GameStatus::Backlog => "Backlog",
            GameStatus::Playing => "Playing",
            GameStatus::Completed => "Completed",
            GameStatus::Dropped => "Dropped",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_choice(s);
        GameStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownVariant {
                kind: "game status",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub name: String,
    pub platform: String,
    pub status: GameStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDraft {
    pub name: String,
    pub platform: String,
    pub status: GameStatus,
}

impl Record for Game {
    type Draft = GameDraft;

    const NOUN: &'static str = "Game";
    const PLURAL: &'static str = "Games";
    const DB_STEM: &'static str = "game";

    const SQL: Statements = Statements {
        create_table: "CREATE TABLE IF NOT EXISTS games (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL,
                platform        TEXT NOT NULL DEFAULT '',
                status          TEXT NOT NULL DEFAULT 'backlog'
            )",
        create_indexes: &["CREATE INDEX IF NOT EXISTS idx_games_name ON games(name)"],
        list: "SELECT id, name, platform, status
             FROM games ORDER BY name COLLATE NOCASE ASC, id ASC",
        fetch: "SELECT id, name, platform, status
             FROM games WHERE id = ?1",
        count: "SELECT COUNT(*) FROM games",
        insert: "INSERT INTO games (name, platform, status)
             VALUES (?1, ?2, ?3)",
        update: "UPDATE games SET name = ?1, platform = ?2, status = ?3 WHERE id = ?4",
        delete: "DELETE FROM games WHERE id = ?1",
    };

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("name", "Name", FieldKind::Text),
        FieldSpec::optional("platform", "Platform", FieldKind::Text),
        FieldSpec::optional(
            "status",
            "Status",
            FieldKind::Choice(&["backlog", "playing", "completed", "dropped"]),
        ),
    ];
    const GROUPED: bool = true;

    fn id(&self) -> i64 {
        self.id
    }

    fn draft(&self) -> GameDraft {
        GameDraft {
            name: self.name.clone(),
            platform: self.platform.clone(),
            status: self.status,
        }
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Game {
            id: row.get(0)?,
            name: row.get(1)?,
            platform: row.get(2)?,
            status: parse_column(row, 3)?,
        })
    }

    fn to_params(draft: &GameDraft) -> Vec<Value> {
        vec![
            Value::Text(draft.name.clone()),
            Value::Text(draft.platform.clone()),
            Value::Text(draft.status.as_str().to_string()),
        ]
    }

    fn from_form(form: &FormData) -> Result<GameDraft, ValidationError> {
        Ok(GameDraft {
            name: form.required_text("name", "Name")?,
            platform: form.optional_text("platform"),
            status: form.choice("status", "Status")?,
        })
    }

    fn to_form(draft: &GameDraft) -> FormData {
        FormData::new()
            .with("name", draft.name.as_str())
            .with("platform", draft.platform.as_str())
            .with("status", draft.status.as_str())
    }

    fn summary(&self) -> String {
        if self.platform.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.platform)
        }
    }

    fn group_key(&self) -> Option<GroupKey> {
        Some(GroupKey::ranked(self.status as u32, self.status.label()))
    }
}
