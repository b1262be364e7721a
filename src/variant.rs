use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Book, Game, Idea, Item, Lesson, Record, Task};

/// Which record collection an invocation works on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Lesson,
    #[default]
    Todo,
    Book,
    Shopping,
    Idea,
    Game,
}

impl Variant {
    pub const ALL: [Variant; 6] = [
        Variant::Lesson,
        Variant::Todo,
        Variant::Book,
        Variant::Shopping,
        Variant::Idea,
        Variant::Game,
    ];

    /// Database file stem of the variant's record type
    pub fn db_stem(self) -> &'static str {
        match self {
            Variant::Lesson => Lesson::DB_STEM,
            Variant::Todo => Task::DB_STEM,
            Variant::Book => Book::DB_STEM,
            Variant::Shopping => Item::DB_STEM,
            Variant::Idea => Idea::DB_STEM,
            Variant::Game => Game::DB_STEM,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Lesson => "lesson",
            Variant::Todo => "todo",
            Variant::Book => "book",
            Variant::Shopping => "shopping",
            Variant::Idea => "idea",
            Variant::Game => "game",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
