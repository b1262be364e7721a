pub mod app;
pub mod cli;
pub mod config;
pub mod database;
pub mod form;
pub mod models;
pub mod utils;
pub mod variant;

pub use app::App;
pub use config::Config;
pub use database::{Database, Store};
pub use form::FormData;
pub use models::{Book, Game, Idea, Item, Lesson, Record, Task};
pub use utils::Profile;
pub use variant::Variant;
