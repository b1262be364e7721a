use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::app::render::{render_fields, render_page};
use crate::app::{App, AppError, FlashLevel, Method, Request, Response, Route, Session, View};
use crate::database::Store;
use crate::form::FormData;
use crate::models::{Book, Game, Idea, Item, Lesson, Record, Task};
use crate::variant::Variant;

#[derive(Parser)]
#[command(name = "crudbook")]
#[command(about = "Lessons, tasks, books, shopping, ideas and games - one small SQLite table each")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (separate config/data directories, debug logging)
    #[arg(long)]
    pub dev: bool,

    /// Record collection to work on (defaults to the config's default_app)
    #[arg(short, long, value_enum)]
    pub app: Option<Variant>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the table if needed and print where the database lives
    Init,
    /// Show every record, grouped where the collection has groups
    List {
        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a record
    Add {
        /// Field value, repeatable
        #[arg(short = 'f', long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },
    /// Show the edit form of a record
    Show {
        id: i64,
    },
    /// Change some fields of a record; unspecified fields keep their values
    Edit {
        id: i64,
        /// Field value, repeatable
        #[arg(short = 'f', long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },
    /// Delete a record
    Delete {
        id: i64,
    },
    /// Send a raw request, e.g. `request POST /add -f title=Milk`
    Request {
        method: String,
        path: String,
        /// Form field, repeatable
        #[arg(short = 'f', long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },
    /// Describe the fields of the selected collection
    Fields,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    AppError(#[from] AppError),
    #[error("Invalid field argument: {0}")]
    InvalidField(String),
    #[error("{0}")]
    InvalidMethod(String),
    #[error("Failed to encode JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("No route for {0}")]
    NoRoute(String),
    #[error("Method {method} not allowed for {path} (allowed: {allowed})")]
    MethodNotAllowed {
        method: Method,
        path: String,
        allowed: String,
    },
}

/// Whether the final page reported a rejection (validation or not-found)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected,
}

/// Run a command against the record type selected by `variant`
pub fn handle_command(variant: Variant, store: Store, command: Commands) -> Result<Outcome, CliError> {
    match variant {
        Variant::Lesson => handle_for::<Lesson>(store, command),
        Variant::Todo => handle_for::<Task>(store, command),
        Variant::Book => handle_for::<Book>(store, command),
        Variant::Shopping => handle_for::<Item>(store, command),
        Variant::Idea => handle_for::<Idea>(store, command),
        Variant::Game => handle_for::<Game>(store, command),
    }
}

fn parse_fields(fields: &[String]) -> Result<FormData, CliError> {
    FormData::from_pairs(fields).map_err(CliError::InvalidField)
}

fn handle_for<R: Record>(store: Store, command: Commands) -> Result<Outcome, CliError> {
    let app = App::<R>::new(store);
    app.initialize()?;
    let mut session = Session::new();

    let (response, json) = match command {
        Commands::Init => {
            println!("{} store ready at {}", R::PLURAL, app.store().path().display());
            return Ok(Outcome::Accepted);
        }
        Commands::Fields => {
            print!("{}", render_fields::<R>());
            return Ok(Outcome::Accepted);
        }
        Commands::List { json } => (app.follow(&mut session, Request::get(Route::List.path()))?, json),
        Commands::Add { fields } => {
            let form = parse_fields(&fields)?;
            (app.follow(&mut session, Request::post(Route::Create.path(), form))?, false)
        }
        Commands::Show { id } => (app.follow(&mut session, Request::get(Route::EditForm(id).path()))?, false),
        Commands::Edit { id, fields } => {
            let overrides = parse_fields(&fields)?;
            (handle_edit(&app, &mut session, id, &overrides)?, false)
        }
        Commands::Delete { id } => (
            app.follow(&mut session, Request::post(Route::Delete(id).path(), FormData::new()))?,
            false,
        ),
        Commands::Request { method, path, fields } => {
            let method: Method = method.parse().map_err(CliError::InvalidMethod)?;
            let request = Request {
                method,
                path,
                form: parse_fields(&fields)?,
            };
            (app.follow(&mut session, request)?, false)
        }
    };

    print_response(response, json)
}

/// Prefill from the edit form, overlay the given fields, then submit
fn handle_edit<R: Record>(
    app: &App<R>,
    session: &mut Session,
    id: i64,
    overrides: &FormData,
) -> Result<Response<R>, CliError> {
    let prefill = app.follow(session, Request::get(Route::EditForm(id).path()))?;
    let mut values = match prefill {
        Response::Render(page) => match page.view {
            View::Form(form) => form.values,
            // Not found: the list page carrying the flash is the answer
            View::List(_) => return Ok(Response::Render(page)),
        },
        other => return Ok(other),
    };
    values.merge(overrides);
    Ok(app.follow(session, Request::post(Route::Update(id).path(), values))?)
}

fn print_response<R: Record>(response: Response<R>, json: bool) -> Result<Outcome, CliError> {
    match response {
        Response::Render(page) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                print!("{}", render_page(&page));
            }
            let rejected = page.flashes.iter().any(|f| f.level == FlashLevel::Error);
            Ok(if rejected { Outcome::Rejected } else { Outcome::Accepted })
        }
        Response::Redirect(location) => {
            println!("Redirect to {}", location);
            Ok(Outcome::Accepted)
        }
        Response::NotFound(path) => Err(CliError::NoRoute(path)),
        Response::MethodNotAllowed { method, path, allowed } => Err(CliError::MethodNotAllowed {
            method,
            path,
            allowed: allowed.iter().map(Method::to_string).collect::<Vec<_>>().join(", "),
        }),
    }
}
