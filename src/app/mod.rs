//! Request handling for one record collection.
//!
//! Every request resolves to a [`Route`], opens its own [`Database`] handle,
//! and releases it before the response is returned. Writes redirect back to
//! the list with a flash; validation failures re-render the form.

pub mod error;
pub mod render;
pub mod routes;
pub mod session;
pub mod views;

pub use error::AppError;
pub use routes::{Method, Request, Route, RouteError};
pub use session::{Flash, FlashLevel, Session};
pub use views::{FormView, Group, ListView, View};

use serde::Serialize;
use std::marker::PhantomData;
use tracing::{debug, info};

use crate::database::{Database, Store};
use crate::form::FormData;
use crate::models::Record;

/// Upper bound on redirects followed by [`App::follow`]
pub const MAX_REDIRECTS: usize = 5;

/// A rendered view plus the flashes delivered with it
#[derive(Debug, Clone, Serialize)]
pub struct Page<R> {
    pub flashes: Vec<Flash>,
    #[serde(flatten)]
    pub view: View<R>,
}

#[derive(Debug, Clone)]
pub enum Response<R> {
    Render(Page<R>),
    Redirect(String),
    NotFound(String),
    MethodNotAllowed {
        method: Method,
        path: String,
        allowed: &'static [Method],
    },
}

impl<R> Response<R> {
    pub fn into_page(self) -> Option<Page<R>> {
        match self {
            Response::Render(page) => Some(page),
            _ => None,
        }
    }
}

pub struct App<R: Record> {
    store: Store,
    _record: PhantomData<R>,
}

impl<R: Record> App<R> {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Ensure the backing table exists
    pub fn initialize(&self) -> Result<(), AppError> {
        self.store.initialize::<R>()?;
        Ok(())
    }

    /// Handle a single request without following redirects
    pub fn handle(&self, session: &mut Session, request: &Request) -> Result<Response<R>, AppError> {
        let route = match Route::resolve(request.method, &request.path) {
            Ok(route) => route,
            Err(RouteError::NotFound(path)) => {
                debug!(method = %request.method, path = %path, "no route");
                return Ok(Response::NotFound(path));
            }
            Err(RouteError::MethodNotAllowed { method, path, allowed }) => {
                debug!(method = %method, path = %path, "method not allowed");
                return Ok(Response::MethodNotAllowed { method, path, allowed });
            }
        };
        debug!(record = R::NOUN, ?route, "dispatch");

        // Dropped on every return path below, closing the connection
        let db = self.store.connect()?;
        match route {
            Route::List => self.list(&db, session),
            Route::NewForm => Ok(self.render_form(session, Route::Create, FormData::new())),
            Route::Create => self.create(&db, session, &request.form),
            Route::EditForm(id) => self.edit_form(&db, session, id),
            Route::Update(id) => self.update(&db, session, id, &request.form),
            Route::Delete(id) => self.delete(&db, session, id),
        }
    }

    /// Handle a request and follow redirects with GET, the way a browser would
    pub fn follow(&self, session: &mut Session, request: Request) -> Result<Response<R>, AppError> {
        let mut response = self.handle(session, &request)?;
        let mut hops = 0;
        while let Response::Redirect(location) = response {
            if hops == MAX_REDIRECTS {
                return Err(AppError::RedirectLoop(location));
            }
            hops += 1;
            response = self.handle(session, &Request::get(location))?;
        }
        Ok(response)
    }

    fn list(&self, db: &Database, session: &mut Session) -> Result<Response<R>, AppError> {
        let records = db.list::<R>()?;
        Ok(Response::Render(Page {
            flashes: session.take_flashes(),
            view: View::List(ListView::new(records)),
        }))
    }

    fn create(&self, db: &Database, session: &mut Session, form: &FormData) -> Result<Response<R>, AppError> {
        let draft = match R::from_form(form) {
            Ok(draft) => draft,
            Err(err) => {
                info!(record = R::NOUN, error = %err, "create rejected");
                session.flash(Flash::error(err.to_string()));
                return Ok(self.render_form(session, Route::Create, form.clone()));
            }
        };

        let id = db.insert::<R>(&draft)?;
        info!(record = R::NOUN, id, "created");
        session.flash(Flash::success(format!("{} created.", R::NOUN)));
        Ok(Response::Redirect(Route::List.path()))
    }

    fn edit_form(&self, db: &Database, session: &mut Session, id: i64) -> Result<Response<R>, AppError> {
        match db.get::<R>(id)? {
            Some(record) => Ok(self.render_form(session, Route::Update(id), R::to_form(&record.draft()))),
            None => Ok(self.not_found(session, id)),
        }
    }

    fn update(
        &self,
        db: &Database,
        session: &mut Session,
        id: i64,
        form: &FormData,
    ) -> Result<Response<R>, AppError> {
        if db.get::<R>(id)?.is_none() {
            return Ok(self.not_found(session, id));
        }

        let draft = match R::from_form(form) {
            Ok(draft) => draft,
            Err(err) => {
                info!(record = R::NOUN, id, error = %err, "update rejected");
                session.flash(Flash::error(err.to_string()));
                return Ok(self.render_form(session, Route::Update(id), form.clone()));
            }
        };

        // The row can vanish between the check and the write
        if !db.update::<R>(id, &draft)? {
            return Ok(self.not_found(session, id));
        }
        info!(record = R::NOUN, id, "updated");
        session.flash(Flash::success(format!("{} updated.", R::NOUN)));
        Ok(Response::Redirect(Route::List.path()))
    }

    fn delete(&self, db: &Database, session: &mut Session, id: i64) -> Result<Response<R>, AppError> {
        if db.get::<R>(id)?.is_none() || !db.delete::<R>(id)? {
            return Ok(self.not_found(session, id));
        }
        info!(record = R::NOUN, id, "deleted");
        session.flash(Flash::success(format!("{} deleted.", R::NOUN)));
        Ok(Response::Redirect(Route::List.path()))
    }

    fn not_found(&self, session: &mut Session, id: i64) -> Response<R> {
        info!(record = R::NOUN, id, "not found");
        session.flash(Flash::error(format!("{} not found.", R::NOUN)));
        Response::Redirect(Route::List.path())
    }

    fn render_form(&self, session: &mut Session, action: Route, values: FormData) -> Response<R> {
        let noun = R::NOUN.to_lowercase();
        let heading = match action {
            Route::Update(_) => format!("Edit {}", noun),
            _ => format!("New {}", noun),
        };
        Response::Render(Page {
            flashes: session.take_flashes(),
            view: View::Form(FormView {
                heading,
                action: action.path(),
                fields: R::FIELDS,
                values,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Completion, Item, Task};
    use tempfile::TempDir;

    fn app<R: Record>(dir: &TempDir) -> App<R> {
        let app = App::new(Store::new(dir.path().join(format!("{}.db", R::DB_STEM))));
        app.initialize().unwrap();
        app
    }

    fn list<R: Record>(app: &App<R>, session: &mut Session) -> Page<R> {
        app.handle(session, &Request::get("/")).unwrap().into_page().unwrap()
    }

    fn records<R: Record>(page: &Page<R>) -> &[R] {
        match &page.view {
            View::List(view) => &view.records,
            View::Form(_) => panic!("expected a list view"),
        }
    }

    #[test]
    fn test_create_redirects_with_confirmation() {
        let dir = TempDir::new().unwrap();
        let app = app::<Task>(&dir);
        let mut session = Session::new();

        let response = app
            .handle(&mut session, &Request::post("/create", FormData::new().with("title", "Buy milk")))
            .unwrap();
        assert!(matches!(response, Response::Redirect(ref loc) if loc == "/"));

        let page = list(&app, &mut session);
        assert_eq!(page.flashes, vec![Flash::success("Task created.")]);
        assert_eq!(records(&page).len(), 1);

        // Flash is gone on the following page
        assert!(list(&app, &mut session).flashes.is_empty());
    }

    #[test]
    fn test_create_with_missing_field_rerenders_form() {
        let dir = TempDir::new().unwrap();
        let app = app::<Item>(&dir);
        let mut session = Session::new();

        let form = FormData::new().with("quantity", "3").with("category", "Dairy");
        let page = app
            .handle(&mut session, &Request::post("/add", form.clone()))
            .unwrap()
            .into_page()
            .unwrap();

        assert_eq!(page.flashes, vec![Flash::error("Name is required.")]);
        match page.view {
            View::Form(view) => {
                assert_eq!(view.action, "/create");
                assert_eq!(view.values, form);
            }
            View::List(_) => panic!("expected the form again"),
        }
        assert!(records(&list(&app, &mut session)).is_empty());
    }

    #[test]
    fn test_edit_form_is_prefilled() {
        let dir = TempDir::new().unwrap();
        let app = app::<Task>(&dir);
        let mut session = Session::new();
        let form = FormData::new().with("title", "Walk dog").with("completed", "on");
        app.handle(&mut session, &Request::post("/create", form)).unwrap();
        let id = records(&list(&app, &mut session))[0].id;

        let page = app
            .handle(&mut session, &Request::get(format!("/{}/edit", id)))
            .unwrap()
            .into_page()
            .unwrap();
        match page.view {
            View::Form(view) => {
                assert_eq!(view.heading, "Edit task");
                assert_eq!(view.action, format!("/{}/edit", id));
                assert_eq!(view.values.get("title"), Some("Walk dog"));
                assert_eq!(view.values.get("completed"), Some("on"));
            }
            View::List(_) => panic!("expected a form"),
        }
    }

    #[test]
    fn test_update_with_blank_title_keeps_row() {
        let dir = TempDir::new().unwrap();
        let app = app::<Task>(&dir);
        let mut session = Session::new();
        app.follow(&mut session, Request::post("/create", FormData::new().with("title", "Keep")))
            .unwrap();
        let id = records(&list(&app, &mut session))[0].id;

        let response = app
            .handle(&mut session, &Request::post(format!("/{}/edit", id), FormData::new().with("title", " ")))
            .unwrap();
        let page = response.into_page().unwrap();
        assert_eq!(page.flashes, vec![Flash::error("Title is required.")]);

        let db = app.store().connect().unwrap();
        assert_eq!(db.get::<Task>(id).unwrap().unwrap().title, "Keep");
    }

    #[test]
    fn test_missing_ids_redirect_with_not_found() {
        let dir = TempDir::new().unwrap();
        let app = app::<Task>(&dir);
        let mut session = Session::new();

        for request in [
            Request::get("/42/edit"),
            Request::post("/42/edit", FormData::new().with("title", "x")),
            Request::post("/42/delete", FormData::new()),
            Request::get("/delete/42"),
            Request::get("/0/edit"),
            Request::post("/0/delete", FormData::new()),
            Request::get("/delete/0"),
        ] {
            let page = app.follow(&mut session, request).unwrap().into_page().unwrap();
            assert_eq!(page.flashes, vec![Flash::error("Task not found.")]);
        }
    }

    #[test]
    fn test_update_then_delete() {
        let dir = TempDir::new().unwrap();
        let app = app::<Task>(&dir);
        let mut session = Session::new();
        app.follow(&mut session, Request::post("/create", FormData::new().with("title", "Buy milk")))
            .unwrap();
        let id = records(&list(&app, &mut session))[0].id;

        let page = app
            .follow(
                &mut session,
                Request::post(
                    format!("/{}/edit", id),
                    FormData::new().with("title", "Buy milk").with("completed", "on"),
                ),
            )
            .unwrap()
            .into_page()
            .unwrap();
        assert_eq!(page.flashes, vec![Flash::success("Task updated.")]);
        assert_eq!(records(&page)[0].completed, Completion::Done);
        assert_eq!(records(&page)[0].id, id);

        let page = app
            .follow(&mut session, Request::post(format!("/{}/delete", id), FormData::new()))
            .unwrap()
            .into_page()
            .unwrap();
        assert_eq!(page.flashes, vec![Flash::success("Task deleted.")]);
        assert!(records(&page).is_empty());
    }

    #[test]
    fn test_unknown_route_and_method() {
        let dir = TempDir::new().unwrap();
        let app = app::<Task>(&dir);
        let mut session = Session::new();

        assert!(matches!(
            app.handle(&mut session, &Request::get("/nope")).unwrap(),
            Response::NotFound(_)
        ));
        assert!(matches!(
            app.handle(&mut session, &Request::get("/1/delete")).unwrap(),
            Response::MethodNotAllowed { .. }
        ));
    }
}
