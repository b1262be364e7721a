use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::form::FormData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            other => Err(format!("Unsupported method: {}", other)),
        }
    }
}

/// One inbound request against a record collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub form: FormData,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            form: FormData::new(),
        }
    }

    pub fn post(path: impl Into<String>, form: FormData) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            form,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    List,
    NewForm,
    Create,
    EditForm(i64),
    Update(i64),
    Delete(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("No route for {0}")]
    NotFound(String),
    #[error("Method {method} not allowed for {path}")]
    MethodNotAllowed {
        method: Method,
        path: String,
        allowed: &'static [Method],
    },
}

/// Paths that share a handler set, before the method is considered
enum Resource {
    Collection,
    New,
    Edit(i64),
    Delete(i64),
    DeleteLink(i64),
}

impl Route {
    /// Resolve a method and path into a route.
    ///
    /// `/add` is an alias of `/create`, and `GET /delete/{id}` is accepted
    /// alongside `POST /{id}/delete`.
    pub fn resolve(method: Method, path: &str) -> Result<Route, RouteError> {
        let resource = parse_path(path).ok_or_else(|| RouteError::NotFound(path.to_string()))?;
        let not_allowed = |allowed: &'static [Method]| RouteError::MethodNotAllowed {
            method,
            path: path.to_string(),
            allowed,
        };

        match (resource, method) {
            (Resource::Collection, Method::Get) => Ok(Route::List),
            (Resource::Collection, _) => Err(not_allowed(&[Method::Get])),
            (Resource::New, Method::Get) => Ok(Route::NewForm),
            (Resource::New, Method::Post) => Ok(Route::Create),
            (Resource::Edit(id), Method::Get) => Ok(Route::EditForm(id)),
            (Resource::Edit(id), Method::Post) => Ok(Route::Update(id)),
            (Resource::Delete(id), Method::Post) => Ok(Route::Delete(id)),
            (Resource::Delete(_), _) => Err(not_allowed(&[Method::Post])),
            (Resource::DeleteLink(id), _) => Ok(Route::Delete(id)),
        }
    }

    /// Canonical path for this route
    pub fn path(&self) -> String {
        match self {
            Route::List => "/".to_string(),
            Route::NewForm | Route::Create => "/create".to_string(),
            Route::EditForm(id) | Route::Update(id) => format!("/{}/edit", id),
            Route::Delete(id) => format!("/{}/delete", id),
        }
    }
}

fn parse_path(path: &str) -> Option<Resource> {
    let path = path.split(['?', '#']).next().unwrap_or("");
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [] => Some(Resource::Collection),
        ["create"] | ["add"] => Some(Resource::New),
        [id, "edit"] => parse_id(id).map(Resource::Edit),
        [id, "delete"] => parse_id(id).map(Resource::Delete),
        ["delete", id] => parse_id(id).map(Resource::DeleteLink),
        _ => None,
    }
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_routes() {
        assert_eq!(Route::resolve(Method::Get, "/"), Ok(Route::List));
        assert_eq!(Route::resolve(Method::Get, ""), Ok(Route::List));
        assert_eq!(Route::resolve(Method::Get, "/create"), Ok(Route::NewForm));
        assert_eq!(Route::resolve(Method::Post, "/create/"), Ok(Route::Create));
        assert_eq!(Route::resolve(Method::Post, "/add"), Ok(Route::Create));
    }

    #[test]
    fn test_member_routes() {
        assert_eq!(Route::resolve(Method::Get, "/7/edit"), Ok(Route::EditForm(7)));
        assert_eq!(Route::resolve(Method::Post, "/7/edit"), Ok(Route::Update(7)));
        assert_eq!(Route::resolve(Method::Post, "/7/delete"), Ok(Route::Delete(7)));
        assert_eq!(Route::resolve(Method::Get, "/delete/7"), Ok(Route::Delete(7)));
    }

    #[test]
    fn test_wrong_method_is_reported() {
        assert!(matches!(
            Route::resolve(Method::Get, "/7/delete"),
            Err(RouteError::MethodNotAllowed { .. })
        ));
        assert!(matches!(
            Route::resolve(Method::Post, "/"),
            Err(RouteError::MethodNotAllowed { .. })
        ));
    }

    #[test]
    fn test_malformed_paths_are_not_found() {
        for path in ["/abc/edit", "/1.5/delete", "/7", "/7/edit/extra", "/books"] {
            assert!(
                matches!(Route::resolve(Method::Get, path), Err(RouteError::NotFound(_))),
                "{} should not resolve",
                path
            );
        }
    }

    #[test]
    fn test_any_integer_id_resolves() {
        // Existence is the handler's concern, not the router's
        assert_eq!(Route::resolve(Method::Get, "/0/edit"), Ok(Route::EditForm(0)));
        assert_eq!(Route::resolve(Method::Get, "/delete/0"), Ok(Route::Delete(0)));
        assert_eq!(Route::resolve(Method::Post, "/-3/delete"), Ok(Route::Delete(-3)));
    }

    #[test]
    fn test_query_string_is_ignored() {
        assert_eq!(Route::resolve(Method::Get, "/?page=2"), Ok(Route::List));
    }

    #[test]
    fn test_canonical_paths_resolve_back() {
        assert_eq!(Route::resolve(Method::Post, &Route::Update(3).path()), Ok(Route::Update(3)));
        assert_eq!(Route::resolve(Method::Post, &Route::Delete(3).path()), Ok(Route::Delete(3)));
    }
}
