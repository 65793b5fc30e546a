//! Fallback for everything the router does not match.
//!
//! Page paths get the application shell; the browser app renders the view.
//! Unknown API paths get a JSON 404 (after authentication, like any other
//! API request).

use axum::{
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};

use crate::app::errors::json_error;
use crate::surface::Surface;

const SHELL: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>CrewDesk</title>
    <link rel="stylesheet" href="/assets/app.css">
  </head>
  <body>
    <div id="app"></div>
    <script type="module" src="/assets/app.js"></script>
  </body>
</html>
"#;

pub async fn fallback(uri: Uri) -> Response {
    match Surface::for_path(uri.path()) {
        Surface::Api => json_error(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("no route for {}", uri.path()),
        ),
        Surface::Page => Html(SHELL).into_response(),
    }
}
