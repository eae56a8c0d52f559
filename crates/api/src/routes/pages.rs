//! Route definitions for signup pages, mounted at `/pages`.

use axum::routing::get;
use axum::Router;

use crate::handlers::pages;
use crate::state::AppState;

/// ```text
/// GET /{code}        -> get_page
/// GET /{code}/props  -> get_signup_props
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{code}", get(pages::get_page))
        .route("/{code}/props", get(pages::get_signup_props))
}
