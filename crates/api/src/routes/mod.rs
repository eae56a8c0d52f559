pub mod health;
pub mod pages;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /pages/{code}                                    resolved page view
/// /pages/{code}/props                              page + signup steps + meta tags
/// ```
///
/// `POST /api/v1/signup` is served by the signup API service, not here.
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/pages", pages::router())
}
