use axum::Router;

pub mod serials;
pub mod system;

/// Router for the lifecycle endpoints.
pub fn router() -> Router {
    Router::new().nest("/serials", serials::router())
}
