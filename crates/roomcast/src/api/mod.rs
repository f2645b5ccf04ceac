//! HTTP surface: application state, router, and health endpoint.

mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
