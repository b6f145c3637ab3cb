pub mod handlers;
pub mod routes;

pub use routes::{cors_layer, create_router};

use crate::query::QueryService;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub query: QueryService,
}

impl AppState {
    pub fn new(query: QueryService) -> Self {
        Self { query }
    }
}
