pub mod backend;
pub mod config;
pub mod web;

use std::sync::Mutex;

use tera::Tera;

use backend::BackendClient;
use web::state::UiState;

// App state structure
pub struct AppState {
    tera: Tera,
    backend: BackendClient,
    ui: Mutex<UiState>,
}

impl AppState {
    pub fn new(tera: Tera, backend: BackendClient) -> Self {
        Self {
            tera,
            backend,
            ui: Mutex::new(UiState::new()),
        }
    }
}
