//! HTTP layer.
//!
//! Translates HTTP requests into one [`TaskService`] call each and the
//! results back into JSON (or HTML for the board). Service calls are
//! synchronous and run on the blocking pool.

pub mod board;
pub mod dto;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    http::Method,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::Error;
use crate::tasks::TaskService;

pub use error::{ApiError, ApiErrorResponse};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The task service.
    pub service: Arc<TaskService>,
}

impl AppState {
    /// Wrap a service.
    #[must_use]
    pub fn new(service: TaskService) -> Self {
        Self { service: Arc::new(service) }
    }

    /// Run a service call on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns the call's error mapped to a response, or an internal error if
    /// the blocking task could not complete.
    pub async fn run<T, F>(&self, op: F) -> Result<T, ApiErrorResponse>
    where
        F: FnOnce(&TaskService) -> crate::error::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let service = Arc::clone(&self.service);
        let result = tokio::task::spawn_blocking(move || op(&service))
            .await
            .map_err(|e| Error::Storage(format!("blocking task failed: {e}")))?;
        Ok(result?)
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        // JSON API
        .route("/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route("/tasks/active", get(handlers::list_active))
        .route("/tasks/completed", get(handlers::list_completed))
        .route("/tasks/archived", get(handlers::list_archived))
        .route("/tasks/overdue", get(handlers::list_overdue))
        .route(
            "/tasks/{id}",
            get(handlers::get_task).put(handlers::update_task).delete(handlers::delete_task),
        )
        .route("/tasks/{id}/complete", patch(handlers::toggle_complete))
        .route("/tasks/{id}/archive", patch(handlers::archive_task))
        .route("/tasks/{id}/unarchive", patch(handlers::unarchive_task))
        // HTML board
        .route("/", get(board::index))
        .route("/board", get(board::show_board))
        .route("/board/tasks", post(board::create_task))
        .route("/board/tasks/{id}/{action}", post(board::task_action))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
