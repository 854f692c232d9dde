//! HTTP front end.
//!
//! Wires the [`Controller`] and the [`SessionRegistry`] into an
//! [`axum::Router`]. The router is generic over the [`Renderer`] so tests
//! can drive it with a scripted tool.

pub mod page;
pub mod routes;
pub mod sessions;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use dfdgen::{Controller, config::AppConfig, controller_from_config, render::Renderer};

pub use sessions::SessionRegistry;

/// Shared state handed to every handler.
pub struct AppState<R> {
    controller: Arc<Controller<R>>,
    sessions: SessionRegistry,
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            sessions: self.sessions.clone(),
        }
    }
}

impl<R: Renderer + 'static> AppState<R> {
    pub fn new(controller: Controller<R>, sessions: SessionRegistry) -> Self {
        Self {
            controller: Arc::new(controller),
            sessions,
        }
    }

    pub fn controller(&self) -> &Controller<R> {
        &self.controller
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }
}

impl AppState<dfdgen::render::ToolRenderer> {
    /// Builds the production state described by `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            controller_from_config(config),
            SessionRegistry::new(config.session().idle_timeout()),
        )
    }
}

/// Builds the application router.
pub fn router<R: Renderer + 'static>(state: AppState<R>) -> Router {
    Router::new()
        .route("/", get(routes::index::<R>))
        .route("/edit", post(routes::edit::<R>))
        .route("/format", post(routes::format::<R>))
        .route("/generate", post(routes::generate::<R>))
        .route("/artifact/primary", get(routes::primary_artifact::<R>))
        .route("/artifact/pdf", get(routes::pdf_artifact::<R>))
        .route("/healthz", get(routes::healthz))
        .with_state(state)
}
