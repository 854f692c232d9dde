//! dfdgen - A browser front end for an external data-flow diagram renderer.
//!
//! This crate holds everything between a user's action and the renderer:
//! the per-session state record, the controller that decides when to
//! render, and the renderer invocation itself. The HTTP surface lives in
//! `dfdgen-cli`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dfdgen::{
//!     Controller, OutputFormat, ShareLink,
//!     render::ToolRenderer,
//!     session::SessionState,
//! };
//!
//! # async fn demo() {
//! let controller = Controller::new(
//!     ToolRenderer::new("data-flow-diagram"),
//!     ShareLink::new("http://localhost:8501/"),
//! );
//! let mut state = SessionState::new();
//!
//! controller
//!     .generate_pressed(&mut state, "A -> B".to_string(), OutputFormat::Svg)
//!     .await;
//!
//! if let Some(rendered) = state.rendered() {
//!     println!("{}", rendered.share_url());
//! }
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod render;
pub mod session;

mod error;

pub use dfdgen_core::{OutputFormat, ShareLink, format, share};

pub use controller::{Controller, Transition};
pub use error::DfdError;

use log::info;

use config::AppConfig;
use render::ToolRenderer;

/// Builds the production controller described by `config`.
pub fn controller_from_config(config: &AppConfig) -> Controller<ToolRenderer> {
    info!(
        program = config.renderer().program().display().to_string(),
        base_url = config.share().base_url();
        "Configuring renderer"
    );
    Controller::new(
        ToolRenderer::from_config(config.renderer()),
        ShareLink::new(config.share().base_url()),
    )
}
