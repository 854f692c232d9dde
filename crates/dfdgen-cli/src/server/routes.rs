//! HTTP handlers.
//!
//! GET /                  - Page load, optionally seeded by `?text=`
//! POST /edit             - Text area changed
//! POST /format           - Format dropdown changed
//! POST /generate         - Generate button pressed
//! GET /artifact/primary  - Primary artifact of the current success
//! GET /artifact/pdf      - PDF artifact of the current success
//! GET /healthz           - Liveness probe
//!
//! Every POST answers `303 See Other` to `/`, so the page is always a render
//! of the state the trigger left behind.

use std::sync::Arc;

use axum::{
    Form,
    extract::{RawQuery, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use log::{debug, error};
use serde::Deserialize;

use dfdgen::{
    OutputFormat, ShareLink, render::Renderer, session::SessionSnapshot, share::ShareError,
};

use super::{
    AppState, page,
    sessions::{Resolved, Session, session_id},
};

/// Body of `POST /edit`.
#[derive(Debug, Deserialize)]
pub struct EditForm {
    #[serde(default)]
    text: String,
}

/// Body of `POST /format`.
#[derive(Debug, Deserialize)]
pub struct FormatForm {
    format: OutputFormat,
}

/// Body of `POST /generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    #[serde(default)]
    text: String,
    #[serde(default)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy)]
enum ArtifactKind {
    Primary,
    Pdf,
}

pub async fn index<R: Renderer + 'static>(
    State(app): State<AppState<R>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let resolved = app.sessions().resolve(session_id(&headers)).await;
    let link_text = query.as_deref().and_then(ShareLink::text_from_query);
    let trigger = Trigger::PageLoad {
        link_text,
        fresh: resolved.fresh,
    };

    match apply(app, resolved.session.clone(), trigger).await {
        Some(snapshot) => with_cookie(Html(page::render(&snapshot)).into_response(), &resolved),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub async fn edit<R: Renderer + 'static>(
    State(app): State<AppState<R>>,
    headers: HeaderMap,
    Form(form): Form<EditForm>,
) -> Response {
    let resolved = app.sessions().resolve(session_id(&headers)).await;
    let trigger = Trigger::Edit(normalize_newlines(form.text));
    apply(app, resolved.session.clone(), trigger).await;
    see_other(&resolved)
}

pub async fn format<R: Renderer + 'static>(
    State(app): State<AppState<R>>,
    headers: HeaderMap,
    Form(form): Form<FormatForm>,
) -> Response {
    let resolved = app.sessions().resolve(session_id(&headers)).await;
    {
        let mut state = resolved.session.state().lock().await;
        app.controller().format_changed(&mut state, form.format);
    }
    see_other(&resolved)
}

pub async fn generate<R: Renderer + 'static>(
    State(app): State<AppState<R>>,
    headers: HeaderMap,
    Form(form): Form<GenerateForm>,
) -> Response {
    let resolved = app.sessions().resolve(session_id(&headers)).await;
    let trigger = Trigger::Generate {
        text: normalize_newlines(form.text),
        format: form.format,
    };
    apply(app, resolved.session.clone(), trigger).await;
    see_other(&resolved)
}

pub async fn primary_artifact<R: Renderer + 'static>(
    State(app): State<AppState<R>>,
    headers: HeaderMap,
) -> Response {
    serve_artifact(&app, &headers, ArtifactKind::Primary).await
}

pub async fn pdf_artifact<R: Renderer + 'static>(
    State(app): State<AppState<R>>,
    headers: HeaderMap,
) -> Response {
    serve_artifact(&app, &headers, ArtifactKind::Pdf).await
}

pub async fn healthz() -> &'static str {
    "ok"
}

async fn serve_artifact<R: Renderer + 'static>(
    app: &AppState<R>,
    headers: &HeaderMap,
    kind: ArtifactKind,
) -> Response {
    let Some(id) = session_id(headers) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some(session) = app.sessions().get(id).await else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let artifact = {
        let state = session.state().lock().await;
        state.rendered().map(|rendered| match kind {
            ArtifactKind::Primary => rendered.primary().clone(),
            ArtifactKind::Pdf => rendered.pdf().clone(),
        })
    };
    let Some(artifact) = artifact else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let bytes = match artifact.read().await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!(err:%, path = artifact.path().display().to_string(); "Failed to read artifact");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let format = artifact.format();
    let mut response = bytes.into_response();
    let response_headers = response.headers_mut();
    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(format.mime_type()),
    );
    response_headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    if format == OutputFormat::Pdf {
        response_headers.insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment; filename=\"dfd.pdf\""),
        );
    }
    response
}

/// A user action that may start a generation.
#[derive(Debug)]
enum Trigger {
    PageLoad {
        link_text: Option<Result<String, ShareError>>,
        fresh: bool,
    },
    Edit(String),
    Generate {
        text: String,
        format: OutputFormat,
    },
}

/// Applies `trigger` to `session` on a spawned task that owns the session
/// lock until the controller returns.
///
/// The task outlives a dropped request, so a started generation always
/// commits. A page load resolves to the snapshot of the resulting state;
/// other triggers resolve to `None`, as does a panicked task.
async fn apply<R: Renderer + 'static>(
    app: AppState<R>,
    session: Arc<Session>,
    trigger: Trigger,
) -> Option<SessionSnapshot> {
    let task = tokio::spawn(async move {
        let mut state = session.state().lock().await;
        let controller = app.controller();
        let (transition, wants_page) = match trigger {
            Trigger::PageLoad { link_text, fresh } => (
                controller.page_loaded(&mut state, link_text, fresh).await,
                true,
            ),
            Trigger::Edit(text) => (controller.text_edited(&mut state, text).await, false),
            Trigger::Generate { text, format } => (
                controller.generate_pressed(&mut state, text, format).await,
                false,
            ),
        };
        debug!(transition:?; "Applied trigger");
        wants_page.then(|| state.snapshot())
    });

    match task.await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            error!(err:%; "Trigger task failed");
            None
        }
    }
}

fn see_other(resolved: &Resolved) -> Response {
    with_cookie(Redirect::to("/").into_response(), resolved)
}

fn with_cookie(mut response: Response, resolved: &Resolved) -> Response {
    if let Some(cookie) = resolved.set_cookie() {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

/// Browsers submit text areas with CRLF line endings.
fn normalize_newlines(text: String) -> String {
    if text.contains('\r') {
        text.replace("\r\n", "\n")
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("A -> B\r\nB -> C".to_string()), "A -> B\nB -> C");
        assert_eq!(normalize_newlines("A -> B".to_string()), "A -> B");
    }
}
